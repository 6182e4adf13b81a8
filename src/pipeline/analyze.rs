// Parallel analysis: fan rows out to the remote classifiers, merge back in order.
//
// Up to `concurrency` rows are in flight at once. Results arrive in
// completion order; each one is stored in the slot of its input position
// and reported to the progress callback. Once every row is back the slots
// are zipped with the input, so output order always equals input order,
// and the weighted total is attached to each row.
//
// There is no cancellation channel. Dropping the returned future stops
// scheduling new rows and drops the in-flight requests with it.

use futures::stream::{self, StreamExt};
use tracing::info;

use super::row::{process_row, RowOutcome};
use crate::aggressiveness::AggressivenessScorer;
use crate::models::{AnalyzedRow, Post};
use crate::moderation::ModerationClient;
use crate::scoring::weights::{total_aggression, WeightTable};

/// Rows analyzed concurrently when no limit is configured.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Analyze a batch of posts.
///
/// `on_progress(done, total)` is called once per completed row, from this
/// task, in completion order: `done` counts 1..=total and is not a row
/// index. A row's failure never aborts the batch; it comes back as a
/// placeholder row. Empty input returns immediately without doing any work.
pub async fn analyze(
    rows: &[Post],
    moderation: &dyn ModerationClient,
    scorer: &AggressivenessScorer,
    weights: &WeightTable,
    concurrency: usize,
    mut on_progress: Option<&mut dyn FnMut(usize, usize)>,
) -> Vec<AnalyzedRow> {
    if rows.is_empty() {
        return Vec::new();
    }

    let total = rows.len();
    let concurrency = concurrency.max(1);
    info!(rows = total, concurrency = concurrency, "Starting analysis");

    // Slot per input position; a row's task reports its position back.
    let mut slots: Vec<Option<RowOutcome>> = vec![None; total];
    let mut completed = 0;

    let mut results = stream::iter(
        rows.iter()
            .enumerate()
            .map(|(position, post)| process_row(position, &post.content, moderation, scorer)),
    )
    .buffer_unordered(concurrency);

    while let Some((position, outcome)) = results.next().await {
        slots[position] = Some(outcome);
        completed += 1;
        if let Some(report) = on_progress.as_deref_mut() {
            report(completed, total);
        }
    }

    let analyzed: Vec<AnalyzedRow> = rows
        .iter()
        .zip(slots)
        .map(|(post, slot)| {
            let outcome = slot.unwrap_or_else(RowOutcome::placeholder);
            let total_aggression = total_aggression(
                &outcome.moderation,
                outcome.aggressiveness.score,
                weights,
            );
            AnalyzedRow {
                post: post.clone(),
                moderation: outcome.moderation,
                aggressiveness: outcome.aggressiveness,
                total_aggression,
                failed: outcome.failed,
            }
        })
        .collect();

    let failed = analyzed.iter().filter(|r| r.failed).count();
    let unscored = analyzed
        .iter()
        .filter(|r| !r.failed && r.aggressiveness.is_absent())
        .count();
    info!(
        rows = analyzed.len(),
        failed = failed,
        unscored = unscored,
        "Analysis complete"
    );

    analyzed
}

/// Everything one analysis run needs, built once before any row is touched.
pub struct Analyzer {
    pub moderation: Box<dyn ModerationClient>,
    pub scorer: AggressivenessScorer,
    pub weights: WeightTable,
    pub concurrency: usize,
}

impl Analyzer {
    /// Run [`analyze`] with this analyzer's clients and settings.
    pub async fn run(
        &self,
        rows: &[Post],
        on_progress: Option<&mut dyn FnMut(usize, usize)>,
    ) -> Vec<AnalyzedRow> {
        analyze(
            rows,
            self.moderation.as_ref(),
            &self.scorer,
            &self.weights,
            self.concurrency,
            on_progress,
        )
        .await
    }
}
