// Row processor — moderation plus aggressiveness for one post.
//
// Failures stop here. A moderation error, or a panic anywhere in the row's
// work, becomes the neutral placeholder so the orchestrator only ever sees
// data.

use std::panic::AssertUnwindSafe;

use anyhow::Result;
use futures::FutureExt;
use tracing::warn;

use crate::aggressiveness::{AggressivenessResult, AggressivenessScorer};
use crate::moderation::{ModerationClient, ModerationResult};

/// What one row's processing produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub moderation: ModerationResult,
    pub aggressiveness: AggressivenessResult,
    /// True when this is the neutral placeholder
    pub failed: bool,
}

impl RowOutcome {
    /// All flags false, all scores 0.0, aggressiveness absent.
    pub fn placeholder() -> Self {
        Self {
            moderation: ModerationResult::neutral(),
            aggressiveness: AggressivenessResult::absent(),
            failed: true,
        }
    }
}

/// Classify and rate `text`. Returns `index` unchanged alongside the outcome.
pub async fn process_row(
    index: usize,
    text: &str,
    moderation: &dyn ModerationClient,
    scorer: &AggressivenessScorer,
) -> (usize, RowOutcome) {
    let work = AssertUnwindSafe(analyze_text(text, moderation, scorer)).catch_unwind();

    let outcome = match work.await {
        Ok(Ok((moderation, aggressiveness))) => RowOutcome {
            moderation,
            aggressiveness,
            failed: false,
        },
        Ok(Err(e)) => {
            warn!(index = index, error = %format!("{e:#}"), "Row analysis failed, using placeholder");
            RowOutcome::placeholder()
        }
        Err(panic) => {
            warn!(
                index = index,
                panic = panic_message(panic.as_ref()),
                "Row analysis panicked, using placeholder"
            );
            RowOutcome::placeholder()
        }
    };

    (index, outcome)
}

async fn analyze_text(
    text: &str,
    moderation: &dyn ModerationClient,
    scorer: &AggressivenessScorer,
) -> Result<(ModerationResult, AggressivenessResult)> {
    let categories = moderation.classify(text).await?;
    let aggressiveness = scorer.score(text).await;
    Ok((categories, aggressiveness))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
