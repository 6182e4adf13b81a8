// Pipeline tests — the orchestrator and row processor against fake clients.
//
// The fakes stand in for the moderation classifier and the completion
// backend, with per-text delays to scramble completion order and
// in-flight counters to observe the concurrency bound. No network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aggression_analyzer::aggressiveness::{
    AggressivenessScorer, CompletionBackend, CompletionRequest, NoBackoff, PromptTemplate,
};
use aggression_analyzer::models::Post;
use aggression_analyzer::moderation::{Category, ModerationClient, ModerationResult};
use aggression_analyzer::pipeline::{analyze, process_row, Analyzer};
use aggression_analyzer::scoring::weights::WeightTable;
use anyhow::Result;
use async_trait::async_trait;

// ============================================================
// Fakes
// ============================================================

/// Moderation fake:
/// - "bad" fails, "panic" panics
/// - "hate" is flagged for hate with score 0.4, everything else is clean
/// - texts listed in `delays_ms` sleep before answering
#[derive(Default)]
struct FakeModeration {
    delays_ms: HashMap<String, u64>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeModeration {
    fn with_delays(delays_ms: HashMap<String, u64>) -> Self {
        Self {
            delays_ms,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ModerationClient for FakeModeration {
    async fn classify(&self, text: &str) -> Result<ModerationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(ms) = self.delays_ms.get(text) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match text {
            "bad" => anyhow::bail!("moderation quota exceeded"),
            "panic" => panic!("classifier blew up"),
            "hate" => Ok(ModerationResult::neutral().with(Category::Hate, true, 0.4)),
            _ => Ok(ModerationResult::neutral()),
        }
    }
}

/// Completion fake: rates every prompt 5, except prompts containing
/// "unratable", which always get an invalid answer, and "hate", rated 6.
struct FakeCompletion;

#[async_trait]
impl CompletionBackend for FakeCompletion {
    async fn complete_json(&self, request: &CompletionRequest) -> Result<String> {
        if request.prompt.contains("unratable") {
            return Ok(r#"{"score": 99, "reason": "out of range"}"#.to_string());
        }
        if request.prompt.contains("Post: hate") {
            return Ok(r#"{"score": 6, "reason": "hostile"}"#.to_string());
        }
        Ok(r#"{"score": 5, "reason": "ok"}"#.to_string())
    }
}

fn scorer() -> AggressivenessScorer {
    AggressivenessScorer::new(
        Box::new(FakeCompletion),
        PromptTemplate::new("Post: {text}").unwrap(),
    )
    .with_backoff(Box::new(NoBackoff))
}

fn posts(texts: &[&str]) -> Vec<Post> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| Post::new(i, *text))
        .collect()
}

// ============================================================
// End-to-end scenarios
// ============================================================

#[tokio::test]
async fn failing_row_becomes_placeholder_and_others_survive() {
    let moderation = FakeModeration::default();
    let rows = posts(&["a", "bad", "c"]);
    let mut progress = Vec::new();
    let mut on_progress = |done: usize, total: usize| progress.push((done, total));

    let out = analyze(
        &rows,
        &moderation,
        &scorer(),
        &WeightTable::default(),
        8,
        Some(&mut on_progress),
    )
    .await;

    assert_eq!(out.len(), 3);
    let contents: Vec<&str> = out.iter().map(|r| r.post.content.as_str()).collect();
    assert_eq!(contents, vec!["a", "bad", "c"]);

    assert_eq!(out[0].aggressiveness.score, Some(5));
    assert_eq!(out[2].aggressiveness.score, Some(5));
    assert!(!out[0].failed);
    assert!(!out[2].failed);

    let failed = &out[1];
    assert!(failed.failed);
    assert_eq!(failed.aggressiveness.score, None);
    assert_eq!(failed.aggressiveness.reason, None);
    for (_, verdict) in failed.moderation.iter() {
        assert!(!verdict.flagged);
        assert_eq!(verdict.score, 0.0);
    }
    assert_eq!(failed.total_aggression, 0.0);

    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn panicking_row_is_isolated() {
    let moderation = FakeModeration::default();
    let rows = posts(&["a", "panic", "c"]);

    let out = analyze(&rows, &moderation, &scorer(), &WeightTable::default(), 2, None).await;

    assert_eq!(out.len(), 3);
    assert!(out[1].failed);
    assert!(out[1].aggressiveness.is_absent());
    assert_eq!(out[0].aggressiveness.score, Some(5));
    assert_eq!(out[2].aggressiveness.score, Some(5));
}

#[tokio::test]
async fn exhausted_retries_leave_score_absent_but_total_present() {
    let moderation = FakeModeration::default();
    let rows = posts(&["unratable"]);

    let out = analyze(&rows, &moderation, &scorer(), &WeightTable::default(), 1, None).await;

    assert_eq!(out.len(), 1);
    let row = &out[0];
    assert!(!row.failed, "retry exhaustion is not a row failure");
    assert!(row.aggressiveness.is_absent());
    assert!(row.aggressiveness.reason.is_none());
    assert_eq!(row.total_aggression, 0.0);
}

#[tokio::test]
async fn totals_use_weights_and_are_recomputable() {
    let moderation = FakeModeration::default();
    let rows = posts(&["hate", "calm"]);
    let weights = WeightTable::default();

    let out = analyze(&rows, &moderation, &scorer(), &weights, 4, None).await;

    // 0.5 * 0.4 + 0.5 * 6 + 2.0 * 1
    assert!((out[0].total_aggression - 5.2).abs() < 1e-9);
    // 0.5 * 5
    assert!((out[1].total_aggression - 2.5).abs() < 1e-9);

    for row in &out {
        assert_eq!(row.recompute_total(&weights), row.total_aggression);
    }
}

// ============================================================
// Ordering and progress
// ============================================================

#[tokio::test]
async fn output_order_matches_input_when_completion_is_reversed() {
    let texts: Vec<String> = (0..12).map(|i| format!("post {i}")).collect();
    // Earlier rows take longer, so completion order is roughly reversed.
    let delays = texts
        .iter()
        .enumerate()
        .map(|(i, t)| (t.clone(), (12 - i as u64) * 5))
        .collect();
    let moderation = FakeModeration::with_delays(delays);
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let rows = posts(&refs);

    let out = analyze(&rows, &moderation, &scorer(), &WeightTable::default(), 12, None).await;

    assert_eq!(out.len(), rows.len());
    for (input, output) in rows.iter().zip(&out) {
        assert_eq!(output.post.index, input.index);
        assert_eq!(output.post.content, input.content);
    }
}

#[tokio::test]
async fn progress_counts_every_row_exactly_once() {
    let texts: Vec<String> = (0..25).map(|i| format!("row {i}")).collect();
    let delays = texts
        .iter()
        .enumerate()
        .map(|(i, t)| (t.clone(), (i as u64 * 7) % 13))
        .collect();
    let moderation = FakeModeration::with_delays(delays);
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let rows = posts(&refs);

    let mut seen = Vec::new();
    let mut on_progress = |done: usize, total: usize| {
        assert_eq!(total, 25);
        seen.push(done);
    };
    analyze(
        &rows,
        &moderation,
        &scorer(),
        &WeightTable::default(),
        5,
        Some(&mut on_progress),
    )
    .await;

    assert_eq!(seen, (1..=25).collect::<Vec<_>>());
}

#[tokio::test]
async fn indices_are_carried_through_unchanged() {
    // Sources may hand over non-contiguous indices; they must survive the merge.
    let rows = vec![Post::new(10, "x"), Post::new(3, "y"), Post::new(42, "z")];
    let moderation = FakeModeration::default();

    let out = analyze(&rows, &moderation, &scorer(), &WeightTable::default(), 8, None).await;

    let indices: Vec<usize> = out.iter().map(|r| r.post.index).collect();
    assert_eq!(indices, vec![10, 3, 42]);
}

// ============================================================
// Concurrency bound and empty input
// ============================================================

#[tokio::test]
async fn in_flight_rows_never_exceed_concurrency() {
    let texts: Vec<String> = (0..16).map(|i| format!("slow {i}")).collect();
    let delays = texts.iter().map(|t| (t.clone(), 20)).collect();
    let moderation = FakeModeration::with_delays(delays);
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let rows = posts(&refs);

    analyze(&rows, &moderation, &scorer(), &WeightTable::default(), 3, None).await;

    assert_eq!(moderation.calls.load(Ordering::SeqCst), 16);
    let peak = moderation.max_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak in-flight {peak} exceeded the bound");
    assert!(peak >= 2, "rows should overlap, peak was {peak}");
}

#[tokio::test]
async fn zero_concurrency_is_treated_as_one() {
    let moderation = FakeModeration::default();
    let rows = posts(&["a", "b"]);

    let out = analyze(&rows, &moderation, &scorer(), &WeightTable::default(), 0, None).await;

    assert_eq!(out.len(), 2);
    assert_eq!(moderation.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_input_schedules_nothing() {
    let moderation = FakeModeration::default();
    let mut calls = 0;
    let mut on_progress = |_: usize, _: usize| calls += 1;

    let out = analyze(
        &[],
        &moderation,
        &scorer(),
        &WeightTable::default(),
        8,
        Some(&mut on_progress),
    )
    .await;

    assert!(out.is_empty());
    assert_eq!(calls, 0);
    assert_eq!(moderation.calls.load(Ordering::SeqCst), 0);
}

// ============================================================
// Row processor and Analyzer wrapper
// ============================================================

#[tokio::test]
async fn process_row_returns_its_index() {
    let moderation = FakeModeration::default();
    let scorer = scorer();

    let (index, outcome) = process_row(17, "hate", &moderation, &scorer).await;
    assert_eq!(index, 17);
    assert!(!outcome.failed);
    assert!(outcome.moderation.flagged(Category::Hate));
    assert_eq!(outcome.aggressiveness.score, Some(6));

    let (index, outcome) = process_row(4, "bad", &moderation, &scorer).await;
    assert_eq!(index, 4);
    assert!(outcome.failed);
}

#[tokio::test]
async fn analyzer_run_uses_its_weights() {
    let moderation = FakeModeration::default();
    let weights = WeightTable {
        aggressiveness_score: Some(1.0),
        ..Default::default()
    };
    let analyzer = Analyzer {
        moderation: Box::new(moderation),
        scorer: scorer(),
        weights,
        concurrency: 2,
    };
    let out = analyzer.run(&posts(&["calm"]), None).await;
    assert!((out[0].total_aggression - 5.0).abs() < 1e-9);
}
