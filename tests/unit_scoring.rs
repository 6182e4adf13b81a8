// Unit tests for the weighted aggregate and weight table loading.
//
// Tests the pure total_aggression formula (default weights, overrides,
// the deliberately unweighted categories), WeightTable JSON parsing with
// both key spellings, and truncate_chars UTF-8 safety.

use aggression_analyzer::moderation::{Category, ModerationResult};
use aggression_analyzer::output::truncate_chars;
use aggression_analyzer::scoring::weights::{total_aggression, WeightTable};

fn all_categories_maxed() -> ModerationResult {
    Category::ALL
        .into_iter()
        .fold(ModerationResult::neutral(), |acc, c| acc.with(c, true, 1.0))
}

// ============================================================
// total_aggression — default weights
// ============================================================

#[test]
fn default_weight_scenario() {
    let row = ModerationResult::neutral().with(Category::Hate, true, 0.4);
    let total = total_aggression(&row, Some(6), &WeightTable::default());
    // 0.5 * 0.4 + 0.5 * 6 + 2.0 * 1 = 5.2
    assert!((total - 5.2).abs() < 1e-9, "Expected 5.2, got {total}");
}

#[test]
fn every_weighted_term_at_maximum() {
    let total = total_aggression(&all_categories_maxed(), Some(10), &WeightTable::default());
    // scores: 0.5 + 0.3 + 0.3 + 0.1 + 0.1 = 1.3
    // aggressiveness: 0.5 * 10 = 5.0
    // flags: 2.0 + 1.0 + 1.5 + 1.0 = 5.5
    assert!((total - 11.8).abs() < 1e-9, "Expected 11.8, got {total}");
}

#[test]
fn flag_without_score_still_counts() {
    let row = ModerationResult::neutral().with(Category::HateThreatening, true, 0.0);
    let total = total_aggression(&row, None, &WeightTable::default());
    assert!((total - 1.0).abs() < 1e-9, "Expected 1.0, got {total}");
}

#[test]
fn score_without_flag_counts_only_score_weight() {
    let row = ModerationResult::neutral().with(Category::Sexual, false, 0.6);
    let total = total_aggression(&row, None, &WeightTable::default());
    assert!((total - 0.06).abs() < 1e-9, "Expected 0.06, got {total}");
}

#[test]
fn sexual_minors_flag_has_no_weight() {
    let row = ModerationResult::neutral().with(Category::SexualMinors, true, 0.0);
    let total = total_aggression(&row, None, &WeightTable::default());
    assert_eq!(total, 0.0);
}

#[test]
fn self_harm_and_graphic_categories_are_unweighted() {
    let row = ModerationResult::neutral()
        .with(Category::SelfHarm, true, 1.0)
        .with(Category::ViolenceGraphic, true, 1.0);
    assert_eq!(total_aggression(&row, None, &WeightTable::default()), 0.0);
}

#[test]
fn absent_aggressiveness_is_zero_in_formula() {
    let row = ModerationResult::neutral().with(Category::Hate, true, 0.4);
    let with_zero = total_aggression(&row, Some(0), &WeightTable::default());
    let with_absent = total_aggression(&row, None, &WeightTable::default());
    assert_eq!(with_zero, with_absent);
}

#[test]
fn same_inputs_same_total() {
    let row = ModerationResult::neutral()
        .with(Category::Violence, true, 0.37)
        .with(Category::Hate, false, 0.12);
    let weights = WeightTable::default();
    let first = total_aggression(&row, Some(3), &weights);
    let second = total_aggression(&row.clone(), Some(3), &weights.clone());
    assert_eq!(first, second);
}

#[test]
fn no_clamping_above_ten() {
    let weights = WeightTable {
        aggressiveness_score: Some(5.0),
        ..Default::default()
    };
    let total = total_aggression(&ModerationResult::neutral(), Some(10), &weights);
    assert!((total - 50.0).abs() < 1e-9);
}

#[test]
fn negative_weights_are_applied_as_given() {
    let weights = WeightTable {
        hate_flag: Some(-2.0),
        ..Default::default()
    };
    let row = ModerationResult::neutral().with(Category::Hate, true, 0.0);
    let total = total_aggression(&row, None, &weights);
    assert!((total + 2.0).abs() < 1e-9);
}

// ============================================================
// WeightTable — JSON parsing
// ============================================================

#[test]
fn empty_object_means_all_defaults() {
    let weights = WeightTable::from_json("{}").unwrap();
    assert_eq!(weights, WeightTable::default());
}

#[test]
fn partial_table_overrides_only_named_keys() {
    let weights = WeightTable::from_json(r#"{"hate_score": 0.9, "violence_flag": 3.0}"#).unwrap();
    let resolved = weights.resolve();
    assert_eq!(resolved.hate_score, 0.9);
    assert_eq!(resolved.violence_flag, 3.0);
    assert_eq!(resolved.hate_flag, 2.0);
    assert_eq!(resolved.sexual_score, 0.1);
}

#[test]
fn slash_spelling_keys_are_accepted() {
    let weights = WeightTable::from_json(
        r#"{"hate/threatening_score": 0.7, "sexual/minors_score": 0.2, "hate/threatening_flag": 4.0}"#,
    )
    .unwrap();
    assert_eq!(weights.hate_threatening_score, Some(0.7));
    assert_eq!(weights.sexual_minors_score, Some(0.2));
    assert_eq!(weights.hate_threatening_flag, Some(4.0));
}

#[test]
fn unknown_keys_are_ignored() {
    let weights = WeightTable::from_json(r#"{"self-harm_score": 1.0, "hate_flag": 1.0}"#).unwrap();
    assert_eq!(weights.hate_flag, Some(1.0));
}

#[test]
fn non_numeric_weight_is_an_error() {
    assert!(WeightTable::from_json(r#"{"hate_score": "high"}"#).is_err());
    assert!(WeightTable::from_json("0.5").is_err());
}

#[test]
fn load_missing_file_is_an_error() {
    let path = std::env::temp_dir().join("aggression-analyzer-no-such-weights.json");
    let _ = std::fs::remove_file(&path);
    assert!(WeightTable::load(&path).is_err());
}

#[test]
fn load_from_file() {
    let path = std::env::temp_dir().join(format!(
        "aggression-analyzer-weights-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, r#"{"aggressiveness_score": 1.0}"#).unwrap();
    let weights = WeightTable::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(weights.resolve().aggressiveness_score, 1.0);
}

// ============================================================
// truncate_chars — UTF-8 safety
// ============================================================

#[test]
fn truncate_short_text_unchanged() {
    assert_eq!(truncate_chars("hello", 10), "hello");
}

#[test]
fn truncate_exact_length_unchanged() {
    assert_eq!(truncate_chars("hello", 5), "hello");
}

#[test]
fn truncate_long_text_gets_ellipsis() {
    assert_eq!(truncate_chars("hello world", 5), "hello...");
}

#[test]
fn truncate_multibyte_does_not_panic() {
    let text = "攻撃的な投稿です🔥🔥🔥";
    assert_eq!(truncate_chars(text, 4), "攻撃的な...");
}
