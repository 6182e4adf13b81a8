// Data models — the rows that flow through the analysis pipeline.
//
// A Post comes in from a source (Bluesky feed or a JSON file), an
// AnalyzedRow comes out of the pipeline and goes to the terminal table
// and the JSON export.

use serde::{Deserialize, Serialize};

use crate::aggressiveness::AggressivenessResult;
use crate::moderation::ModerationResult;
use crate::scoring::weights::{self, WeightTable};

/// One post to analyze. Immutable once read from its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Stable ordinal, assigned by input order
    pub index: usize,
    pub content: String,
    pub timestamp: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
}

impl Post {
    /// Build a post with only content set. Mostly useful in tests.
    pub fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
            timestamp: None,
            url: None,
            author: None,
        }
    }
}

/// A post plus everything the pipeline learned about it.
#[derive(Debug, Clone)]
pub struct AnalyzedRow {
    pub post: Post,
    pub moderation: ModerationResult,
    pub aggressiveness: AggressivenessResult,
    /// Weighted composite of the moderation and aggressiveness signals
    pub total_aggression: f64,
    /// True when row processing failed and the fields above are the
    /// neutral placeholder rather than real results.
    pub failed: bool,
}

impl AnalyzedRow {
    /// Recompute the weighted aggregate from this row's stored fields.
    pub fn recompute_total(&self, weights: &WeightTable) -> f64 {
        weights::total_aggression(&self.moderation, self.aggressiveness.score, weights)
    }

    /// Whether this row reached `threshold` on the composite score.
    pub fn is_above(&self, threshold: f64) -> bool {
        self.total_aggression >= threshold
    }
}
