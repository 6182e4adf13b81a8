// Weighted "total aggression" formula.
//
// Five moderation scores, the aggressiveness rating and four moderation
// flags each get a multiplier. Self-harm and the graphic categories carry
// no weight. Keys missing from the weight table fall back to the defaults
// below. The result is not clamped or normalized.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::moderation::{Category, ModerationResult};

pub const DEFAULT_HATE_SCORE: f64 = 0.5;
pub const DEFAULT_HATE_THREATENING_SCORE: f64 = 0.3;
pub const DEFAULT_VIOLENCE_SCORE: f64 = 0.3;
pub const DEFAULT_SEXUAL_SCORE: f64 = 0.1;
pub const DEFAULT_SEXUAL_MINORS_SCORE: f64 = 0.1;
pub const DEFAULT_AGGRESSIVENESS_SCORE: f64 = 0.5;
pub const DEFAULT_HATE_FLAG: f64 = 2.0;
pub const DEFAULT_HATE_THREATENING_FLAG: f64 = 1.0;
pub const DEFAULT_VIOLENCE_FLAG: f64 = 1.5;
pub const DEFAULT_SEXUAL_FLAG: f64 = 1.0;

/// Multipliers for the total aggression formula. `None` means "use the
/// default". Read-only for the duration of a run.
///
/// Keys accept both the underscore spelling and the category-name spelling
/// used in exported columns (`hate_threatening_score` / `hate/threatening_score`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hate_score: Option<f64>,
    #[serde(
        default,
        alias = "hate/threatening_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub hate_threatening_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexual_score: Option<f64>,
    #[serde(
        default,
        alias = "sexual/minors_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub sexual_minors_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggressiveness_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hate_flag: Option<f64>,
    #[serde(
        default,
        alias = "hate/threatening_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub hate_threatening_flag: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violence_flag: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexual_flag: Option<f64>,
}

/// Every weight resolved against its default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedWeights {
    pub hate_score: f64,
    pub hate_threatening_score: f64,
    pub violence_score: f64,
    pub sexual_score: f64,
    pub sexual_minors_score: f64,
    pub aggressiveness_score: f64,
    pub hate_flag: f64,
    pub hate_threatening_flag: f64,
    pub violence_flag: f64,
    pub sexual_flag: f64,
}

impl WeightTable {
    /// Load a weight table from a JSON object file. Missing keys keep their
    /// defaults; unknown keys are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read weights file {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Failed to parse weights file {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Weights must be a JSON object of numbers")
    }

    /// Fill every absent key with its default.
    pub fn resolve(&self) -> ResolvedWeights {
        ResolvedWeights {
            hate_score: self.hate_score.unwrap_or(DEFAULT_HATE_SCORE),
            hate_threatening_score: self
                .hate_threatening_score
                .unwrap_or(DEFAULT_HATE_THREATENING_SCORE),
            violence_score: self.violence_score.unwrap_or(DEFAULT_VIOLENCE_SCORE),
            sexual_score: self.sexual_score.unwrap_or(DEFAULT_SEXUAL_SCORE),
            sexual_minors_score: self
                .sexual_minors_score
                .unwrap_or(DEFAULT_SEXUAL_MINORS_SCORE),
            aggressiveness_score: self
                .aggressiveness_score
                .unwrap_or(DEFAULT_AGGRESSIVENESS_SCORE),
            hate_flag: self.hate_flag.unwrap_or(DEFAULT_HATE_FLAG),
            hate_threatening_flag: self
                .hate_threatening_flag
                .unwrap_or(DEFAULT_HATE_THREATENING_FLAG),
            violence_flag: self.violence_flag.unwrap_or(DEFAULT_VIOLENCE_FLAG),
            sexual_flag: self.sexual_flag.unwrap_or(DEFAULT_SEXUAL_FLAG),
        }
    }
}

/// Compute the composite aggression number for one row.
///
/// An absent aggressiveness score counts as 0 here; the stored field stays
/// absent.
pub fn total_aggression(
    moderation: &ModerationResult,
    aggressiveness_score: Option<u8>,
    weights: &WeightTable,
) -> f64 {
    let w = weights.resolve();
    let flag = |category| if moderation.flagged(category) { 1.0 } else { 0.0 };

    w.hate_score * moderation.score(Category::Hate)
        + w.hate_threatening_score * moderation.score(Category::HateThreatening)
        + w.violence_score * moderation.score(Category::Violence)
        + w.sexual_score * moderation.score(Category::Sexual)
        + w.sexual_minors_score * moderation.score(Category::SexualMinors)
        + w.aggressiveness_score * f64::from(aggressiveness_score.unwrap_or(0))
        + w.hate_flag * flag(Category::Hate)
        + w.hate_threatening_flag * flag(Category::HateThreatening)
        + w.violence_flag * flag(Category::Violence)
        + w.sexual_flag * flag(Category::Sexual)
}
