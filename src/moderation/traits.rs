// Moderation classifier trait and its fixed result schema.
//
// The classifier reports a flag and a score for each of seven harm
// categories. Categories are a closed enum so every consumer indexes the
// same fixed-size table instead of looking fields up by name.

use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The seven moderation categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Hate,
    HateThreatening,
    SelfHarm,
    Sexual,
    SexualMinors,
    Violence,
    ViolenceGraphic,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Hate,
        Category::HateThreatening,
        Category::SelfHarm,
        Category::Sexual,
        Category::SexualMinors,
        Category::Violence,
        Category::ViolenceGraphic,
    ];

    /// Name used by the moderation API and in exported column names.
    pub fn wire_name(self) -> &'static str {
        match self {
            Category::Hate => "hate",
            Category::HateThreatening => "hate/threatening",
            Category::SelfHarm => "self-harm",
            Category::Sexual => "sexual",
            Category::SexualMinors => "sexual/minors",
            Category::Violence => "violence",
            Category::ViolenceGraphic => "violence/graphic",
        }
    }

    /// Parse an API category name. Accepts the underscore spelling too
    /// (`hate_threatening`), which some client libraries use.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        let normalized = name.replace('_', "/");
        Category::ALL.into_iter().find(|c| {
            c.wire_name() == normalized || c.wire_name().replace('-', "/") == normalized
        })
    }

    fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Flag and score for one category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryVerdict {
    pub flagged: bool,
    /// Classifier confidence, designed around 0.0-1.0
    pub score: f64,
}

/// Per-category flags and scores for one piece of text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModerationResult {
    verdicts: [CategoryVerdict; 7],
}

impl ModerationResult {
    /// All flags false, all scores 0.0. Used for rows whose processing failed.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Build a result from name-keyed maps as returned by the API.
    /// Unknown names are ignored; missing categories stay (false, 0.0).
    pub fn from_maps(flags: &HashMap<String, bool>, scores: &HashMap<String, f64>) -> Self {
        let mut result = Self::neutral();
        for (name, flagged) in flags {
            if let Some(category) = Category::from_wire_name(name) {
                result.verdicts[category.position()].flagged = *flagged;
            }
        }
        for (name, score) in scores {
            if let Some(category) = Category::from_wire_name(name) {
                result.verdicts[category.position()].score = *score;
            }
        }
        result
    }

    /// Builder-style setter, handy for fakes and tests.
    pub fn with(mut self, category: Category, flagged: bool, score: f64) -> Self {
        self.verdicts[category.position()] = CategoryVerdict { flagged, score };
        self
    }

    pub fn verdict(&self, category: Category) -> CategoryVerdict {
        self.verdicts[category.position()]
    }

    pub fn flagged(&self, category: Category) -> bool {
        self.verdict(category).flagged
    }

    pub fn score(&self, category: Category) -> f64 {
        self.verdict(category).score
    }

    /// Categories whose flag is set, in display order.
    pub fn flagged_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.flagged(*c))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, CategoryVerdict)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.verdict(c)))
    }
}

/// Trait for moderation classifiers. Implementations are shared across all
/// concurrent row tasks, so they must not hold per-call mutable state.
#[async_trait]
pub trait ModerationClient: Send + Sync {
    /// Classify a single text.
    async fn classify(&self, text: &str) -> Result<ModerationResult>;
}
