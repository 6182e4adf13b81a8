// Aggressiveness scoring — a generative model rates each post 0-10.
//
// The scorer renders a prompt, asks the completion backend for a JSON
// object, and validates the score it gets back. Failed attempts are
// retried with a fixed backoff; exhausting them yields an absent score,
// never an error.

pub mod backend;
pub mod backoff;
pub mod prompt;
pub mod scorer;

use serde::{Deserialize, Serialize};

pub use backend::{CompletionBackend, CompletionRequest, OpenAiCompletion};
pub use backoff::{Backoff, FixedBackoff, NoBackoff};
pub use prompt::PromptTemplate;
pub use scorer::AggressivenessScorer;

/// Highest valid aggressiveness score.
pub const MAX_SCORE: u8 = 10;

/// A validated aggressiveness rating, or the absent pair when none could be
/// obtained.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggressivenessResult {
    /// 0-10, absent when every attempt failed
    pub score: Option<u8>,
    /// Short justification, absent whenever `score` is absent
    pub reason: Option<String>,
}

impl AggressivenessResult {
    pub fn scored(score: u8, reason: impl Into<String>) -> Self {
        Self {
            score: Some(score),
            reason: Some(reason.into()),
        }
    }

    /// The "unobtainable after retries" sentinel.
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.score.is_none()
    }
}
