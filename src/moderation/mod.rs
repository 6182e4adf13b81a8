// Moderation classification — trait-based abstraction over the remote classifier.
//
// ModerationClient defines the interface. OpenAiModeration implements it
// against the OpenAI moderation endpoint; tests swap in fakes.

pub mod openai;
pub mod traits;

pub use traits::{Category, CategoryVerdict, ModerationClient, ModerationResult};
