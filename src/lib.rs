// Aggression analyzer: moderation and aggressiveness scoring for social posts.
//
// This is the library root. Each module corresponds to a major subsystem
// of the analysis pipeline.

pub mod aggressiveness;
pub mod config;
pub mod models;
pub mod moderation;
pub mod openai;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod source;
