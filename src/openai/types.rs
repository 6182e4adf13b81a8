// Serde types for the two OpenAI endpoints we call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// -- /moderations --

#[derive(Debug, Serialize)]
pub struct ModerationRequest<'a> {
    pub input: &'a str,
    pub model: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ModerationResponse {
    pub results: Vec<ModerationEntry>,
}

/// One classified input. `categories` and `category_scores` are keyed by
/// category name (`hate`, `hate/threatening`, ...).
#[derive(Debug, Deserialize)]
pub struct ModerationEntry {
    #[serde(default)]
    pub categories: HashMap<String, bool>,
    #[serde(default)]
    pub category_scores: HashMap<String, f64>,
}

// -- /chat/completions --

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    pub top_p: f32,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    /// Null when the model refused or returned only tool calls
    pub content: Option<String>,
}
