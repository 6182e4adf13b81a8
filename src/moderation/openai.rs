// OpenAI moderation endpoint implementation.
//
// API docs: https://platform.openai.com/docs/api-reference/moderations

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::traits::{ModerationClient, ModerationResult};
use crate::openai::client::OpenAiClient;
use crate::openai::types::{ModerationRequest, ModerationResponse};
use crate::output::truncate_chars;

/// Default classifier model.
pub const DEFAULT_MODERATION_MODEL: &str = "text-moderation-latest";

/// Moderation classifier backed by the OpenAI API.
pub struct OpenAiModeration {
    client: OpenAiClient,
    model: String,
}

impl OpenAiModeration {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ModerationClient for OpenAiModeration {
    async fn classify(&self, text: &str) -> Result<ModerationResult> {
        let request = ModerationRequest {
            input: text,
            model: &self.model,
        };

        let response: ModerationResponse = self
            .client
            .post_json("moderations", &request)
            .await
            .context("Moderation call failed")?;

        let result = moderation_from_response(&response)?;

        debug!(
            flagged = ?result.flagged_categories(),
            text_preview = %truncate_chars(text, 50),
            "Classified text"
        );

        Ok(result)
    }
}

/// Convert the first entry of a moderation response into our fixed schema.
pub fn moderation_from_response(response: &ModerationResponse) -> Result<ModerationResult> {
    let entry = response
        .results
        .first()
        .ok_or_else(|| anyhow::anyhow!("Moderation response contained no results"))?;
    Ok(ModerationResult::from_maps(
        &entry.categories,
        &entry.category_scores,
    ))
}
