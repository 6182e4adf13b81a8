// Aggressiveness scorer — bounded retry loop with score validation.
//
// Each attempt renders the prompt, asks the backend for a JSON object and
// checks that it carries an integer `score` in 0..=10. Transport errors,
// malformed JSON and out-of-range scores all count as a failed attempt.
// When every attempt fails the result is the absent pair, which the
// pipeline treats as a valid outcome for that row.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use super::backend::{
    CompletionBackend, CompletionRequest, DEFAULT_AGGRESSION_MODEL, DEFAULT_TEMPERATURE,
    DEFAULT_TOP_P,
};
use super::backoff::{Backoff, FixedBackoff};
use super::prompt::PromptTemplate;
use super::{AggressivenessResult, MAX_SCORE};
use crate::output::truncate_chars;

/// Attempts per text, including the first.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Rates texts 0-10 using a generative completion backend.
pub struct AggressivenessScorer {
    backend: Box<dyn CompletionBackend>,
    backoff: Box<dyn Backoff>,
    template: PromptTemplate,
    model: String,
    temperature: f32,
    top_p: f32,
    max_retries: u32,
}

impl AggressivenessScorer {
    /// Scorer with the default model, sampling, retry count and 1s backoff.
    pub fn new(backend: Box<dyn CompletionBackend>, template: PromptTemplate) -> Self {
        Self {
            backend,
            backoff: Box::new(FixedBackoff::default()),
            template,
            model: DEFAULT_AGGRESSION_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_sampling(mut self, temperature: f32, top_p: f32) -> Self {
        self.temperature = temperature;
        self.top_p = top_p;
        self
    }

    /// Total attempts per text. Values below 1 are raised to 1.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Box<dyn Backoff>) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    /// Rate `text`. Never fails: exhausted retries give the absent result.
    pub async fn score(&self, text: &str) -> AggressivenessResult {
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: self.template.render(text),
            temperature: self.temperature,
            top_p: self.top_p,
        };

        for attempt in 1..=self.max_retries {
            match self.attempt(&request).await {
                Ok((score, reason)) => {
                    debug!(
                        score = score,
                        attempt = attempt,
                        text_preview = %truncate_chars(text, 50),
                        "Rated aggressiveness"
                    );
                    return AggressivenessResult::scored(score, reason);
                }
                Err(e) => {
                    warn!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        error = %format!("{e:#}"),
                        "Aggressiveness attempt failed"
                    );
                }
            }

            if attempt < self.max_retries {
                self.backoff.wait(attempt).await;
            }
        }

        warn!(
            max_retries = self.max_retries,
            text_preview = %truncate_chars(text, 50),
            "Giving up on aggressiveness score"
        );
        AggressivenessResult::absent()
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<(u8, String)> {
        let content = self.backend.complete_json(request).await?;
        parse_rating(&content)
    }
}

/// Parse and validate a `{"score": int, "reason": string}` completion.
///
/// Integer-valued strings and floats (`"7"`, `7.0`) are accepted; anything
/// else non-integral, or outside 0..=10, is rejected.
pub fn parse_rating(content: &str) -> Result<(u8, String)> {
    let value: Value =
        serde_json::from_str(content.trim()).context("Completion is not valid JSON")?;
    let object = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("Completion is not a JSON object"))?;

    let raw_score = object
        .get("score")
        .ok_or_else(|| anyhow::anyhow!("Completion has no score field"))?;
    let score = integer_score(raw_score)?;
    if !(0..=i64::from(MAX_SCORE)).contains(&score) {
        anyhow::bail!("Score {score} is outside 0..={MAX_SCORE}");
    }

    let reason = match object.get("reason") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    Ok((score as u8, reason))
}

fn integer_score(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
                _ => anyhow::bail!("Score {n} is not an integer"),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .with_context(|| format!("Score {s:?} is not an integer")),
        other => anyhow::bail!("Score {other} is not an integer"),
    }
}
