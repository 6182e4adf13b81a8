use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::aggressiveness::backend::{
    DEFAULT_AGGRESSION_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
};
use crate::aggressiveness::prompt::PromptTemplate;
use crate::aggressiveness::scorer::DEFAULT_MAX_RETRIES;
use crate::moderation::openai::DEFAULT_MODERATION_MODEL;
use crate::openai::client::DEFAULT_OPENAI_BASE_URL;
use crate::pipeline::DEFAULT_CONCURRENCY;
use crate::scoring::weights::WeightTable;
use crate::source::bluesky::DEFAULT_PUBLIC_API_URL;

/// Default per-request timeout for remote calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub moderation_model: String,
    pub aggression_model: String,
    pub temperature: f32,
    pub top_p: f32,
    /// Scoring attempts per post, including the first
    pub max_retries: u32,
    /// Posts analyzed concurrently
    pub concurrency: usize,
    /// Upper bound on any single remote call
    pub request_timeout: Duration,
    /// Optional JSON weight table; defaults apply when unset
    pub weights_path: Option<PathBuf>,
    /// Optional prompt template file with a `{text}` placeholder
    pub prompt_path: Option<PathBuf>,
    /// Public AT Protocol API endpoint for fetching posts
    pub public_api_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nothing here is required up front — the API key is only needed for
    /// analysis, so commands check it with `require_openai` before they start.
    pub fn load() -> Result<Self> {
        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            moderation_model: env::var("MODERATION_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODERATION_MODEL.to_string()),
            aggression_model: env::var("AGGRESSION_MODEL")
                .unwrap_or_else(|_| DEFAULT_AGGRESSION_MODEL.to_string()),
            temperature: env_parse("AGGRESSION_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            top_p: env_parse("AGGRESSION_TOP_P", DEFAULT_TOP_P)?,
            max_retries: env_parse("AGGRESSION_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            concurrency: env_parse("AGGRESSION_CONCURRENCY", DEFAULT_CONCURRENCY)?,
            request_timeout: Duration::from_secs(env_parse(
                "AGGRESSION_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            weights_path: env::var("AGGRESSION_WEIGHTS_PATH").ok().map(PathBuf::from),
            prompt_path: env::var("AGGRESSION_PROMPT_PATH").ok().map(PathBuf::from),
            public_api_url: env::var("PUBLIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_API_URL.to_string()),
        })
    }

    /// Check that the OpenAI API key is configured.
    /// Call this before any operation that sends posts for analysis.
    pub fn require_openai(&self) -> Result<()> {
        if self.openai_api_key.trim().is_empty() {
            anyhow::bail!(
                "OPENAI_API_KEY not set. Add it to your .env file.\n\
                 Both the moderation and aggressiveness calls need it."
            );
        }
        Ok(())
    }

    /// The configured weight table, or all defaults when no file is set.
    pub fn load_weights(&self) -> Result<WeightTable> {
        match &self.weights_path {
            Some(path) => WeightTable::load(path),
            None => Ok(WeightTable::default()),
        }
    }

    /// The configured prompt template, or the built-in one.
    pub fn load_prompt(&self) -> Result<PromptTemplate> {
        match &self.prompt_path {
            Some(path) => PromptTemplate::load(path),
            None => Ok(PromptTemplate::default()),
        }
    }
}

/// Parse an env var, falling back to `default` when it is unset or blank.
fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {value:?}")),
        _ => Ok(default),
    }
}
