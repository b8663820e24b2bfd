use std::env;
use std::path::PathBuf;

use crate::error::{ImageGenError, Result};
use crate::models::Quality;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "IMGEN_MODEL";
pub const LOG_LEVEL_VAR: &str = "IMGEN_LOG";
pub const LOG_FILE_VAR: &str = "IMGEN_LOG_FILE";
pub const LOG_JSON_VAR: &str = "IMGEN_LOG_JSON";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "dall-e-3";
pub const DEFAULT_OUTPUT_DIR: &str = "generated_images";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub quality: Quality,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Config {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            quality: Quality::Standard,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_VAR).ok_or_else(|| {
            ImageGenError::Config(format!("{} environment variable not set.", API_KEY_VAR))
        })?;

        let mut config = Config::new(api_key);
        if let Some(base_url) = get(BASE_URL_VAR) {
            config = config.with_base_url(base_url);
        }
        if let Some(model) = get(MODEL_VAR) {
            config = config.with_model(model);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}
