use std::time::Duration;

use crate::api::DecodingParams;
use crate::core::config::data::Config;
use crate::core::constants::{
    DEFAULT_API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
};

impl Config {
    pub fn endpoint_or_default(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn api_key_env_or_default(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }

    pub fn theme_or_default(&self) -> &str {
        self.theme.as_deref().unwrap_or("dark")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.poll_interval_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        )
    }

    pub fn decoding_params(&self) -> DecodingParams {
        DecodingParams {
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: self.top_p.unwrap_or(DEFAULT_TOP_P),
            frequency_penalty: self.frequency_penalty.unwrap_or(0.0),
            presence_penalty: self.presence_penalty.unwrap_or(0.0),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            stop: self.stop.clone().unwrap_or_default(),
        }
    }

    /// Reads the credential from the configured environment variable.
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn read_api_key(&self) -> Option<String> {
        std::env::var(self.api_key_env_or_default())
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
