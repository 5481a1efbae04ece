use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::io::ConfigError;

/// Keys accepted by `nimchat set` / `nimchat unset`, in display order.
pub const CONFIG_KEYS: &[&str] = &[
    "endpoint",
    "model",
    "api-key-env",
    "system-prompt",
    "temperature",
    "top-p",
    "frequency-penalty",
    "presence-penalty",
    "max-tokens",
    "stop",
    "poll-interval-ms",
    "theme",
];

pub const THEMES: &[&str] = &["dark", "light", "mono"];

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Full URL of the chat completions endpoint
    pub endpoint: Option<String>,
    pub model: Option<String>,
    /// Name of the environment variable holding the bearer credential
    pub api_key_env: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Stop sequences sent with every request
    pub stop: Option<Vec<String>>,
    /// How often the UI drains streamed output, in milliseconds
    pub poll_interval_ms: Option<u64>,
    /// UI theme name ("dark", "light", "mono")
    pub theme: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_unit_interval(key: &str, value: &str, max: f32) -> Result<f32, ConfigError> {
    let parsed: f32 = parse_value(key, value)?;
    if parsed.is_finite() && (0.0..=max).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

fn parse_penalty(key: &str, value: &str) -> Result<f32, ConfigError> {
    let parsed: f32 = parse_value(key, value)?;
    if parsed.is_finite() && (-2.0..=2.0).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl Config {
    /// Sets `key` from its command-line spelling.
    ///
    /// `stop` takes a comma-separated list; every other key a single value.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "endpoint" => {
                let trimmed = value.trim();
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.endpoint = Some(trimmed.to_string());
            }
            "model" => self.model = Some(value.trim().to_string()),
            "api-key-env" => self.api_key_env = Some(value.trim().to_string()),
            "system-prompt" => self.system_prompt = Some(value.to_string()),
            "temperature" => self.temperature = Some(parse_unit_interval(key, value, 2.0)?),
            "top-p" => self.top_p = Some(parse_unit_interval(key, value, 1.0)?),
            "frequency-penalty" => self.frequency_penalty = Some(parse_penalty(key, value)?),
            "presence-penalty" => self.presence_penalty = Some(parse_penalty(key, value)?),
            "max-tokens" => self.max_tokens = Some(parse_value(key, value)?),
            "stop" => {
                self.stop = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                )
            }
            "poll-interval-ms" => {
                let interval: u64 = parse_value(key, value)?;
                if interval == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.poll_interval_ms = Some(interval);
            }
            "theme" => {
                let theme = value.trim().to_lowercase();
                if !THEMES.contains(&theme.as_str()) {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.theme = Some(theme);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), ConfigError> {
        match key {
            "endpoint" => self.endpoint = None,
            "model" => self.model = None,
            "api-key-env" => self.api_key_env = None,
            "system-prompt" => self.system_prompt = None,
            "temperature" => self.temperature = None,
            "top-p" => self.top_p = None,
            "frequency-penalty" => self.frequency_penalty = None,
            "presence-penalty" => self.presence_penalty = None,
            "max-tokens" => self.max_tokens = None,
            "stop" => self.stop = None,
            "poll-interval-ms" => self.poll_interval_ms = None,
            "theme" => self.theme = None,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}
