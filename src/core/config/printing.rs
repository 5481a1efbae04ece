use crate::core::config::data::Config;

impl Config {
    /// Effective configuration, one `key: value` line per setting.
    pub fn describe(&self) -> Vec<String> {
        let params = self.decoding_params();
        let origin = |set: bool| if set { "" } else { " (default)" };

        let stop = if params.stop.is_empty() {
            "(none)".to_string()
        } else {
            params.stop.join(", ")
        };

        vec![
            format!("endpoint: {}{}", self.endpoint_or_default(), origin(self.endpoint.is_some())),
            format!("model: {}{}", self.model_or_default(), origin(self.model.is_some())),
            format!(
                "api-key-env: {}{}",
                self.api_key_env_or_default(),
                origin(self.api_key_env.is_some())
            ),
            format!(
                "system-prompt: {}",
                self.system_prompt.as_deref().unwrap_or("(unset)")
            ),
            format!("temperature: {}{}", params.temperature, origin(self.temperature.is_some())),
            format!("top-p: {}{}", params.top_p, origin(self.top_p.is_some())),
            format!(
                "frequency-penalty: {}{}",
                params.frequency_penalty,
                origin(self.frequency_penalty.is_some())
            ),
            format!(
                "presence-penalty: {}{}",
                params.presence_penalty,
                origin(self.presence_penalty.is_some())
            ),
            format!("max-tokens: {}{}", params.max_tokens, origin(self.max_tokens.is_some())),
            format!("stop: {stop}{}", origin(self.stop.is_some())),
            format!(
                "poll-interval-ms: {}{}",
                self.poll_interval().as_millis(),
                origin(self.poll_interval_ms.is_some())
            ),
            format!("theme: {}{}", self.theme_or_default(), origin(self.theme.is_some())),
        ]
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        for line in self.describe() {
            println!("  {line}");
        }
    }
}
