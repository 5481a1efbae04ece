//! Wire payloads for OpenAI-compatible chat completion endpoints.

use serde::{Deserialize, Serialize};

pub const ROLE_SYSTEM: &str = "system";
pub const ROLE_USER: &str = "user";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Sampling knobs sent with every request.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub max_tokens: u32,
    pub stop: Vec<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub max_tokens: u32,
    pub stop: Vec<String>,
    pub stream: bool,
}

impl ChatRequest {
    /// Builds a single-turn streaming request for `query`.
    ///
    /// Only the optional system prompt and the query itself are sent; earlier
    /// exchanges are never replayed.
    pub fn single_turn(
        model: &str,
        system_prompt: Option<&str>,
        query: &str,
        params: &DecodingParams,
    ) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(prompt) = system_prompt.filter(|p| !p.trim().is_empty()) {
            messages.push(ChatMessage::new(ROLE_SYSTEM, prompt));
        }
        messages.push(ChatMessage::new(ROLE_USER, query));

        Self {
            model: model.to_string(),
            messages,
            temperature: params.temperature,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
            max_tokens: params.max_tokens,
            stop: params.stop.clone(),
            stream: true,
        }
    }
}

#[derive(Deserialize)]
pub struct ChatResponseDelta {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatResponseChoice {
    pub delta: ChatResponseDelta,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatResponseChoice>,
}

impl ChatResponse {
    /// The incremental text carried by the first choice, if any.
    pub fn first_delta_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DecodingParams {
        DecodingParams {
            temperature: 0.7,
            top_p: 0.7,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            max_tokens: 4096,
            stop: vec!["</s>".to_string()],
        }
    }

    #[test]
    fn single_turn_request_serializes_every_decoding_field() {
        let request = ChatRequest::single_turn("deepseek-ai/deepseek-r1", None, "2+2?", &params());
        let value = serde_json::to_value(&request).expect("serialize");

        assert_eq!(value["model"], "deepseek-ai/deepseek-r1");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "2+2?");
        assert_eq!(value["max_tokens"], 4096);
        assert_eq!(value["stop"][0], "</s>");
        assert_eq!(value["stream"], true);
        assert!(value["temperature"].as_f64().is_some());
        assert!(value["top_p"].as_f64().is_some());
        assert_eq!(value["frequency_penalty"], 0.0);
        assert_eq!(value["presence_penalty"], 0.0);
    }

    #[test]
    fn system_prompt_is_sent_first_when_present() {
        let request =
            ChatRequest::single_turn("m", Some("Answer tersely."), "hello", &params());
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, ROLE_SYSTEM);
        assert_eq!(request.messages[1].content, "hello");

        let blank = ChatRequest::single_turn("m", Some("  "), "hello", &params());
        assert_eq!(blank.messages.len(), 1);
    }

    #[test]
    fn delta_content_reads_first_choice() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":"4"},"finish_reason":null}]}"#)
                .expect("parse");
        assert_eq!(response.first_delta_content(), Some("4"));

        let role_only: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#)
                .expect("parse");
        assert_eq!(role_only.first_delta_content(), None);

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).expect("parse");
        assert_eq!(empty.first_delta_content(), None);
    }
}
