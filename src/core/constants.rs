//! Shared constants used across the application

pub const DEFAULT_ENDPOINT: &str = "https://integrate.api.nvidia.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-ai/deepseek-r1";
pub const DEFAULT_API_KEY_ENV: &str = "NIM_DS_API_KEY";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// How often the UI loop drains the render queue.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// SSE framing prefix in front of every event payload.
pub const SSE_DATA_PREFIX: &str = "data:";
/// End-of-stream sentinel payload.
pub const STREAM_SENTINEL: &str = "[DONE]";
/// Code fence marker of the supported Markdown subset.
pub const FENCE_MARKER: &str = "```";
pub const BOLD_MARKER: &str = "**";

pub const CANCELLED_MARKER: &str = "[interrupted by user]";

/// Space reserved for the streaming indicator + margin in the input box.
pub const INDICATOR_SPACE: u16 = 4;
