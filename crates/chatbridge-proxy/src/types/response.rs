use serde::{Deserialize, Serialize};

/// Completion assembled from an upstream event stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Upstream response ID, or a generated UUID when none was streamed
    pub id: String,
    /// Always `chat.completion`
    pub object: ChatCompletionObject,
    /// Unix timestamp in seconds
    pub created: u64,
    /// Model reported by the upstream, empty when never reported
    pub model: String,
    /// Exactly one choice
    pub choices: Vec<Choice>,
}

/// Object tag of a non-streamed chat completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatCompletionObject {
    #[default]
    #[serde(rename = "chat.completion")]
    ChatCompletion,
}

/// A single completion choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Index of this choice
    pub index: u32,
    /// Generated message
    pub message: ChoiceMessage,
    /// Why generation stopped (e.g. `stop`, `length`)
    pub finish_reason: String,
}

/// Message content within a response choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    /// Role is always assistant for completions
    pub role: String,
    /// Concatenated text content
    pub content: String,
}

impl ChoiceMessage {
    /// Create a text message from the assistant
    pub fn assistant(content: String) -> Self {
        Self {
            role: "assistant".to_owned(),
            content,
        }
    }
}

impl CompletionResponse {
    /// Text of the first choice
    pub fn text(&self) -> &str {
        self.choices.first().map_or("", |c| c.message.content.as_str())
    }

    /// Finish reason of the first choice
    pub fn finish_reason(&self) -> &str {
        self.choices.first().map_or("", |c| c.finish_reason.as_str())
    }
}
