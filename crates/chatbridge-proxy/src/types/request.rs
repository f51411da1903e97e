use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize::RequestEncoding;

/// MIME type declared for every attached image, whatever its real format
const IMAGE_MIME: &str = "image/png";

/// Role of a message author
///
/// Normalized requests only ever carry user messages; other roles only
/// reach the upstream through pass-through JSON bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End-user input
    User,
}

/// Message in the upstream request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Role of the message author
    pub role: Role,
    /// Message content
    pub content: Content,
}

/// Message content, either plain text or structured parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Content {
    /// Plain text content
    Text(String),
    /// Ordered content parts, used for binary attachments
    Parts(Vec<ContentPart>),
}

impl Content {
    /// Single-part content embedding `bytes` as a base64 PNG data URI
    pub fn png_image(bytes: &[u8]) -> Self {
        Self::Parts(vec![ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:{IMAGE_MIME};base64,{}", STANDARD.encode(bytes)),
            },
        }])
    }
}

/// Individual part within structured content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Image reference
    ImageUrl {
        /// Location of the image
        image_url: ImageUrl,
    },
}

/// Image location within an image content part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUrl {
    /// Data URI carrying the base64-encoded image
    pub url: String,
}

/// Upstream-ready chat-completion request built by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRequest {
    /// Model identifier
    pub model: String,
    /// Whether the upstream should stream its answer
    pub stream: bool,
    /// Conversation messages, never empty
    pub messages: Vec<Message>,
}

impl CanonicalRequest {
    /// Request holding a single user message
    pub fn single_user(model: String, stream: bool, content: Content) -> Self {
        Self {
            model,
            stream,
            messages: vec![Message {
                role: Role::User,
                content,
            }],
        }
    }
}

/// JSON body sent to the upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UpstreamBody {
    /// Request assembled from `text`/`prompt`/`image` fields
    Canonical(CanonicalRequest),
    /// Caller-built request with a `messages` array, forwarded minus `provider`
    Passthrough(Map<String, Value>),
}

/// Result of normalizing one inbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    /// Encoding the body was parsed with
    pub encoding: RequestEncoding,
    /// Raw `provider` value, validated later by the upstream table
    pub provider: Option<String>,
    /// Body to forward
    pub body: UpstreamBody,
}
