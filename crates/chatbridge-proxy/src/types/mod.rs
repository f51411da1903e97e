//! Request and response shapes exchanged with the upstream
//!
//! The request side is the single canonical form every inbound encoding
//! normalizes into; the response side is what an aggregated event stream
//! collapses into.

pub mod request;
pub mod response;

pub use request::{CanonicalRequest, Content, ContentPart, ImageUrl, Message, NormalizedRequest, Role, UpstreamBody};
pub use response::{ChatCompletionObject, Choice, ChoiceMessage, CompletionResponse};
