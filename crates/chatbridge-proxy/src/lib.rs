//! Chat-completion edge proxy
//!
//! Accepts multipart, URL-encoded and JSON request bodies, normalizes them
//! into one upstream chat-completion request, forwards it to the provider
//! named in the request and folds event-stream responses back into a
//! single JSON completion.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod aggregate;
pub mod error;
pub mod handler;
pub mod normalize;
mod relay;
pub mod state;
pub mod types;
pub mod upstream;

pub use aggregate::{Aggregated, StreamAccumulator, StreamEnd, aggregate};
pub use error::ProxyError;
pub use handler::proxy_router;
pub use normalize::{NormalizeOptions, RequestEncoding, normalize};
pub use state::ProxyState;
pub use types::{CanonicalRequest, CompletionResponse, Content, ContentPart, Message, NormalizedRequest, UpstreamBody};
