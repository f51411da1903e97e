//! Shared HTTP building blocks for chatbridge crates

#![allow(clippy::must_use_candidate)]

mod error;
mod headers;

pub use error::HttpError;
pub use headers::{apply_cors, upstream_request_headers};
