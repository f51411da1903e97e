//! Inbound body normalization
//!
//! Each supported encoding has its own parser; all of them yield a
//! [`NormalizedRequest`] carrying the raw provider key and the body to
//! forward. Provider validation happens afterwards so that parse failures
//! and unknown providers stay distinguishable.

mod form;
mod json;
mod multipart;

use axum::extract::{FromRequest, Multipart, Request};
use bytes::Bytes;
use chatbridge_config::Config;
use http::HeaderMap;
use http::header::CONTENT_TYPE;

use crate::error::ProxyError;
use crate::types::NormalizedRequest;

/// Limits and defaults applied while normalizing
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Model used when the request names none
    pub default_model: String,
    /// Largest accepted multipart image in bytes
    pub max_image_bytes: usize,
    /// Largest accepted request body in bytes
    pub body_limit: usize,
}

impl NormalizeOptions {
    /// Options taken from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_model: config.upstream.default_model.clone(),
            max_image_bytes: config.upstream.max_image_bytes,
            body_limit: config.server.body_limit,
        }
    }
}

/// Body encoding selected from the request's `Content-Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEncoding {
    /// `multipart/form-data` with optional `image` file
    Multipart,
    /// `application/x-www-form-urlencoded`
    UrlEncoded,
    /// Anything else is attempted as JSON
    Json,
}

impl RequestEncoding {
    /// Pick the encoding for a `Content-Type` value (case-insensitive)
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();

        if content_type.contains("multipart/form-data") {
            Self::Multipart
        } else if content_type.contains("application/x-www-form-urlencoded") {
            Self::UrlEncoded
        } else {
            Self::Json
        }
    }

    /// Pick the encoding from request headers, defaulting to JSON
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(Self::Json, Self::from_content_type)
    }
}

/// Normalize an inbound request into an upstream-ready body
///
/// Consumes the request body. Fails with [`ProxyError::InvalidBody`],
/// [`ProxyError::MissingContent`] or [`ProxyError::PayloadTooLarge`].
pub async fn normalize(request: Request, options: &NormalizeOptions) -> Result<NormalizedRequest, ProxyError> {
    match RequestEncoding::from_headers(request.headers()) {
        RequestEncoding::Multipart => {
            let form = Multipart::from_request(request, &())
                .await
                .map_err(|e| ProxyError::InvalidBody(e.body_text()))?;
            multipart::normalize(form, options).await
        }
        RequestEncoding::UrlEncoded => {
            let body = read_body(request, options.body_limit).await?;
            form::normalize(&body, options)
        }
        RequestEncoding::Json => {
            let body = read_body(request, options.body_limit).await?;
            json::normalize(&body, options)
        }
    }
}

async fn read_body(request: Request, limit: usize) -> Result<Bytes, ProxyError> {
    axum::body::to_bytes(request.into_body(), limit)
        .await
        .map_err(|e| ProxyError::InvalidBody(format!("failed to read request body: {e}")))
}

/// Model name from an optional field, falling back to the configured default
///
/// Only an absent field takes the default; an empty value is forwarded unchanged.
fn model_or_default(model: Option<&str>, options: &NormalizeOptions) -> String {
    model.map_or_else(|| options.default_model.clone(), str::to_owned)
}

#[cfg(test)]
pub(crate) fn test_options() -> NormalizeOptions {
    NormalizeOptions {
        default_model: "default-model".to_owned(),
        max_image_bytes: 64,
        body_limit: 1 << 20,
    }
}
