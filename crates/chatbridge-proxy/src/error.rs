use axum::response::{IntoResponse, Response};
use chatbridge_core::HttpError;
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::relay::json_response;

/// Errors that end a proxied request before an upstream answer is relayed
///
/// Frame-level problems inside an event stream never show up here: the
/// aggregator skips malformed frames and finalizes on read failures.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Body could not be parsed for its declared encoding
    #[error("{0}")]
    InvalidBody(String),

    /// Body parsed but carries no usable text, image or messages
    #[error("{0}")]
    MissingContent(&'static str),

    /// Attached image is larger than the configured cap
    #[error("file size exceeds {} limit", size_label(.limit))]
    PayloadTooLarge { limit: usize },

    /// Provider key is absent or not in the upstream table
    #[error("invalid provider: {provider:?}")]
    InvalidProvider {
        /// Key as supplied, empty when absent
        provider: String,
        /// Configured keys in declaration order
        valid: Vec<String>,
    },

    /// Outbound call failed before any response arrived
    #[error("upstream fetch failed: {0}")]
    UpstreamUnreachable(String),

    /// Method or path is not served by the proxy
    #[error("no route for request")]
    RouteNotFound {
        /// Paths that accept `POST`
        paths: Vec<String>,
    },
}

impl ProxyError {
    /// Whether the caller sent something the proxy could not use as a request body
    pub const fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::InvalidBody(_) | Self::MissingContent(_) | Self::PayloadTooLarge { .. }
        )
    }
}

impl HttpError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::MissingContent(_) | Self::PayloadTooLarge { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidProvider { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::MissingContent(_) => "MISSING_CONTENT",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::InvalidProvider { .. } => "INVALID_PROVIDER",
            Self::UpstreamUnreachable(_) => "UPSTREAM_UNREACHABLE",
            Self::RouteNotFound { .. } => "NOT_FOUND",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::InvalidBody(_) | Self::MissingContent(_) | Self::PayloadTooLarge { .. } => {
                format!("Invalid request body: {self}")
            }
            Self::InvalidProvider { provider, valid } => format!(
                "The provider \"{provider}\" is not supported. Use one of: {}.",
                valid.join(", ")
            ),
            Self::UpstreamUnreachable(_) => "Upstream fetch failed".to_owned(),
            Self::RouteNotFound { paths } => format!("Only POST {}", paths.join(" or ")),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::InvalidProvider { .. } => json!({
                "error": "Invalid provider",
                "error_code": self.error_type(),
                "message": self.client_message(),
            }),
            Self::UpstreamUnreachable(detail) => json!({
                "error": self.client_message(),
                "detail": detail,
            }),
            _ => json!({ "error": self.client_message() }),
        };

        json_response(self.status_code(), &body)
    }
}

/// Render a byte count as whole mebibytes when it divides evenly
#[allow(clippy::trivially_copy_pass_by_ref)]
fn size_label(bytes: &usize) -> String {
    const MIB: usize = 1024 * 1024;

    let bytes = *bytes;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} byte")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_errors_are_prefixed_for_the_caller() {
        let error = ProxyError::MissingContent("missing text input");

        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.client_message(), "Invalid request body: missing text input");
    }

    #[test]
    fn payload_limit_is_reported_in_megabytes() {
        let error = ProxyError::PayloadTooLarge { limit: 10 * 1024 * 1024 };

        assert!(error.is_bad_request());
        assert_eq!(error.to_string(), "file size exceeds 10MB limit");
    }

    #[test]
    fn odd_payload_limit_is_reported_in_bytes() {
        let error = ProxyError::PayloadTooLarge { limit: 1500 };
        assert_eq!(error.to_string(), "file size exceeds 1500 byte limit");
    }

    #[test]
    fn invalid_provider_lists_valid_keys() {
        let error = ProxyError::InvalidProvider {
            provider: "provider-z".to_owned(),
            valid: vec!["provider-a".to_owned(), "provider-b".to_owned()],
        };

        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error.error_type(), "INVALID_PROVIDER");
        assert_eq!(
            error.client_message(),
            "The provider \"provider-z\" is not supported. Use one of: provider-a, provider-b."
        );
    }

    #[test]
    fn unreachable_upstream_is_a_gateway_error() {
        let error = ProxyError::UpstreamUnreachable("connection refused".to_owned());
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn route_not_found_names_accepted_paths() {
        let error = ProxyError::RouteNotFound {
            paths: vec!["/v1/chat/completions".to_owned(), "/alt".to_owned()],
        };

        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.client_message(), "Only POST /v1/chat/completions or /alt");
    }
}
