//! Response selection: relay upstream bytes or aggregate an event stream

use axum::Json;
use axum::body::Body;
use axum::response::{IntoResponse, Response};
use chatbridge_core::apply_cors;
use http::header::{self, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde::Serialize;

use crate::aggregate::{Aggregated, StreamEnd, aggregate};

/// Content type prefix that marks an upstream answer for aggregation
const EVENT_STREAM: &str = "text/event-stream";

/// JSON response carrying the full CORS header set
pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let mut response = (status, Json(body)).into_response();
    apply_cors(response.headers_mut());
    response
}

/// Turn the upstream answer into the caller's response
pub(crate) async fn relay(provider: &str, upstream: reqwest::Response) -> Response {
    if is_event_stream(upstream.headers()) {
        aggregated(provider, upstream).await
    } else {
        passthrough(upstream)
    }
}

fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with(EVENT_STREAM))
}

/// Relay status, headers and body unchanged, adding only the CORS origin
fn passthrough(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();

    // Framing is re-negotiated on the inbound connection
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::CONNECTION);
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    tracing::debug!(status = %status, "relaying upstream response");

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

async fn aggregated(provider: &str, upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let Aggregated { response, end, frames } = aggregate(upstream.bytes_stream()).await;

    match &end {
        StreamEnd::Error(detail) => tracing::warn!(
            provider,
            status = %status,
            frames,
            error = %detail,
            "upstream stream failed, returning partial completion"
        ),
        StreamEnd::Terminator | StreamEnd::Eof => tracing::debug!(
            provider,
            status = %status,
            frames,
            end = ?end,
            "upstream stream aggregated"
        ),
    }

    json_response(StatusCode::OK, &response)
}
