use http::HeaderMap;
use http::header::{self, HeaderValue};

/// Insert the permissive CORS header set attached to every JSON response, replacing any previous values
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST,OPTIONS"),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
}

/// Build the header map for an outbound upstream call from the inbound headers
///
/// Every inbound header is forwarded except the hop-specific ones, and the
/// content type is forced to JSON since the body is always re-serialized.
pub fn upstream_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();

    // Framing headers would conflict with the re-serialized body, and an
    // uncompressed upstream body is required to read event streams as text
    for name in [
        header::HOST,
        header::CONTENT_LENGTH,
        header::TRANSFER_ENCODING,
        header::CONNECTION,
        header::ACCEPT_ENCODING,
    ] {
        headers.remove(name);
    }

    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}
