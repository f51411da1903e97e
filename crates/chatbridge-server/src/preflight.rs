use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::{Method, StatusCode};

/// Answer `OPTIONS` on any path with an empty 204 carrying the permissive CORS headers
///
/// Runs ahead of routing so that pre-flight never reaches the proxy fallback.
pub async fn preflight_middleware(req: Request, next: Next) -> Response {
    if req.method() != Method::OPTIONS {
        return next.run(req).await;
    }

    tracing::trace!(path = %req.uri().path(), "answering pre-flight");

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    chatbridge_core::apply_cors(response.headers_mut());
    response
}
