//! Axum route handlers for the proxy endpoints

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing};
use chatbridge_core::upstream_request_headers;

use crate::error::ProxyError;
use crate::normalize::normalize;
use crate::relay::relay;
use crate::state::ProxyState;

/// Build the proxy router
///
/// Every configured path accepts `POST`; any other method on those paths
/// and any other path fall through to a JSON 404.
pub fn proxy_router(state: ProxyState) -> Router {
    let mut router = Router::new();

    for path in state.paths() {
        router = router.route(path, routing::post(chat_completions).fallback(route_not_found));
    }

    router
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(state.options().body_limit))
        .with_state(state)
}

/// Handle `POST` on a proxy path
async fn chat_completions(State(state): State<ProxyState>, request: Request) -> Response {
    match forward(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            if e.is_bad_request() {
                tracing::debug!(error = %e, "rejected request body");
            } else {
                tracing::warn!(error = %e, "proxy request failed");
            }
            e.into_response()
        }
    }
}

/// Normalize, route and forward one request, then select how to answer
async fn forward(state: &ProxyState, request: Request) -> Result<Response, ProxyError> {
    let headers = upstream_request_headers(request.headers());

    let normalized = normalize(request, state.options()).await?;
    let (provider, url) = state.upstream().resolve(normalized.provider.as_deref())?;

    tracing::info!(
        provider,
        encoding = ?normalized.encoding,
        "forwarding request upstream"
    );

    let upstream = state.upstream().send(url, headers, &normalized.body).await?;

    Ok(relay(provider, upstream).await)
}

async fn route_not_found(State(state): State<ProxyState>) -> Response {
    ProxyError::RouteNotFound {
        paths: state.paths().to_vec(),
    }
    .into_response()
}
