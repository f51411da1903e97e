//! Mock chat-completion provider for integration tests
//!
//! Replies with a scripted event stream or a canned JSON body and records
//! every request it receives.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

/// Delay between scripted chunks so each one leaves the socket on its own
const CHUNK_DELAY: Duration = Duration::from_millis(10);

/// Scripted reply of the mock provider
#[derive(Debug, Clone)]
pub enum Reply {
    /// `text/event-stream` body written chunk by chunk
    EventStream(Vec<Bytes>),
    /// Event stream that aborts the connection after the listed chunks
    BrokenEventStream(Vec<Bytes>),
    /// Non-streamed body with the given status and content type
    Body {
        status: StatusCode,
        content_type: &'static str,
        body: Bytes,
    },
}

impl Reply {
    /// Event stream whose chunks are the given strings
    pub fn sse<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::EventStream(chunks.into_iter().map(|c| Bytes::from(c.into())).collect())
    }

    /// JSON body with a status
    pub fn json(status: StatusCode, body: &str) -> Self {
        Self::Body {
            status,
            content_type: "application/json",
            body: Bytes::copy_from_slice(body.as_bytes()),
        }
    }
}

/// Request as seen by the mock provider
#[derive(Debug, Clone)]
pub struct Captured {
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Mock provider listening on a random local port
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    reply: Reply,
    captured: Mutex<Vec<Captured>>,
}

impl MockUpstream {
    /// Start the mock server, returning immediately
    pub async fn start(reply: Reply) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            reply,
            captured: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Endpoint URL for configuring the mock as a provider
    pub fn url(&self) -> String {
        format!("http://{}/v1/chat/completions", self.addr)
    }

    /// Requests received so far
    pub fn captured(&self) -> Vec<Captured> {
        self.state.captured.lock().expect("capture lock").clone()
    }

    /// The only request received, panicking unless exactly one arrived
    pub fn single_request(&self) -> Captured {
        let captured = self.captured();
        assert_eq!(captured.len(), 1, "expected exactly one upstream request");
        captured.into_iter().next().expect("one request")
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_chat_completions(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    state
        .captured
        .lock()
        .expect("capture lock")
        .push(Captured { headers, body });

    match state.reply.clone() {
        Reply::EventStream(chunks) => event_stream(chunks, false),
        Reply::BrokenEventStream(chunks) => event_stream(chunks, true),
        Reply::Body {
            status,
            content_type,
            body,
        } => (status, [(header::CONTENT_TYPE, content_type)], body).into_response(),
    }
}

fn event_stream(chunks: Vec<Bytes>, broken: bool) -> Response {
    let mut items: Vec<Result<Bytes, std::io::Error>> = chunks.into_iter().map(Ok).collect();
    if broken {
        items.push(Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "mock abort")));
    }

    let stream = futures_util::stream::iter(items).then(|item| async move {
        tokio::time::sleep(CHUNK_DELAY).await;
        item
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(stream),
    )
        .into_response()
}
