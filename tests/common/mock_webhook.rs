//! Webhook receiver that records every delivery and answers from a script.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex, Notify};

/// One delivery as seen by the receiver.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("webhook body is not JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Scripted answer for the next delivery. Unscripted deliveries get 200.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub delay_ms: u64,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::status(200)
    }
}

impl MockResponse {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            delay_ms: 0,
        }
    }

    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }
}

#[derive(Default)]
struct Recorder {
    deliveries: Mutex<Vec<CapturedRequest>>,
    script: Mutex<VecDeque<MockResponse>>,
    arrived: Notify,
}

pub struct MockWebhook {
    pub addr: SocketAddr,
    recorder: Arc<Recorder>,
    stop: Option<oneshot::Sender<()>>,
}

impl MockWebhook {
    pub async fn start() -> Self {
        let recorder = Arc::new(Recorder::default());
        let app = Router::new()
            .route("/{*path}", any(receive))
            .with_state(recorder.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock webhook");
        let addr = listener.local_addr().expect("mock webhook has no address");

        let (stop, stopped) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = stopped.await;
                })
                .await;
        });

        Self {
            addr,
            recorder,
            stop: Some(stop),
        }
    }

    /// URL of the hook endpoint on this receiver.
    pub fn url(&self) -> String {
        format!("http://{}/hook", self.addr)
    }

    pub async fn enqueue_response(&self, response: MockResponse) {
        self.recorder.script.lock().await.push_back(response);
    }

    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.recorder.deliveries.lock().await.clone()
    }

    /// Wait until `count` deliveries arrived, or `timeout` passed.
    pub async fn wait_for_requests(&self, count: usize, timeout: Duration) -> Vec<CapturedRequest> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let arrived = self.recorder.arrived.notified();
            tokio::pin!(arrived);
            arrived.as_mut().enable();

            let deliveries = self.captured_requests().await;
            if deliveries.len() >= count {
                return deliveries;
            }
            if tokio::time::timeout_at(deadline, arrived).await.is_err() {
                return self.captured_requests().await;
            }
        }
    }
}

impl Drop for MockWebhook {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

async fn receive(
    State(recorder): State<Arc<Recorder>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    // Recorded before the scripted delay: a client timeout drops this future.
    recorder.deliveries.lock().await.push(CapturedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .map(|(key, value)| {
                (
                    key.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: body.to_vec(),
    });
    recorder.arrived.notify_waiters();

    let scripted = recorder.script.lock().await.pop_front().unwrap_or_default();
    if scripted.delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(scripted.delay_ms)).await;
    }

    let status = StatusCode::from_u16(scripted.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "received": true })))
}
