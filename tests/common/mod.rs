//! Shared test helpers: a scripted mock transport

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use webwalk::{EffectiveRequest, Transport, TransportError, TransportResponse};

/// Route engine tracing through the test writer; honors `RUST_LOG`.
/// Safe to call from every test, only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Transport that replays scripted responses in order and records every
/// request the engine sends.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    requests: Arc<Mutex<Vec<EffectiveRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(self, response: TransportResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Handle onto the recorded requests, usable after the walker consumes
    /// the transport.
    pub fn requests(&self) -> Arc<Mutex<Vec<EffectiveRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, request: &EffectiveRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Failed("no scripted response left".to_string()))
    }
}

/// A 200 response with the given body and no interesting headers.
pub fn ok_response(url: &str, body: &str) -> TransportResponse {
    TransportResponse {
        status: 200,
        headers: vec![("content-type".to_string(), "text/html".to_string())],
        final_url: url.to_string(),
        body: body.to_string(),
    }
}

/// A response carrying one Set-Cookie header per given line.
pub fn response_with_cookies(url: &str, body: &str, set_cookies: &[&str]) -> TransportResponse {
    let mut response = ok_response(url, body);
    for line in set_cookies {
        response
            .headers
            .push(("set-cookie".to_string(), line.to_string()));
    }
    response
}
