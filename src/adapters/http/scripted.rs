//! Scripted `HttpTransport` for adapter tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use crate::core::models::http::{HttpRequest, HttpResponse, TransportError};
use crate::core::traits::http_transport::HttpTransport;

/// Replays canned responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.respond_with_headers(status, body, &[])
    }

    pub fn respond_with_headers(self, status: u16, body: &str, headers: &[(&str, &str)]) -> Self {
        let headers = headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect::<BTreeMap<_, _>>();
        self.push(Ok(HttpResponse {
            status,
            headers,
            body: body.to_string(),
        }))
    }

    pub fn fail(self, reason: &str) -> Self {
        self.push(Err(TransportError {
            reason: reason.to_string(),
        }))
    }

    fn push(self, item: Result<HttpResponse, TransportError>) -> Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(item);
        }
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| {
                Err(TransportError {
                    reason: format!("no scripted response for {}", request.url),
                })
            })
    }
}
