use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use crate::core::errors::{IgnitionError, Result};
use crate::core::models::http::{HttpMethod, HttpRequest, HttpResponse, TransportError};
use crate::core::traits::http_transport::HttpTransport;

/// Blocking `HttpTransport` over reqwest.
///
/// Owns a current-thread tokio runtime and drives each request to
/// completion with `block_on`, so callers stay synchronous.
pub struct ReqwestTransport {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| IgnitionError::InvalidConfig {
                detail: format!("Failed to create async runtime: {e}"),
            })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()
            .map_err(|e| IgnitionError::InvalidConfig {
                detail: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self { runtime, client })
    }
}

/// `ignition/<version>`, sent with every request.
pub fn user_agent() -> String {
    format!("ignition/{}", env!("CARGO_PKG_VERSION"))
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Post => reqwest::Method::POST,
        };
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder
                .header("Content-Type", "application/json")
                .body(body.clone());
        }

        self.runtime.block_on(async {
            let resp = builder.send().await.map_err(|e| TransportError {
                reason: describe(&e),
            })?;
            let status = resp.status().as_u16();
            let headers: BTreeMap<String, String> = resp
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
                })
                .collect();
            let body = resp.text().await.map_err(|e| TransportError {
                reason: describe(&e),
            })?;
            debug!(status, url = %request.url, "response received");
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_carries_crate_version() {
        assert_eq!(user_agent(), format!("ignition/{}", env!("CARGO_PKG_VERSION")));
        assert!(user_agent().starts_with("ignition/"));
    }

    #[test]
    fn builds_with_timeout() {
        assert!(ReqwestTransport::new(Duration::from_secs(5)).is_ok());
    }
}
