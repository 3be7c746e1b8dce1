//! Self-check of the HTTP endpoints.
//!
//! The evaluation calls each endpoint of the service through an [EndpointProbe] and reports the
//! status, latency and success of every call. A failing call is recorded and does not stop the
//! remaining checks.

use crate::error::causes;
use crate::models::{EndpointResult, EvaluationReport};

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{Method, Request},
    Router,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower::ServiceExt;

/// Endpoints checked by [evaluate], in the order they are called.
pub const CHECKS: [(Method, &str); 5] = [
    (Method::POST, "/users"),
    (Method::GET, "/superusers"),
    (Method::GET, "/top-countries"),
    (Method::GET, "/team-insights"),
    (Method::GET, "/active-users-per-day"),
];

/// Error making a probe request
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Error building the request
    #[error("failed to build request")]
    Build(#[from] axum::http::Error),

    /// Error sending the request or receiving the response over HTTP
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Error reading an in-process response body
    #[error("failed to read response body")]
    Body(#[from] axum::Error),
}

/// Status and body of a probe response.
#[derive(Clone, Debug)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Makes requests against the endpoints of the service.
#[async_trait]
pub trait EndpointProbe: Send + Sync {
    /// Call an endpoint.
    ///
    /// # Arguments
    ///
    /// * `method`: HTTP method
    /// * `path`: Path of the endpoint, starting with `/`
    async fn call(&self, method: Method, path: &str) -> Result<ProbeResponse, ProbeError>;
}

/// Probe that calls the service over HTTP.
#[derive(Debug)]
pub struct HttpProbe {
    reqwest_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpProbe {
    /// Create a new HTTP probe.
    ///
    /// # Arguments
    ///
    /// * `base_url`: URL of the service, e.g. `http://127.0.0.1:3000`
    /// * `timeout`: Timeout applied to each request
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            reqwest_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl EndpointProbe for HttpProbe {
    #[tracing::instrument(level = "DEBUG", skip(self))]
    async fn call(&self, method: Method, path: &str) -> Result<ProbeResponse, ProbeError> {
        let response = self
            .reqwest_client
            .request(method, format!("{}{}", self.base_url, path))
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(ProbeResponse { status, body })
    }
}

/// Probe that drives a [Router] directly, without going through the network.
#[derive(Clone)]
pub struct InProcessProbe {
    // Router is not Sync.
    router: Arc<Mutex<Router>>,
}

impl InProcessProbe {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(Mutex::new(router)),
        }
    }

    fn router(&self) -> Router {
        self.router
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl EndpointProbe for InProcessProbe {
    async fn call(&self, method: Method, path: &str) -> Result<ProbeResponse, ProbeError> {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())?;
        let response = match self.router().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        let status = response.status().as_u16();
        let body = hyper::body::to_bytes(response.into_body()).await?;
        Ok(ProbeResponse { status, body })
    }
}

/// Call every endpoint in [CHECKS] and summarise the results.
pub async fn evaluate(probe: &dyn EndpointProbe) -> EvaluationReport {
    let mut results = Vec::with_capacity(CHECKS.len());
    for (method, path) in CHECKS {
        results.push(check(probe, method, path).await);
    }
    let passed = results.iter().filter(|result| result.success).count();
    let score = format!("{} / {}", passed, results.len());
    tracing::info!(%score, "evaluation complete");
    EvaluationReport {
        evaluated_at: timestamp(),
        results,
        score,
    }
}

async fn check(probe: &dyn EndpointProbe, method: Method, path: &str) -> EndpointResult {
    let endpoint = format!("{} {}", method, path);
    let start = Instant::now();
    let outcome = probe.call(method, path).await;
    let time_ms = format!("{:.2}", start.elapsed().as_secs_f64() * 1000.0);
    let result = match outcome {
        Ok(response) => {
            let is_json = is_structured(&response.body);
            let error = if response.status != 200 {
                Some(format!("unexpected status {}", response.status))
            } else if !is_json {
                Some("response body is not a JSON object or array".to_string())
            } else {
                None
            };
            EndpointResult {
                endpoint,
                status: Some(response.status),
                is_json,
                time_ms,
                success: error.is_none(),
                error,
            }
        }
        Err(error) => EndpointResult {
            endpoint,
            status: None,
            is_json: false,
            time_ms,
            success: false,
            error: Some(describe(&error)),
        },
    };
    if let Some(error) = &result.error {
        tracing::warn!(endpoint = %result.endpoint, %error, "endpoint check failed");
    }
    result
}

/// Returns true if `body` is a JSON object or array.
fn is_structured(body: &[u8]) -> bool {
    matches!(
        serde_json::from_slice::<Value>(body),
        Ok(Value::Object(_) | Value::Array(_))
    )
}

/// Error message followed by its causes.
fn describe(error: &ProbeError) -> String {
    std::iter::once(error.to_string())
        .chain(causes(error))
        .collect::<Vec<_>>()
        .join(": ")
}

fn timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
