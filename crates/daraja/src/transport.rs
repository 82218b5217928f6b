//! HTTP transport.
//!
//! [`Transport`] is the seam between request construction and the network.
//! [`HttpTransport`] is the `reqwest` implementation; tests substitute a
//! recording mock.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::environment::{Environment, ErrorReporting};
use crate::error::{DarajaError, DarajaResult};

/// `Content-Type` of every POST.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// `Content-Type` of the token GET.
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
}

impl HttpMethod {
    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A fully addressed outbound request.
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    /// Method
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// JSON body, POST only
    pub body: Option<Value>,
}

impl HttpRequest {
    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case("authorization") {
                    (k.as_str(), "[REDACTED]")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl HttpResponse {
    /// Build a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the gateway.
///
/// Implementations own timeouts and TLS; they report network failures as
/// [`DarajaError::RemoteTransport`] and return every received response,
/// whatever its status.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request.
    async fn send(&self, request: HttpRequest) -> DarajaResult<HttpResponse>;
}

/// `reqwest`-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport for `environment`.
    ///
    /// TLS verification stays on unless `http.accept_invalid_certs` is set
    /// and the environment is sandbox.
    pub fn new(config: &HttpConfig, environment: Environment) -> DarajaResult<Self> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if config.accept_invalid_certs {
            if environment.is_sandbox() {
                warn!("TLS certificate verification is disabled for the sandbox gateway");
                builder = builder.danger_accept_invalid_certs(true);
            } else {
                warn!(
                    environment = %environment,
                    "http.accept_invalid_certs is ignored outside the sandbox"
                );
            }
        }

        let client = builder
            .build()
            .map_err(|e| DarajaError::transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Build the reqwest request for `request` without sending it.
    fn prepare(&self, request: &HttpRequest) -> DarajaResult<reqwest::Request> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> DarajaResult<HttpResponse> {
        debug!(method = request.method.as_str(), url = %request.url, "sending gateway request");

        let prepared = self.prepare(&request)?;
        let response = self.client.execute(prepared).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, "gateway responded");
        Ok(HttpResponse { status, body })
    }
}

/// Turn a raw response into JSON.
///
/// Non-2xx statuses and empty bodies are [`DarajaError::RemoteTransport`];
/// bodies that are not JSON are [`DarajaError::MalformedResponse`]. With
/// [`ErrorReporting::Relaxed`] the gateway's raw error body is included in
/// the message; with [`ErrorReporting::Strict`] only its error code and
/// message are.
pub fn decode_response(response: HttpResponse, reporting: ErrorReporting) -> DarajaResult<Value> {
    if !response.is_success() {
        let detail = match reporting {
            ErrorReporting::Relaxed => response.body.trim().to_string(),
            ErrorReporting::Strict => gateway_error_summary(&response.body),
        };
        let message = if detail.is_empty() {
            "gateway rejected the request".to_string()
        } else {
            format!("gateway rejected the request: {}", detail)
        };
        return Err(DarajaError::http_status(response.status, message));
    }

    if response.body.trim().is_empty() {
        return Err(DarajaError::http_status(
            response.status,
            "gateway returned an empty body",
        ));
    }

    serde_json::from_str(&response.body)
        .map_err(|e| DarajaError::malformed(format!("response is not JSON: {}", e)))
}

/// `errorCode: errorMessage` from a gateway error body, if present.
fn gateway_error_summary(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return String::new();
    };
    let code = value.get("errorCode").and_then(Value::as_str).unwrap_or_default();
    let message = value
        .get("errorMessage")
        .and_then(Value::as_str)
        .unwrap_or_default();
    match (code, message) {
        ("", "") => String::new(),
        (code, "") => code.to_string(),
        ("", message) => message.to_string(),
        (code, message) => format!("{}: {}", code, message),
    }
}
