use media_sync_models::{Result, SyncError};
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
/// Longest body excerpt carried in an error message
const ERROR_BODY_LIMIT: usize = 300;

/// Whether a call reads remote state or mutates it; decides the error variant on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Read,
    Write,
}

impl CallKind {
    fn error(self, context: &str, message: String) -> SyncError {
        match self {
            CallKind::Read => SyncError::fetch(context, message),
            CallKind::Write => SyncError::write(context, message),
        }
    }
}

/// Fully buffered response of a successful call
#[derive(Debug)]
pub struct HttpResponse {
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|h| h.to_str().ok())
    }

    pub fn header_u32(&self, name: &str) -> Option<u32> {
        self.header_str(name).and_then(|s| s.trim().parse().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|h| h.to_str().ok())
    }

    pub fn json<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Shared wrapper every catalog client sends its requests through.
///
/// Applies the bounded timeout, turns non-success statuses and transport
/// errors into the caller's failure variant, and, when `trace` is on, logs
/// each request and response body. Nothing is retried here.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    trace: bool,
}

impl HttpClient {
    pub fn new(timeout: Duration, trace: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, trace })
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    pub async fn send(&self, kind: CallKind, context: &str, request: RequestBuilder) -> Result<HttpResponse> {
        let request = request
            .build()
            .map_err(|e| kind.error(context, format!("invalid request: {}", e)))?;
        let method = request.method().clone();
        let url = request.url().clone();

        debug!(context, %method, url = %url, "HTTP request");
        if self.trace {
            let body = request
                .body()
                .and_then(|b| b.as_bytes())
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default();
            debug!(context, %method, url = %url, body = %body, "HTTP request body");
        }

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| kind.error(context, describe_transport_error(&e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| kind.error(context, format!("failed to read response body: {}", e)))?;

        debug!(context, status = status.as_u16(), bytes = body.len(), "HTTP response");
        if self.trace {
            debug!(context, status = status.as_u16(), body = %body, "HTTP response body");
        }

        if !status.is_success() {
            return Err(kind.error(context, describe_status(status, &headers, &body)));
        }

        Ok(HttpResponse { headers, body })
    }
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        format!("request failed: {}", error)
    }
}

fn describe_status(status: StatusCode, headers: &HeaderMap, body: &str) -> String {
    let excerpt: String = body.trim().chars().take(ERROR_BODY_LIMIT).collect();
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = headers
                .get(RETRY_AFTER)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("unknown");
            format!("{} - rate limited, retry after {}s - {}", status, retry_after, excerpt)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            format!("{} - credentials rejected - {}", status, excerpt)
        }
        _ => format!("{} - {}", status, excerpt),
    }
}
