use crate::error::{ApiErrorBody, FetchError};
use crate::retry::{RetryPolicy, with_retry};
use crate::state::{EmailPage, Stats};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use wreq::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, PRAGMA};
use wreq::{Client, ClientBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Whether replaying the request after an ambiguous failure is harmless
    pub fn is_idempotent(self) -> bool {
        matches!(self, Method::Get | Method::Delete)
    }
}

/// Per-call overrides layered on top of the JSON/no-cache defaults
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::Get,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self {
            method: Method::Delete,
            ..Self::default()
        }
    }

    pub fn post_json<B: Serialize>(body: &B) -> Result<Self, FetchError> {
        Self::with_json(Method::Post, body)
    }

    pub fn put_json<B: Serialize>(body: &B) -> Result<Self, FetchError> {
        Self::with_json(Method::Put, body)
    }

    fn with_json<B: Serialize>(method: Method, body: &B) -> Result<Self, FetchError> {
        let body = serde_json::to_string(body)
            .map_err(|e| FetchError::Parse(format!("Failed to encode request body: {}", e)))?;
        Ok(Self {
            method,
            body: Some(body),
            ..Self::default()
        })
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Defaults first, then every override replaces the default of the same name.
    pub fn merged_headers(&self) -> HeaderMap {
        let mut headers = default_headers();
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

/// HTTP client for the dashboard backend.
///
/// Every path is resolved against one base URL, so requests never leave the
/// dashboard's origin.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    stats: Stats,
}

#[derive(Debug, Deserialize)]
struct LatestCheckResponse {
    #[serde(default)]
    data: Option<Value>,
}

/// Upper bound for one attempt, connect to last body byte
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

impl DashboardClient {
    pub fn new(base_url: &str, retry: RetryPolicy) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, retry, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// One attempt: send, check the status, decode the body.
    async fn send_once<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<T, FetchError> {
        let url = self.url(path);
        let request = match options.method {
            Method::Get => self.client.get(url.as_str()),
            Method::Post => self.client.post(url.as_str()),
            Method::Put => self.client.put(url.as_str()),
            Method::Delete => self.client.delete(url.as_str()),
        };
        let mut request = request.headers(options.merged_headers());
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            serde_json::from_str::<T>(&response_text)
                .map_err(|e| FetchError::Parse(format!("Failed to parse response: {}", e)))
        } else {
            let message = serde_json::from_str::<ApiErrorBody>(&response_text)
                .ok()
                .and_then(|body| body.describe())
                .unwrap_or_else(|| format!("HTTP {}", status));
            Err(FetchError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Fetch and decode `path`, retrying transport, status and decode
    /// failures according to the client's [`RetryPolicy`].
    ///
    /// POST and PUT are sent exactly once: a failure after the backend has
    /// already stored the write must not store it again.
    pub async fn fetch_with_retry<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, FetchError> {
        let policy = if options.method.is_idempotent() {
            self.retry
        } else {
            RetryPolicy::new(1, self.retry.delay())
        };
        let options = &options;
        with_retry(policy, move |attempt| {
            debug!(path, attempt, "Dashboard request");
            self.send_once(path, options)
        })
        .await
    }

    /// [`Self::fetch_with_retry`] followed by the `success` envelope check.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, FetchError> {
        let body: Value = self.fetch_with_retry(path, options).await?;
        into_payload(body)
    }

    /// Load one page of the email list. A timestamp query parameter keeps
    /// intermediaries from serving a cached page.
    pub async fn list_emails(&self, page: u32) -> Result<EmailPage, FetchError> {
        let path = format!("/api/emails?page={}&t={}", page, cache_buster());
        self.request(&path, RequestOptions::get()).await
    }

    pub async fn delete_email(&self, id: i64) -> Result<(), FetchError> {
        let path = format!("/api/emails/{}", id);
        let _: IgnoredAny = self.request(&path, RequestOptions::delete()).await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<Stats, FetchError> {
        let response: StatsResponse = self.request("/api/stats", RequestOptions::get()).await?;
        Ok(response.stats)
    }

    /// Ask the backend to check the mailbox. Returns whether a new email was stored.
    pub async fn check_latest(&self) -> Result<bool, FetchError> {
        let response: LatestCheckResponse =
            self.request("/check-latest", RequestOptions::get()).await?;
        Ok(response.data.is_some())
    }
}

fn cache_buster() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Turn a decoded `{ success, ... }` body into its payload, or an
/// application error carrying the backend's message.
pub(crate) fn into_payload<T: DeserializeOwned>(body: Value) -> Result<T, FetchError> {
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !success {
        let error = serde_json::from_value::<ApiErrorBody>(body).unwrap_or_default();
        return Err(FetchError::Application(error.describe().unwrap_or_default()));
    }
    Ok(serde_json::from_value(body)?)
}
