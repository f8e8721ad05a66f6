//! HTTP client for the invoicing API.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::pagination::Page;
use crate::resource::ResourceKind;
use crate::retry::{RetryDecision, RetryPolicy};
use crate::wire::{CreatedData, Envelope, LoginData, LoginRequest, Record};

/// Tenant-scope header sent on every authenticated call.
pub const MERCHANT_HEADER: &str = "x-merchant-id";

/// Credential pair plus tenant scope, injected by the caller. Never
/// hard-code these in test code.
#[derive(Clone)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Login password.
    pub password: String,
    /// Merchant/tenant identifier.
    pub merchant_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("merchant_id", &self.merchant_id)
            .finish()
    }
}

/// Authenticated session for one run. Created by login, held for the
/// duration of the run, never persisted.
#[derive(Clone)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Merchant/tenant identifier scoping all calls.
    pub merchant_id: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("merchant_id", &self.merchant_id)
            .finish()
    }
}

/// Outcome of a delete call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The server confirmed the deletion (200/204).
    Deleted,
    /// The record was already gone (404). Treated as success.
    AlreadyGone,
}

#[derive(Debug, Default)]
struct ApiClientMetrics {
    requests_total: AtomicU64,
    requests_failed: AtomicU64,
    requests_retried: AtomicU64,
}

/// Snapshot of client request counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiClientMetricsSnapshot {
    /// Total requests issued.
    pub requests_total: u64,
    /// Requests that ended in an error.
    pub requests_failed: u64,
    /// Retries performed.
    pub requests_retried: u64,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Default headers applied to every request.
    pub headers: HeaderMap,
    /// Per-call timeout for create/fetch/delete.
    pub timeout: Duration,
    /// Per-call timeout for bulk list operations.
    pub list_timeout: Duration,
    /// Retry policy for transient failures on idempotent calls.
    pub retry: RetryPolicy,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            headers,
            timeout: Duration::from_secs(15),
            list_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// API client builder.
#[derive(Debug, Clone)]
pub struct ApiClientBuilder {
    base_url: String,
    config: ApiClientConfig,
}

impl ApiClientBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            config: ApiClientConfig::default(),
        }
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the list-call timeout.
    #[must_use]
    pub const fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.config.list_timeout = timeout;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Add a default header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.config.headers.insert(name, value);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        ApiClient::with_config(self.base_url, self.config)
    }
}

/// HTTP client for the login/CRUD/list endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    config: ApiClientConfig,
    metrics: Arc<ApiClientMetrics>,
}

impl ApiClient {
    /// Start building a client.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url)
    }

    /// Create a client with custom configuration.
    pub fn with_config(
        base_url: impl Into<String>,
        config: ApiClientConfig,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .default_headers(config.headers.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
            config,
            metrics: Arc::new(ApiClientMetrics::default()),
        })
    }

    /// Snapshot of request counters.
    #[must_use]
    pub fn metrics(&self) -> ApiClientMetricsSnapshot {
        ApiClientMetricsSnapshot {
            requests_total: self.metrics.requests_total.load(Ordering::Relaxed),
            requests_failed: self.metrics.requests_failed.load(Ordering::Relaxed),
            requests_retried: self.metrics.requests_retried.load(Ordering::Relaxed),
        }
    }

    /// Log in with a credential pair and return the bearer token.
    ///
    /// Any non-2xx status or a 2xx body without `data.token` is an
    /// error; callers treat either as fatal for the whole run.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let body = LoginRequest { email, password };
        let bytes = self
            .send_once(self.http.post(self.url("auth/login")).json(&body))
            .await?;
        let envelope: Envelope<LoginData> = serde_json::from_slice(&bytes)?;
        envelope
            .data
            .token
            .ok_or(ApiError::MissingField { field: "data.token" })
    }

    /// Derive a client that sends the session's bearer token and
    /// merchant header on every call.
    pub fn authorized(&self, session: &Session) -> Result<Self, ApiError> {
        let mut config = self.config.clone();
        let bearer = format!("Bearer {}", session.token);
        let bearer = HeaderValue::from_str(&bearer).map_err(|_| ApiError::InvalidHeader {
            name: "authorization",
        })?;
        let merchant =
            HeaderValue::from_str(&session.merchant_id).map_err(|_| ApiError::InvalidHeader {
                name: MERCHANT_HEADER,
            })?;
        config.headers.insert(AUTHORIZATION, bearer);
        config
            .headers
            .insert(HeaderName::from_static(MERCHANT_HEADER), merchant);
        Self::with_config(self.base_url.clone(), config)
    }

    /// Create a record. Expects 201 with `data.id`.
    ///
    /// Creation is not idempotent and is never retried here; the caller
    /// records the failure for the item and moves on.
    pub async fn create<P: Serialize + ?Sized>(
        &self,
        kind: ResourceKind,
        payload: &P,
    ) -> Result<String, ApiError> {
        let bytes = self
            .send_once(self.http.post(self.collection_url(kind)).json(payload))
            .await?;
        let envelope: Envelope<CreatedData> = serde_json::from_slice(&bytes)?;
        envelope
            .data
            .id
            .ok_or(ApiError::MissingField { field: "data.id" })
    }

    /// Fetch a record by id. 200 maps to `Some`, 404 to `None`, any
    /// other status is an error. Retried per policy (idempotent).
    pub async fn get(&self, kind: ResourceKind, id: &str) -> Result<Option<Record>, ApiError> {
        self.retrying(true, || self.get_once(kind, id)).await
    }

    async fn get_once(&self, kind: ResourceKind, id: &str) -> Result<Option<Record>, ApiError> {
        let response = self.track(self.http.get(self.item_url(kind, id)).send().await)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        if !status.is_success() {
            self.metrics.requests_failed.fetch_add(1, Ordering::Relaxed);
            return Err(ApiError::Status {
                status,
                body: truncate_body(&bytes),
            });
        }
        let envelope: Envelope<Record> = serde_json::from_slice(&bytes)?;
        Ok(Some(envelope.data))
    }

    /// Delete a record by id. 200/204 is a confirmed deletion; 404 is
    /// "already gone", which the lifecycle treats as success.
    ///
    /// A single attempt only: the lifecycle layer owns the bounded
    /// per-item retry and its accounting.
    pub async fn delete(&self, kind: ResourceKind, id: &str) -> Result<DeleteOutcome, ApiError> {
        let response = self.track(self.http.delete(self.item_url(kind, id)).send().await)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome::AlreadyGone);
        }
        if status.is_success() {
            return Ok(DeleteOutcome::Deleted);
        }
        let bytes = response.bytes().await?;
        self.metrics.requests_failed.fetch_add(1, Ordering::Relaxed);
        Err(ApiError::Status {
            status,
            body: truncate_body(&bytes),
        })
    }

    /// List one page of a collection. Retried per policy (idempotent).
    pub async fn list(
        &self,
        kind: ResourceKind,
        offset: u64,
        limit: u64,
    ) -> Result<Page<Record>, ApiError> {
        self.retrying(true, || self.list_once(kind, offset, limit))
            .await
    }

    async fn list_once(
        &self,
        kind: ResourceKind,
        offset: u64,
        limit: u64,
    ) -> Result<Page<Record>, ApiError> {
        let request = self
            .http
            .get(self.collection_url(kind))
            .query(&[("offset", offset), ("limit", limit)])
            .timeout(self.config.list_timeout);
        let bytes = self.send_once(request).await?;
        let envelope: Envelope<Vec<Record>> = serde_json::from_slice(&bytes)?;
        let page_meta = envelope.meta.and_then(|meta| meta.pagination);
        Ok(Page {
            items: envelope.data,
            has_next_page: page_meta.as_ref().is_some_and(|meta| meta.has_next_page),
            total: page_meta.and_then(|meta| meta.total),
        })
    }

    async fn send_once(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = self.track(request.send().await)?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            self.metrics.requests_failed.fetch_add(1, Ordering::Relaxed);
            return Err(ApiError::Status {
                status,
                body: truncate_body(&bytes),
            });
        }
        Ok(bytes.to_vec())
    }

    async fn retrying<T, F, Fut>(&self, idempotent: bool, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => match self.config.retry.decide(&err, attempt, idempotent) {
                    RetryDecision::RetryAfter(delay) => {
                        self.metrics.requests_retried.fetch_add(1, Ordering::Relaxed);
                        debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying call");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    RetryDecision::DoNotRetry => return Err(err),
                },
            }
        }
    }

    fn track(
        &self,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<reqwest::Response, ApiError> {
        self.metrics.requests_total.fetch_add(1, Ordering::Relaxed);
        result.map_err(|err| {
            self.metrics.requests_failed.fetch_add(1, Ordering::Relaxed);
            ApiError::from(err)
        })
    }

    fn collection_url(&self, kind: ResourceKind) -> String {
        self.url(kind.path())
    }

    fn item_url(&self, kind: ResourceKind, id: &str) -> String {
        format!("{}/{}/{id}", self.base_url.trim_end_matches('/'), kind.path())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

fn truncate_body(bytes: &[u8]) -> String {
    const MAX_LEN: usize = 2048;
    let mut body = String::from_utf8_lossy(bytes).to_string();
    if body.len() > MAX_LEN {
        body.truncate(MAX_LEN);
        body.push('…');
    }
    body
}
