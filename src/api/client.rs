//! HTTP client for the portal REST backend
//!
//! Endpoints follow the portal layout (`/academics/timetable/`,
//! `/classes/`, ...). List endpoints may answer with a bare JSON array or a
//! paginated `{count, next, previous, results}` envelope; both are accepted.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{ApiError, ApiResult, ResourceApi};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::models::{
    AssignmentId, AssignmentPair, BulkAssignOutcome, BulkAssignRequest, ClassSection,
    NewSlotInput, SlotId, SlotPatch, Subject, Teacher, TeacherAssignment, TeacherId,
    TimetableSlot,
};

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for the HTTP resource client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8000/api`
    pub base_url: String,

    /// Bearer token sent with every request (optional)
    pub auth_token: Option<String>,

    /// Request timeout
    pub timeout: Duration,

    /// Retry count for transient failures of idempotent requests
    pub retry_count: u32,

    /// Delay between retries
    pub retry_delay: Duration,
}

impl ClientConfig {
    /// Create a new client config
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
            timeout: Duration::from_secs(10),
            retry_count: 2,
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Set bearer token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry count
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set retry delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

impl From<&ApiConfig> for ClientConfig {
    fn from(config: &ApiConfig) -> Self {
        let mut client = Self::new(config.base_url.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_retry_count(config.retry_count)
            .with_retry_delay(Duration::from_millis(config.retry_delay_ms));
        client.auth_token = config.auth_token.clone();
        client
    }
}

// ============================================================================
// Wire Helpers
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Page { results: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListPayload<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Page { results } => results,
            Self::Bare(items) => items,
        }
    }
}

fn status_error(status: StatusCode, body: String) -> ApiError {
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(body),
        StatusCode::CONFLICT => ApiError::Conflict(body),
        StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
            ApiError::Rejected(body)
        }
        _ => ApiError::Http {
            status: status.as_u16(),
            body,
        },
    }
}

// ============================================================================
// HTTP Resource API
// ============================================================================

/// [`ResourceApi`] over the portal's REST endpoints
#[derive(Debug)]
pub struct HttpResourceApi {
    config: ClientConfig,
    http_client: Client,
}

impl HttpResourceApi {
    /// Create a new client
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("classgrid/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(format!("client init failed: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Build a client from the `[api]` config section
    pub fn from_api_config(config: &ApiConfig) -> Result<Self> {
        let url = Url::parse(&config.base_url)
            .map_err(|e| Error::config(format!("invalid base_url '{}': {e}", config.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "unsupported base_url scheme '{}'",
                url.scheme()
            )));
        }
        Self::new(ClientConfig::from(config))
            .map_err(|e| Error::with_source("Failed to create HTTP client", e))
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    // Internal: send one request, retrying transient failures when the
    // method is idempotent. Returns the raw response body on success.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<String> {
        let url = self.url(path);
        let retries = if method == Method::POST {
            0
        } else {
            self.config.retry_count
        };
        let mut last_error = None;

        for attempt in 0..=retries {
            if attempt > 0 {
                tracing::debug!(attempt, %url, "Retrying request");
                tokio::time::sleep(self.config.retry_delay).await;
            }

            let mut request = self.http_client.request(method.clone(), &url);
            if let Some(token) = &self.config.auth_token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }

            let error = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.text().await {
                            Ok(text) => return Ok(text),
                            Err(e) => {
                                ApiError::Network(format!("failed to read response body: {e}"))
                            }
                        }
                    } else {
                        // Error bodies only feed the message
                        status_error(status, response.text().await.unwrap_or_default())
                    }
                }
                Err(e) => ApiError::Network(e.to_string()),
            };

            if !error.is_transient() {
                return Err(error);
            }
            tracing::warn!(attempt, %url, error = %error, "Request failed");
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| ApiError::Network("Unknown error".to_string())))
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        let text = self.execute(Method::GET, path, None).await?;
        let payload: ListPayload<T> =
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(payload.into_vec())
    }

    async fn send_json<B: serde::Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<R> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let text = self.execute(method, path, Some(value)).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ResourceApi for HttpResourceApi {
    async fn list_slots(&self) -> ApiResult<Vec<TimetableSlot>> {
        self.get_list("/academics/timetable/").await
    }

    async fn create_slot(&self, input: &NewSlotInput) -> ApiResult<TimetableSlot> {
        self.send_json(Method::POST, "/academics/timetable/", input)
            .await
    }

    async fn patch_slot(&self, id: SlotId, patch: &SlotPatch) -> ApiResult<Option<TimetableSlot>> {
        let value = serde_json::to_value(patch).map_err(|e| ApiError::Decode(e.to_string()))?;
        let text = self
            .execute(Method::PATCH, &format!("/academics/timetable/{id}/"), Some(value))
            .await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn delete_slot(&self, id: SlotId) -> ApiResult<()> {
        self.execute(Method::DELETE, &format!("/academics/timetable/{id}/"), None)
            .await
            .map(|_| ())
    }

    async fn list_class_sections(&self) -> ApiResult<Vec<ClassSection>> {
        self.get_list("/classes/").await
    }

    async fn list_subjects(&self) -> ApiResult<Vec<Subject>> {
        self.get_list("/academics/subjects/").await
    }

    async fn list_teachers(&self) -> ApiResult<Vec<Teacher>> {
        self.get_list("/users/teachers/").await
    }

    async fn list_assignments(&self) -> ApiResult<Vec<TeacherAssignment>> {
        self.get_list("/academics/teacher-assignments/").await
    }

    async fn bulk_assign(
        &self,
        teacher_id: TeacherId,
        pairs: &[AssignmentPair],
    ) -> ApiResult<BulkAssignOutcome> {
        let body = BulkAssignRequest {
            teacher_id,
            assignments: pairs.to_vec(),
        };
        self.send_json(
            Method::POST,
            "/academics/teacher-assignments/bulk-assign/",
            &body,
        )
        .await
    }

    async fn delete_assignment(&self, id: AssignmentId) -> ApiResult<()> {
        self.execute(
            Method::DELETE,
            &format!("/academics/teacher-assignments/{id}/"),
            None,
        )
        .await
        .map(|_| ())
    }
}
