//! GitHub GraphQL search client.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::convert::to_result_page;
use super::error::QueryError;
use super::query::build_request_body;
use super::types::{GraphqlResponse, RateLimitInfo, ResultPage, SearchData, SearchQuery};
use crate::http::{HttpHeaders, HttpRequest, HttpResponse, HttpTransport, header_get};
use crate::retry::{RetryConfig, with_retry};

/// Default GraphQL endpoint.
pub const GITHUB_GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Remaining rate-limit points below which a warning is logged.
const LOW_RATE_LIMIT_THRESHOLD: usize = 50;

/// Longest slice of an error body carried into [`QueryError::Remote`].
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Anything that can answer a repository search.
///
/// The browse controller depends on this trait rather than on
/// [`SearchClient`] so tests can script responses.
#[async_trait]
pub trait RepoSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<ResultPage, QueryError>;
}

/// Connection settings for [`SearchClient`].
///
/// The credential is injected here once, at construction, instead of being
/// looked up on every call.
#[derive(Clone)]
pub struct ClientConfig {
    /// Bearer token. An empty token is sent as-is; the endpoint rejects it.
    pub token: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Retry transport failures with backoff. `None` disables retries.
    pub retry: Option<RetryConfig>,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: GITHUB_GRAPHQL_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: "reposcout".to_string(),
            retry: None,
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: Option<RetryConfig>) -> Self {
        self.retry = retry;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &if self.token.is_empty() { "<empty>" } else { "<redacted>" })
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("retry", &self.retry)
            .finish()
    }
}

/// GitHub repository search client.
///
/// Sends one POST per search through an [`HttpTransport`] and flattens the
/// nested GraphQL response.
#[derive(Clone)]
pub struct SearchClient {
    transport: Arc<dyn HttpTransport>,
    config: Arc<ClientConfig>,
    last_rate_limit: Arc<Mutex<Option<RateLimitInfo>>>,
}

impl SearchClient {
    /// Create a client backed by reqwest.
    #[cfg(feature = "github")]
    pub fn new(config: ClientConfig) -> Result<Self, QueryError> {
        use crate::http::reqwest_transport::ReqwestTransport;

        let transport = ReqwestTransport::with_timeout(config.timeout)
            .map_err(|e| QueryError::InvalidRequest(e.to_string()))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            last_rate_limit: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The rate limit reported by the most recent response, if any.
    pub fn last_rate_limit(&self) -> Option<RateLimitInfo> {
        self.last_rate_limit
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn headers(&self) -> HttpHeaders {
        vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.config.token),
            ),
        ]
    }

    /// Run a search, retrying transport failures when configured.
    pub async fn search(&self, query: &SearchQuery) -> Result<ResultPage, QueryError> {
        if query.per_page == 0 {
            return Err(QueryError::InvalidRequest(
                "page size must be positive".to_string(),
            ));
        }

        match &self.config.retry {
            Some(retry) => {
                with_retry(
                    || self.search_once(query),
                    retry,
                    QueryError::is_transport,
                    "search",
                )
                .await
            }
            None => self.search_once(query).await,
        }
    }

    async fn search_once(&self, query: &SearchQuery) -> Result<ResultPage, QueryError> {
        let body =
            build_request_body(query).map_err(|e| QueryError::InvalidRequest(e.to_string()))?;
        let request = HttpRequest::post_json(&self.config.endpoint, self.headers(), &body)
            .map_err(|e| QueryError::InvalidRequest(e.to_string()))?;

        tracing::debug!(
            endpoint = %self.config.endpoint,
            text = %query.text,
            per_page = query.per_page,
            has_cursor = query.cursor.is_some(),
            "Sending search request"
        );

        let response = self.transport.send(request).await?;
        self.update_rate_limit(&response.headers);

        if !response.is_success() {
            return Err(classify_failure(&response));
        }

        let envelope: GraphqlResponse<SearchData> = serde_json::from_slice(&response.body)
            .map_err(|e| QueryError::Decode(e.to_string()))?;
        let page = to_result_page(envelope)?;

        tracing::debug!(
            count = page.repos.len(),
            total = page.total_count,
            has_next_page = page.page_info.has_next_page,
            "Search page received"
        );

        Ok(page)
    }

    fn update_rate_limit(&self, headers: &HttpHeaders) {
        if let Some(info) = parse_rate_limit_headers(headers) {
            if info.remaining <= LOW_RATE_LIMIT_THRESHOLD {
                tracing::warn!(
                    remaining = info.remaining,
                    limit = info.limit,
                    reset_at = %info.reset_at,
                    "GitHub rate limit nearly exhausted"
                );
            } else {
                tracing::debug!(remaining = info.remaining, limit = info.limit, "Rate limit");
            }
            *self
                .last_rate_limit
                .lock()
                .unwrap_or_else(|e| e.into_inner()) = Some(info);
        }
    }
}

#[async_trait]
impl RepoSearch for SearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<ResultPage, QueryError> {
        SearchClient::search(self, query).await
    }
}

/// Extract rate limit info from GitHub response headers.
pub fn parse_rate_limit_headers(headers: &HttpHeaders) -> Option<RateLimitInfo> {
    let limit = header_get(headers, "x-ratelimit-limit")?
        .parse::<usize>()
        .ok()?;
    let remaining = header_get(headers, "x-ratelimit-remaining")?
        .parse::<usize>()
        .ok()?;
    let reset_epoch = header_get(headers, "x-ratelimit-reset")?
        .parse::<i64>()
        .ok()?;
    let reset_at = DateTime::from_timestamp(reset_epoch, 0).unwrap_or_else(Utc::now);
    Some(RateLimitInfo {
        limit,
        remaining,
        reset_at,
    })
}

/// Map a non-success response to a [`QueryError`].
fn classify_failure(response: &HttpResponse) -> QueryError {
    let status = response.status;
    let exhausted = header_get(&response.headers, "x-ratelimit-remaining") == Some("0");

    if status == 429 || (status == 403 && exhausted) {
        let reset_at = parse_rate_limit_headers(&response.headers)
            .map(|info| info.reset_at)
            .unwrap_or_else(|| Utc::now() + chrono::Duration::minutes(1));
        return QueryError::RateLimited { reset_at };
    }

    if status == 401 || status == 403 {
        return QueryError::Unauthorized { status };
    }

    QueryError::Remote {
        status,
        message: error_body_message(&response.body),
    }
}

/// Prefer GitHub's `{"message": ...}` field, else a bounded slice of the body.
fn error_body_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body)
        && let Some(message) = value.get("message").and_then(|m| m.as_str())
    {
        return message.to_string();
    }

    String::from_utf8_lossy(body)
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect()
}
