//! API client for communicating with the HD Notes REST API.
//!
//! This module provides the `ApiClient` struct: shared connection pool,
//! base URL handling, response checking and rate-limit retries. Endpoint
//! methods live in `auth` and `notes`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::ApiError;
use crate::auth::SessionStore;

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when neither config nor environment provide one
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

pub type ApiResult<T> = Result<T, ApiError>;

/// `{"data": ...}` wrapper used by the notes endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// `{"message": "..."}` acknowledgement
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// API client for HD Notes.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Option<Arc<SessionStore>>,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
        })
    }

    /// Create a client whose protected requests carry the session's token,
    /// sharing the connection pool.
    pub fn with_session(&self, session: Arc<SessionStore>) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            session: Some(session),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request to a public endpoint (auth). Never carries a token.
    pub(crate) fn public(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Request to a protected endpoint. The session store decides whether a
    /// bearer token goes with it.
    pub(crate) fn protected(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, self.url(path));
        match self.session {
            Some(ref session) => session.attach_authorization(request),
            None => request,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request and decode its JSON body, backing off on 429.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;
        let mut pending = request;

        loop {
            let retry = pending.try_clone();
            let response = pending.send().await?;
            let url = response.url().to_string();

            if response.status().as_u16() == 429 {
                retries += 1;
                match retry {
                    Some(next) if retries <= MAX_RATE_LIMIT_RETRIES => {
                        warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                        backoff_ms *= 2; // Exponential backoff
                        pending = next;
                        continue;
                    }
                    _ => return Err(ApiError::RateLimited),
                }
            }

            let response = Self::check_response(response).await?;
            let text = response.text().await?;
            debug!(url = %url, bytes = text.len(), "Response received");
            return serde_json::from_str(&text).map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStore, SessionStore};
    use crate::models::User;

    #[test]
    fn test_url_joining() {
        let api = ApiClient::new("http://localhost:5000/api/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:5000/api");
        assert_eq!(api.url("/login/oauth"), "http://localhost:5000/api/login/oauth");
        assert_eq!(api.url("notes/stats"), "http://localhost:5000/api/notes/stats");
    }

    #[test]
    fn test_public_requests_never_carry_token() {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStore::new())));
        session.login(User::new("1", "ana", "a@b.co"), "tok".to_string());
        let api = ApiClient::new(DEFAULT_API_BASE_URL).unwrap().with_session(session);

        let public = api.public(Method::POST, "login/manual-login").build().unwrap();
        assert!(public.headers().get(reqwest::header::AUTHORIZATION).is_none());

        let protected = api.protected(Method::GET, "notes/stats").build().unwrap();
        assert_eq!(
            protected.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer tok"
        );
    }

    #[test]
    fn test_protected_without_session_store() {
        let api = ApiClient::new(DEFAULT_API_BASE_URL).unwrap();
        let request = api.protected(Method::GET, "notes/stats").build().unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }
}
