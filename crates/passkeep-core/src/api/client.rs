//! HTTP client for the passkeep REST API.
//!
//! All outbound traffic goes through `ApiClient`. The bearer token is
//! read from durable storage on every request, so a cleared session
//! immediately stops authenticating without any in-memory coordination.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::session::{IDENTITY_ENTRY, TOKEN_ENTRY};
use crate::storage::Store;

use super::ApiError;

/// HTTP request timeout in seconds.
/// Matches the remote service's expectations; slow enough for a weak
/// connection, fast enough that a dead server fails within one breath.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// API client for the passkeep service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the store handle is an Arc.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<Store>,
}

impl ApiClient {
    /// Create a new API client against the given base address.
    pub fn new(base_url: impl Into<String>, store: Arc<Store>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach `Authorization: Bearer <token>` iff a token is persisted.
    /// An unreadable token entry counts as absent.
    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.get::<String>(TOKEN_ENTRY) {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(e) => {
                warn!(error = %e, "Failed to read stored token, sending unauthenticated");
                request
            }
        }
    }

    /// Check a response, converting failures into `ApiError`.
    ///
    /// A 401 on anything other than an auth endpoint means the session
    /// expired server-side: the persisted session entries are dropped
    /// before the error is returned. A 401 from an auth endpoint is an
    /// ordinary login failure and leaves storage alone.
    async fn check(&self, path: &str, response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED && !path.contains("/auth/") {
            debug!(path, "Received 401 outside auth routes, clearing persisted session");
            self.drop_session_entries();
        }

        Err(ApiError::from_status(status, &body))
    }

    fn drop_session_entries(&self) {
        for entry in [TOKEN_ENTRY, IDENTITY_ENTRY] {
            if let Err(e) = self.store.remove(entry) {
                warn!(entry, error = %e, "Failed to clear session entry");
            }
        }
    }

    fn decode<T: DeserializeOwned>(path: &str, text: &str) -> Result<T, ApiError> {
        serde_json::from_str(text)
            .map_err(|e| ApiError::Invalid(format!("Failed to decode response from {}: {}", path, e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .apply_auth(self.http.get(self.endpoint(path)))
            .send()
            .await?;
        let response = self.check(path, response).await?;
        let text = response.text().await?;
        Self::decode(path, &text)
    }

    /// GET that tolerates an empty result: HTTP 204 (or an empty body)
    /// yields `Ok(None)` instead of a decode failure.
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let response = self
            .apply_auth(self.http.get(self.endpoint(path)))
            .send()
            .await?;
        let response = self.check(path, response).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Self::decode(path, &text).map(Some)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .apply_auth(self.http.post(self.endpoint(path)))
            .json(body)
            .send()
            .await?;
        let response = self.check(path, response).await?;
        let text = response.text().await?;
        Self::decode(path, &text)
    }

    /// POST where the caller only cares about success.
    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let response = self
            .apply_auth(self.http.post(self.endpoint(path)))
            .json(body)
            .send()
            .await?;
        self.check(path, response).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .apply_auth(self.http.delete(self.endpoint(path)))
            .send()
            .await?;
        self.check(path, response).await?;
        Ok(())
    }
}
