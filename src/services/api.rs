use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the pet API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: missing or expired token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Headers attached to every outgoing API request.
///
/// Cloning shares the same map, so the session store and the API client
/// see each other's changes. The lock is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct DefaultHeaders {
    inner: Arc<RwLock<HeaderMap>>,
}

impl DefaultHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `Authorization: Bearer <token>`.
    ///
    /// A token that is not a valid header value leaves the map unchanged.
    pub fn set_bearer(&self, token: &str) {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.write().insert(AUTHORIZATION, value);
            }
            Err(e) => {
                tracing::warn!("Token is not a valid header value, authorization not set: {}", e);
            }
        }
    }

    /// Remove every default header.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Current `Authorization` value, if any.
    pub fn authorization(&self) -> Option<String> {
        self.read()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of the current headers
    pub fn snapshot(&self) -> HeaderMap {
        self.read().clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HeaderMap> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HeaderMap> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// HTTP client for the pet API.
///
/// Every request carries the current `DefaultHeaders`, so logging in or
/// out through the session store changes what later requests send.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    headers: DefaultHeaders,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>, timeout: Duration, headers: DefaultHeaders) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            headers,
        })
    }

    pub fn headers(&self) -> &DefaultHeaders {
        &self.headers
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Start a request with the default headers applied
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);

        self.client.request(method, url).headers(self.headers.snapshot())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path).send().await?;
        read_json(path, response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(Method::POST, path).json(body).send().await?;
        read_json(path, response).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        read_json(path, response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, path).send().await?;
        check_status(path, &response)?;
        Ok(())
    }
}

fn check_status(path: &str, response: &Response) -> Result<(), ApiError> {
    match response.status() {
        status if status.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(path.to_string())),
        status => Err(ApiError::ApiError(format!("{} returned {}", path, status))),
    }
}

async fn read_json<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ApiError> {
    check_status(path, &response)?;

    let body = response.bytes().await?;
    serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {}: {}", path, e)))
}
