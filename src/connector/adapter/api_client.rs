use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{DomainError, SessionContext};

/// Default target: a booking backend on the local machine.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_CURRENCY: &str = "EUR";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the booking backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Used when the session carries no token of its own.
    pub token: Option<String>,
    pub timeout: Duration,
    /// Currency assumed for services that do not state one.
    pub currency: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Construct from environment variables:
    ///
    /// | Variable                   | Default                 | Purpose                      |
    /// |----------------------------|-------------------------|------------------------------|
    /// | `BOOKING_API_URL`          | `http://localhost:8080` | Backend base URL             |
    /// | `BOOKING_API_TOKEN`        | unset                   | Bearer token                 |
    /// | `BOOKING_API_TIMEOUT_SECS` | `10`                    | Per-request transport limit  |
    /// | `BOOKING_CURRENCY`         | `EUR`                   | Currency for unlabeled prices |
    pub fn from_env() -> Self {
        let base = std::env::var("BOOKING_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(base);
        config.token = std::env::var("BOOKING_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        if let Some(secs) = std::env::var("BOOKING_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(currency) = std::env::var("BOOKING_CURRENCY") {
            if !currency.trim().is_empty() {
                config.currency = currency.trim().to_uppercase();
            }
        }
        config
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Shared reqwest transport for the HTTP adapters.
///
/// Every request carries a bearer token when one is known, taken from the
/// session first and the configuration second. Transport failures and
/// unexpected statuses surface as [`DomainError::Network`].
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .unwrap_or_default(),
            base_url,
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn get(&self, path: &str, ctx: Option<&SessionContext>) -> RequestBuilder {
        self.authorize(self.client.get(self.url(path)), ctx)
    }

    pub(crate) fn post(&self, path: &str, ctx: Option<&SessionContext>) -> RequestBuilder {
        self.authorize(self.client.post(self.url(path)), ctx)
    }

    /// Sends the request, mapping transport failures to network errors.
    pub(crate) async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, DomainError> {
        debug!("Booking API: {}", what);
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                DomainError::network(format!("{what}: request timed out"))
            } else {
                DomainError::network(format!("{what}: request failed: {e}"))
            }
        })
    }

    /// Sends a request whose only acceptable outcome is a 2xx JSON body.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, DomainError> {
        let response = self.send(request, what).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let reason = error_message(response).await;
            return Err(DomainError::not_found(format!("{what}: {reason}")));
        }
        if !status.is_success() {
            return Err(unexpected_status(what, status, response).await);
        }
        read_json(response, what).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder, ctx: Option<&SessionContext>) -> RequestBuilder {
        let token = ctx
            .and_then(SessionContext::token)
            .or(self.config.token.as_deref());
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, DomainError> {
    response
        .json()
        .await
        .map_err(|e| DomainError::network(format!("{what}: failed to parse response: {e}")))
}

/// The `error` field of a JSON error body, or the raw body text.
pub(crate) async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => body,
    }
}

pub(crate) async fn unexpected_status(what: &str, status: StatusCode, response: Response) -> DomainError {
    let reason = error_message(response).await;
    warn!("Booking API: {what} returned {status}: {reason}");
    DomainError::network(format!("{what}: API returned {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = ApiConfig::new("http://example.test/");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.currency, DEFAULT_CURRENCY);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ApiClient::new(ApiConfig::new("http://example.test/"));
        assert_eq!(client.base_url(), "http://example.test");
        assert_eq!(client.url("/businesses"), "http://example.test/businesses");
    }
}
