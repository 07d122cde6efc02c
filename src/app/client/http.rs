//! HTTP transport
//!
//! The `Transport` trait is the seam between the Atlas client and the
//! network. `HttpTransport` is the reqwest implementation used in
//! production; tests substitute an in-memory transport.

use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::{clock::DefaultClock, state::InMemoryState, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::app::client::config::ClientConfig;
use crate::errors::{TransportError, TransportResult};

/// Fetches the body of a resource over HTTP GET
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the body of a successful response
    ///
    /// # Errors
    ///
    /// Returns `TransportError::NotFound` for 404, `TransportError::Status`
    /// for any other non-success status, and `TransportError::Http` for
    /// network failures.
    async fn get_text(&self, url: &Url) -> TransportResult<String>;
}

/// reqwest-backed transport with request pacing
///
/// Requests are never retried; a failed request is reported to the caller
/// as-is.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpTransport {
    /// Creates a transport from the given configuration
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the HTTP client cannot be built or the
    /// rate limit is zero
    pub fn new(config: &ClientConfig) -> TransportResult<Self> {
        let client = config.build_http_client()?;
        Self::with_client(client, config.rate_limit_rps)
    }

    /// Creates a transport around an existing reqwest client
    pub fn with_client(client: Client, rate_limit_rps: u32) -> TransportResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> TransportResult<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>> {
        let quota = Quota::per_second(
            NonZeroU32::new(rate_limit_rps).ok_or(TransportError::InvalidRateLimit)?,
        );
        Ok(RateLimiter::direct(quota))
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &Url) -> TransportResult<String> {
        self.rate_limiter.until_ready().await;

        tracing::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("Not found: {}", url);
            return Err(TransportError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            tracing::warn!("HTTP {} for {}", status.as_u16(), url);
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        tracing::debug!("Fetched {} bytes from {}", text.len(), url);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_creation() {
        let rate_limiter = HttpTransport::build_rate_limiter(5).unwrap();
        rate_limiter.until_ready().await;
    }

    #[test]
    fn test_rate_limiter_zero_fails() {
        assert!(matches!(
            HttpTransport::build_rate_limiter(0),
            Err(TransportError::InvalidRateLimit)
        ));
    }

    #[tokio::test]
    async fn test_transport_creation() {
        let transport = HttpTransport::new(&ClientConfig::default());
        assert!(transport.is_ok());

        let zero = ClientConfig {
            rate_limit_rps: 0,
            ..Default::default()
        };
        assert!(HttpTransport::new(&zero).is_err());
    }
}
