//! Shared HTTP plumbing for catalog providers
//!
//! One connection-pooled `reqwest::Client` is built at startup and cloned
//! into every provider (clones share the pool). Each provider wraps it with
//! its own client-side rate limiter. No retries: a failed call is reported
//! once to the caller.

use super::CatalogError;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("moodrec/", env!("CARGO_PKG_VERSION"));

/// Build the process-wide HTTP client
///
/// `timeout` bounds every outbound call (connect + response).
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, CatalogError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| CatalogError::Network(e.to_string()))
}

/// Rate-limited JSON GET helper
#[derive(Clone)]
pub struct ProviderHttp {
    client: reqwest::Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl ProviderHttp {
    /// `requests_per_second` of zero is treated as one
    pub fn new(client: reqwest::Client, requests_per_second: u32) -> Self {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            client,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
        }
    }

    /// GET `url` with `query` and parse the body as JSON
    pub async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, CatalogError> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

/// Pull the `results` array out of a provider envelope
///
/// A missing `results` key is an empty page; a non-array `results` is a
/// parse error.
pub fn results_array(body: Value) -> Result<Vec<Value>, CatalogError> {
    match body {
        Value::Object(mut map) => match map.remove("results") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(results)) => Ok(results),
            Some(other) => Err(CatalogError::Parse(format!(
                "expected results array, got {}",
                other
            ))),
        },
        other => Err(CatalogError::Parse(format!("expected object, got {}", other))),
    }
}
