//! Bounded-attempt retry with linearly scaled backoff around single HTTP
//! requests. The policy is injected into every outbound request rather
//! than inlined per call site.

use crate::error::HarvestError;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Status codes worth retrying. Everything else fails the request on the
/// first non-success response.
pub const RETRYABLE_STATUSES: [u16; 5] = [403, 429, 502, 503, 504];

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_secs(2),
        }
    }
}

/// A raw HTTP exchange outcome, decoupled from the transport so the retry
/// loop can be driven by fake responses in tests.
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based): `base × attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_backoff * attempt
    }

    /// Run `request` until it returns a success status, a non-retryable
    /// status, or the attempt cap is reached. Sleeps between attempts.
    pub async fn run<F, Fut>(&self, mut request: F) -> Result<RawResponse, HarvestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RawResponse, HarvestError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            let response = request().await?;
            if (200..300).contains(&response.status) {
                return Ok(response);
            }
            if RETRYABLE_STATUSES.contains(&response.status) && attempt < max_attempts {
                let delay = self.backoff_for(attempt);
                warn!(
                    status = response.status,
                    url = %response.url,
                    attempt,
                    delay_secs = delay.as_secs_f64(),
                    "transient status, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }
            return Err(HarvestError::Status {
                status: response.status,
                url: response.url,
            });
        }
    }

    /// GET `url` under this policy and return the response body.
    pub async fn get_text(&self, client: &Client, url: &str) -> Result<String, HarvestError> {
        let response = self
            .run(|| {
                let client = client.clone();
                let url = url.to_string();
                async move {
                    let response = client.get(&url).send().await?;
                    let status = response.status().as_u16();
                    let body = response.text().await?;
                    Ok(RawResponse { status, url, body })
                }
            })
            .await?;
        Ok(response.body)
    }

    /// GET `url` under this policy and decode the body as JSON. A decode
    /// failure is not retried.
    pub async fn get_json(
        &self,
        client: &Client,
        url: &str,
    ) -> Result<serde_json::Value, HarvestError> {
        let body = self.get_text(client, url).await?;
        serde_json::from_str(&body).map_err(|err| HarvestError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })
    }
}
