// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Bulk delivery to the log intake with bounded retry.
//!
//! ```text
//!   Idle ──> Sending ──2xx──────────────> Success
//!               │ ──400/401─────────────> Failed (nonretryable)
//!               │ ──other/network──> RetryWait ──> Sending
//!               │                        └─attempts exhausted─> Failed (exhausted)
//! ```

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::batcher::BulkPayload;
use crate::settings::Settings;
use crate::EVENT_TYPE;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("bulk rejected with 400 Bad Request, payload malformed or a record is too large: {reason}")]
    BadRequest { reason: String },
    #[error("bulk rejected with 401 Unauthorized, check the ingestion token: {reason}")]
    Unauthorized { reason: String },
    #[error("bulk delivery failed after {attempts} attempts: {last_failure}")]
    Exhausted {
        attempts: u32,
        last_status: Option<StatusCode>,
        last_failure: String,
    },
    #[error("unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl DeliveryError {
    /// Whether the failure came from conditions that retrying could have fixed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeliveryError::Exhausted { .. })
    }
}

/// How many times to try a delivery and how long to wait in between.
#[async_trait]
pub trait Backoff: Send + Sync {
    fn max_attempts(&self) -> u32;

    /// Waits before the attempt following `attempt` (1-based).
    async fn wait(&self, attempt: u32);
}

#[async_trait]
impl<T: Backoff + ?Sized> Backoff for Arc<T> {
    fn max_attempts(&self) -> u32 {
        (**self).max_attempts()
    }

    async fn wait(&self, attempt: u32) {
        (**self).wait(attempt).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryStrategy {
    /// Retry without waiting.
    Immediate(u32),
    /// Wait the same delay between attempts.
    Fixed { attempts: u32, delay: Duration },
}

impl Default for RetryStrategy {
    fn default() -> Self {
        RetryStrategy::Fixed {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

#[async_trait]
impl Backoff for RetryStrategy {
    fn max_attempts(&self) -> u32 {
        match self {
            RetryStrategy::Immediate(attempts) | RetryStrategy::Fixed { attempts, .. } => *attempts,
        }
    }

    async fn wait(&self, _attempt: u32) {
        if let RetryStrategy::Fixed { delay, .. } = self {
            tokio::time::sleep(*delay).await;
        }
    }
}

enum Outcome {
    Delivered,
    Rejected(DeliveryError),
    Retry {
        status: Option<StatusCode>,
        failure: String,
    },
}

pub struct Shipper<B = RetryStrategy> {
    client: reqwest::Client,
    url: String,
    token: String,
    backoff: B,
}

impl Shipper<RetryStrategy> {
    pub fn from_settings(settings: &Settings) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(DeliveryError::Client)?;
        Ok(Shipper::new(
            client,
            &settings.url,
            &settings.token,
            RetryStrategy::Fixed {
                attempts: settings.max_attempts,
                delay: settings.retry_delay,
            },
        ))
    }
}

impl<B: Backoff> Shipper<B> {
    pub fn new(client: reqwest::Client, url: &str, token: &str, backoff: B) -> Self {
        Shipper {
            client,
            url: format!("{}/", url.trim_end_matches('/')),
            token: token.to_string(),
            backoff,
        }
    }

    /// Delivers `bin` as one POST, retrying transient failures.
    ///
    /// Returns the number of attempts it took.
    pub async fn ship(&self, bin: &BulkPayload) -> Result<u32, DeliveryError> {
        let body = bin.body();
        let max_attempts = self.backoff.max_attempts().max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let (status, failure) = match self.send(body.clone()).await {
                Outcome::Delivered => {
                    debug!(
                        "Shipped {} events ({} bytes) in {attempts} attempt(s)",
                        bin.len(),
                        bin.size_bytes()
                    );
                    return Ok(attempts);
                }
                Outcome::Rejected(err) => {
                    error!("Failed to ship {} events: {err}", bin.len());
                    return Err(err);
                }
                Outcome::Retry { status, failure } => (status, failure),
            };

            if attempts >= max_attempts {
                error!(
                    "Failed to ship {} events after {attempts} attempts: {failure}",
                    bin.len()
                );
                return Err(DeliveryError::Exhausted {
                    attempts,
                    last_status: status,
                    last_failure: failure,
                });
            }

            warn!("Attempt {attempts}/{max_attempts} to ship bulk failed: {failure}");
            self.backoff.wait(attempts).await;
        }
    }

    async fn send(&self, body: String) -> Outcome {
        let response = self
            .client
            .post(&self.url)
            .query(&[("token", self.token.as_str()), ("type", EVENT_TYPE)])
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                // reqwest errors embed the URL, which carries the token
                return Outcome::Retry {
                    status: None,
                    failure: format!("request error: {}", e.without_url()),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            return Outcome::Delivered;
        }

        let reason = format!(
            "{} {}",
            status.canonical_reason().unwrap_or_default(),
            response.text().await.unwrap_or_default()
        )
        .trim()
        .to_string();

        match status {
            StatusCode::BAD_REQUEST => Outcome::Rejected(DeliveryError::BadRequest { reason }),
            StatusCode::UNAUTHORIZED => Outcome::Rejected(DeliveryError::Unauthorized { reason }),
            _ => Outcome::Retry {
                status: Some(status),
                failure: format!("{}: {reason}", status.as_u16()),
            },
        }
    }
}
