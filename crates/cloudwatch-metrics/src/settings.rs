// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::config::ConfigError;
use crate::DEFAULT_BULK_THRESHOLD_BYTES;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Process-level settings resolved from environment variables.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_path: PathBuf,
    pub token: String,
    /// Intake base URL, without a trailing slash.
    pub url: String,
    pub bulk_threshold_bytes: usize,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Settings, ConfigError> {
        let config_path = PathBuf::from(required("FILEPATH")?);
        let token = required("TOKEN")?;
        let url = required("URL")?.trim_end_matches('/').to_string();

        let max_attempts = optional("SHIPPER_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnv {
                name: "SHIPPER_MAX_ATTEMPTS",
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }

        Ok(Settings {
            config_path,
            token,
            url,
            bulk_threshold_bytes: optional("BULK_THRESHOLD_BYTES", DEFAULT_BULK_THRESHOLD_BYTES)?,
            max_attempts,
            retry_delay: Duration::from_secs(optional(
                "SHIPPER_RETRY_DELAY_SECS",
                DEFAULT_RETRY_DELAY_SECS,
            )?),
            request_timeout: Duration::from_secs(optional(
                "SHIPPER_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }
}

// Keeps the ingestion token out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("config_path", &self.config_path)
            .field("token", &"<redacted>")
            .field("url", &self.url)
            .field("bulk_threshold_bytes", &self.bulk_threshold_bytes)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay", &self.retry_delay)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}

fn optional<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let Ok(value) = env::var(name) else {
        return Ok(default);
    };
    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::InvalidEnv {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
