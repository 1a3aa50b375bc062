// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use std::process::ExitCode;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use cloudwatch_metrics::{
    cloudwatch::CloudWatchApi,
    error::Error,
    event::{EventError, TriggerEvent},
    pipeline::{invoke, RunSummary},
    settings::Settings,
};

#[tokio::main]
pub async fn main() -> ExitCode {
    let log_level = env::var("LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());
    let env_filter = format!(
        "h2=off,hyper=off,hyper_util=off,rustls=off,aws_config=warn,aws_smithy_runtime=warn,{log_level}"
    );

    let filter = match EnvFilter::try_new(&env_filter) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("could not parse log level {log_level:?}: {e}");
            EnvFilter::new("info")
        }
    };
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
    }

    debug!("Logging subsystem enabled");

    match run().await {
        Ok(summary) => {
            info!(
                "Collection finished: {} data points from {} requests, {} bins shipped",
                summary.data_points, summary.requests, summary.bins_shipped
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Error::Delivery(delivery) = &e {
                debug!("Delivery failure retryable: {}", delivery.is_retryable());
            }
            error!("Collection failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunSummary, Error> {
    let settings = Settings::from_env().map_err(|e| {
        error!("Some environment variables are missing or invalid: {e}");
        e
    })?;
    debug!("Resolved settings: {settings:?}");

    let payload = read_event(env::args().nth(1), tokio::io::stdin()).await?;
    let event = TriggerEvent::from_json(&payload)?;
    let api = CloudWatchApi::from_env().await;
    invoke(&api, &settings, &event).await
}

/// The trigger event comes from the first argument, or `input` when absent.
async fn read_event<R>(argument: Option<String>, mut input: R) -> Result<String, EventError>
where
    R: AsyncRead + Unpin,
{
    if let Some(event) = argument {
        return Ok(event);
    }
    let mut event = String::new();
    input
        .read_to_string(&mut event)
        .await
        .map_err(EventError::Unreadable)?;
    Ok(event)
}
