// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::api::FetchError;
use crate::config::ConfigError;
use crate::event::EventError;
use crate::shipper::DeliveryError;

/// Opaque error produced by a monitoring API implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Any failure that aborts a collection run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid trigger event: {0}")]
    Event(#[from] EventError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}
