// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Collects one window of CloudWatch metric statistics and forwards them as
//! newline-delimited JSON events to a bulk log intake.
//!
//! The pipeline runs strictly in order, once per invocation:
//!
//! ```text
//!   CollectionConfig ──> enumerator ──> request_builder ──> fetcher
//!                                                             │
//!                         shipper <── batcher <── enricher <──┘
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod api;
pub mod batcher;
pub mod cloudwatch;
pub mod config;
pub mod enricher;
pub mod enumerator;
pub mod error;
pub mod event;
pub mod fetcher;
pub mod metric;
pub mod pipeline;
pub mod request_builder;
pub mod settings;
pub mod shipper;

/// Type tag attached to every bulk delivery.
pub const EVENT_TYPE: &str = "cloudwatchmetrics";

/// Bins are sealed once they reach this many serialized bytes.
pub const DEFAULT_BULK_THRESHOLD_BYTES: usize = 1024 * 1024;
