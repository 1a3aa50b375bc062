// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! One collection run, from metric enumeration to the last shipped bin.
//!
//! Events are enriched, batched and shipped while statistics are still being
//! fetched: a bin goes out as soon as it is sealed instead of after the whole
//! window is in memory. Any error stops the run where it happened, so bins
//! sealed before a late failure have already been delivered.

use tracing::{info, info_span, Instrument};

use crate::api::MonitoringApi;
use crate::batcher::{BulkBatcher, BulkPayload};
use crate::config::CollectionConfig;
use crate::enricher::enrich;
use crate::enumerator::enumerate_metrics;
use crate::error::Error;
use crate::event::TriggerEvent;
use crate::fetcher::fetch_statistics;
use crate::metric::TimeWindow;
use crate::request_builder::build_requests;
use crate::settings::Settings;
use crate::shipper::{Backoff, Shipper};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub metrics_enumerated: usize,
    pub requests: usize,
    pub data_points: usize,
    pub events_shipped: usize,
    pub bins_shipped: usize,
}

/// Loads the configuration named by `settings` and collects the window
/// defined by `event`.
pub async fn invoke<A: MonitoringApi + ?Sized>(
    api: &A,
    settings: &Settings,
    event: &TriggerEvent,
) -> Result<RunSummary, Error> {
    let config = CollectionConfig::from_path(&settings.config_path)?;
    let window = event.window(&config)?;
    let shipper = Shipper::from_settings(settings)?;
    run_collection(
        api,
        &config,
        window,
        BulkBatcher::new(settings.bulk_threshold_bytes),
        &shipper,
    )
    .await
}

pub async fn run_collection<A, B>(
    api: &A,
    config: &CollectionConfig,
    window: TimeWindow,
    mut batcher: BulkBatcher,
    shipper: &Shipper<B>,
) -> Result<RunSummary, Error>
where
    A: MonitoringApi + ?Sized,
    B: Backoff,
{
    let span = info_span!("collect", start = %window.start, end = %window.end);
    async move {
        info!("Collecting CloudWatch metrics at {}", window.end);
        let mut summary = RunSummary::default();

        let metrics = enumerate_metrics(api, &config.filters).await?;
        summary.metrics_enumerated = metrics.len();

        let requests = build_requests(metrics, &window, &config.selector);
        summary.requests = requests.len();

        for request in &requests {
            let data_points = fetch_statistics(api, request).await?;
            for data_point in &data_points {
                let line = enrich(data_point, request)?.to_json_line()?;
                summary.data_points += 1;
                if let Some(bin) = batcher.add(line) {
                    ship_bin(shipper, &bin, &mut summary).await?;
                }
            }
        }
        if let Some(bin) = batcher.finalize() {
            ship_bin(shipper, &bin, &mut summary).await?;
        }

        info!(
            "Shipped {} events in {} bins from {} requests over {} metrics",
            summary.events_shipped, summary.bins_shipped, summary.requests, summary.metrics_enumerated
        );
        Ok(summary)
    }
    .instrument(span)
    .await
}

async fn ship_bin<B: Backoff>(
    shipper: &Shipper<B>,
    bin: &BulkPayload,
    summary: &mut RunSummary,
) -> Result<(), Error> {
    let span = info_span!(
        "bin",
        index = summary.bins_shipped + 1,
        events = bin.len(),
        bytes = bin.size_bytes()
    );
    shipper.ship(bin).instrument(span).await?;
    summary.bins_shipped += 1;
    summary.events_shipped += bin.len();
    Ok(())
}
