// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use tracing::{debug, error, info};

use crate::api::{FetchError, MonitoringApi};
use crate::config::MetricFilter;
use crate::metric::MetricDescriptor;

/// Lists every metric matching `filters`, following pagination to the end.
///
/// Results are concatenated in filter order, then page order. Overlapping
/// filters yield duplicate descriptors; they are kept. A failure on any page
/// aborts the whole enumeration, since a partial catalog would silently
/// undercount exported metrics.
pub async fn enumerate_metrics<A: MonitoringApi + ?Sized>(
    api: &A,
    filters: &[MetricFilter],
) -> Result<Vec<MetricDescriptor>, FetchError> {
    let mut metrics = Vec::new();

    for filter in filters {
        let mut next_token: Option<String> = None;
        let mut page = 0;
        loop {
            page += 1;
            let response = api
                .list_metrics(filter, next_token.take())
                .await
                .map_err(|source| {
                    error!(
                        "Exception from ListMetrics for namespace {} (page {page}): {source}",
                        filter.namespace
                    );
                    FetchError::ListMetrics {
                        namespace: filter.namespace.clone(),
                        page,
                        source,
                    }
                })?;
            debug!(
                "ListMetrics page {page} for {} returned {} metrics",
                filter.namespace,
                response.metrics.len()
            );
            metrics.extend(response.metrics);

            match response.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
    }

    info!("Received {} possible metric combinations", metrics.len());
    Ok(metrics)
}
