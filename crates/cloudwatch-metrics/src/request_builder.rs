// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use tracing::debug;

use crate::metric::{MetricDescriptor, StatisticsSelector, StatsRequest, TimeWindow};

/// Builds one statistics query per enumerated metric, in enumeration order.
///
/// Metrics without dimensions have no queryable instance and are skipped.
pub fn build_requests(
    metrics: Vec<MetricDescriptor>,
    window: &TimeWindow,
    selector: &StatisticsSelector,
) -> Vec<StatsRequest> {
    let total = metrics.len();
    let requests = metrics
        .into_iter()
        .filter(|descriptor| !descriptor.dimensions.is_empty())
        .map(|descriptor| StatsRequest {
            descriptor,
            window: *window,
            selector: selector.clone(),
        })
        .collect::<Vec<StatsRequest>>();

    if requests.len() < total {
        debug!(
            "Skipped {} metrics without dimensions",
            total - requests.len()
        );
    }
    requests
}
