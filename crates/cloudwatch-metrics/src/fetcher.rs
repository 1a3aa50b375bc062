// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use tracing::{debug, error};

use crate::api::{FetchError, MonitoringApi};
use crate::metric::{DataPoint, StatsRequest};

/// Runs one statistics query.
///
/// Errors are logged with the request that caused them and returned as-is;
/// callers abort the remaining queries rather than ship a partial window.
pub async fn fetch_statistics<A: MonitoringApi + ?Sized>(
    api: &A,
    request: &StatsRequest,
) -> Result<Vec<DataPoint>, FetchError> {
    match api.get_metric_statistics(request).await {
        Ok(data_points) => {
            debug!(
                "GetMetricStatistics for {} returned {} data points",
                request.descriptor,
                data_points.len()
            );
            Ok(data_points)
        }
        Err(source) => {
            error!(
                "Exception from GetMetricStatistics for {} ({} - {}, period {}s): {source}",
                request.descriptor,
                request.window.start,
                request.window.end,
                request.window.period_seconds
            );
            Err(FetchError::GetMetricStatistics {
                metric: request.descriptor.to_string(),
                source,
            })
        }
    }
}
