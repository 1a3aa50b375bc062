// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Seam between the pipeline and the monitoring API.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::MetricFilter;
use crate::error::BoxError;
use crate::metric::{DataPoint, MetricDescriptor, StatsRequest};

/// One page of a metric listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricPage {
    pub metrics: Vec<MetricDescriptor>,
    /// Present when more pages follow.
    pub next_token: Option<String>,
}

#[async_trait]
pub trait MonitoringApi: Send + Sync {
    /// Lists one page of metrics matching `filter`, starting at `next_token`.
    async fn list_metrics(
        &self,
        filter: &MetricFilter,
        next_token: Option<String>,
    ) -> Result<MetricPage, BoxError>;

    /// Returns every sample for `request`. An empty vector means no data.
    async fn get_metric_statistics(&self, request: &StatsRequest)
        -> Result<Vec<DataPoint>, BoxError>;
}

/// Monitoring API failure during enumeration or statistics retrieval.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to list metrics for namespace {namespace} (page {page}): {source}")]
    ListMetrics {
        namespace: String,
        page: usize,
        #[source]
        source: BoxError,
    },
    #[error("failed to get statistics for {metric}: {source}")]
    GetMetricStatistics {
        metric: String,
        #[source]
        source: BoxError,
    },
}
