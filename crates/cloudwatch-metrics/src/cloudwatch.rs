// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! [`MonitoringApi`] backed by the AWS CloudWatch SDK.

use async_trait::async_trait;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{
    Datapoint, Dimension as AwsDimension, DimensionFilter as AwsDimensionFilter, Metric,
    RecentlyActive, Statistic as AwsStatistic,
};
use aws_sdk_cloudwatch::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::api::{MetricPage, MonitoringApi};
use crate::config::MetricFilter;
use crate::error::BoxError;
use crate::metric::{DataPoint, Dimension, MetricDescriptor, StatisticsSelector, StatsRequest};

pub struct CloudWatchApi {
    client: Client,
}

impl CloudWatchApi {
    pub fn new(client: Client) -> Self {
        CloudWatchApi { client }
    }

    /// Builds a client from the default AWS credential and region chain.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        CloudWatchApi::new(Client::new(&config))
    }
}

#[async_trait]
impl MonitoringApi for CloudWatchApi {
    async fn list_metrics(
        &self,
        filter: &MetricFilter,
        next_token: Option<String>,
    ) -> Result<MetricPage, BoxError> {
        let mut call = self
            .client
            .list_metrics()
            .namespace(&filter.namespace)
            .set_metric_name(filter.metric_name.clone())
            .set_next_token(next_token);
        for dimension in &filter.dimensions {
            call = call.dimensions(
                AwsDimensionFilter::builder()
                    .name(&dimension.name)
                    .set_value(dimension.value.clone())
                    .build(),
            );
        }
        if let Some(recently_active) = &filter.recently_active {
            call = call.recently_active(RecentlyActive::from(recently_active.as_str()));
        }

        let output = call.send().await.map_err(aws_sdk_cloudwatch::Error::from)?;
        Ok(MetricPage {
            metrics: output
                .metrics
                .unwrap_or_default()
                .into_iter()
                .map(descriptor_from)
                .collect(),
            next_token: output.next_token,
        })
    }

    async fn get_metric_statistics(
        &self,
        request: &StatsRequest,
    ) -> Result<Vec<DataPoint>, BoxError> {
        let descriptor = &request.descriptor;
        let mut call = self
            .client
            .get_metric_statistics()
            .namespace(&descriptor.namespace)
            .metric_name(&descriptor.metric_name)
            .start_time(aws_time(request.window.start))
            .end_time(aws_time(request.window.end))
            .period(aws_period(request.window.period_seconds)?);
        for dimension in &descriptor.dimensions {
            call = call.dimensions(
                AwsDimension::builder()
                    .name(&dimension.name)
                    .value(&dimension.value)
                    .build(),
            );
        }
        match &request.selector {
            StatisticsSelector::Standard(statistics) => {
                for statistic in statistics {
                    call = call.statistics(AwsStatistic::from(statistic.as_str()));
                }
            }
            StatisticsSelector::Extended(percentiles) => {
                for percentile in percentiles {
                    call = call.extended_statistics(percentile);
                }
            }
        }

        let output = call.send().await.map_err(aws_sdk_cloudwatch::Error::from)?;
        Ok(output
            .datapoints
            .unwrap_or_default()
            .into_iter()
            .filter_map(data_point_from)
            .collect())
    }
}

fn aws_time(time: DateTime<Utc>) -> AwsDateTime {
    AwsDateTime::from_secs(time.timestamp())
}

fn aws_period(period_seconds: u32) -> Result<i32, BoxError> {
    i32::try_from(period_seconds)
        .map_err(|_| format!("period of {period_seconds} seconds exceeds the API limit").into())
}

fn descriptor_from(metric: Metric) -> MetricDescriptor {
    MetricDescriptor {
        namespace: metric.namespace.unwrap_or_default(),
        metric_name: metric.metric_name.unwrap_or_default(),
        dimensions: metric
            .dimensions
            .unwrap_or_default()
            .into_iter()
            .map(|d| Dimension::new(d.name.unwrap_or_default(), d.value.unwrap_or_default()))
            .collect(),
    }
}

fn data_point_from(datapoint: Datapoint) -> Option<DataPoint> {
    let Some(timestamp) = datapoint
        .timestamp
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos()))
    else {
        debug!("Dropping data point without a timestamp");
        return None;
    };

    Some(DataPoint {
        timestamp,
        average: datapoint.average,
        minimum: datapoint.minimum,
        maximum: datapoint.maximum,
        sample_count: datapoint.sample_count,
        sum: datapoint.sum,
        extended_statistics: datapoint
            .extended_statistics
            .unwrap_or_default()
            .into_iter()
            .collect(),
        unit: datapoint.unit.map(|unit| unit.as_str().to_string()),
    })
}
