// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use cloudwatch_metrics::api::{MetricPage, MonitoringApi};
use cloudwatch_metrics::config::MetricFilter;
use cloudwatch_metrics::error::BoxError;
use cloudwatch_metrics::metric::{DataPoint, Dimension, MetricDescriptor, StatsRequest};
use cloudwatch_metrics::shipper::Backoff;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// In-memory monitoring API.
///
/// Listings are served per namespace as a list of pages; statistics are keyed
/// by metric name. Names in `failing_metrics` return an error.
#[derive(Default)]
pub struct FakeMonitoringApi {
    pub pages: HashMap<String, Vec<Vec<MetricDescriptor>>>,
    pub failing_namespaces: Vec<String>,
    pub data_points: HashMap<String, Vec<DataPoint>>,
    pub failing_metrics: Vec<String>,
    pub list_calls: Mutex<Vec<(String, Option<String>)>>,
    pub stats_calls: Mutex<Vec<StatsRequest>>,
}

impl FakeMonitoringApi {
    pub fn with_pages(mut self, namespace: &str, pages: Vec<Vec<MetricDescriptor>>) -> Self {
        self.pages.insert(namespace.to_string(), pages);
        self
    }

    pub fn with_data_points(mut self, metric_name: &str, data_points: Vec<DataPoint>) -> Self {
        self.data_points
            .insert(metric_name.to_string(), data_points);
        self
    }

    pub fn stats_call_count(&self) -> usize {
        self.stats_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MonitoringApi for FakeMonitoringApi {
    async fn list_metrics(
        &self,
        filter: &MetricFilter,
        next_token: Option<String>,
    ) -> Result<MetricPage, BoxError> {
        self.list_calls
            .lock()
            .unwrap()
            .push((filter.namespace.clone(), next_token.clone()));

        let index: usize = match next_token {
            Some(token) => token.parse()?,
            None => 0,
        };
        if self.failing_namespaces.contains(&filter.namespace) && index > 0 {
            return Err("throttled".into());
        }

        let pages = self.pages.get(&filter.namespace).cloned().unwrap_or_default();
        let metrics = pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < pages.len()).then(|| (index + 1).to_string());
        Ok(MetricPage {
            metrics: metrics
                .into_iter()
                .filter(|m| {
                    filter
                        .metric_name
                        .as_ref()
                        .map_or(true, |name| &m.metric_name == name)
                })
                .collect(),
            next_token,
        })
    }

    async fn get_metric_statistics(
        &self,
        request: &StatsRequest,
    ) -> Result<Vec<DataPoint>, BoxError> {
        self.stats_calls.lock().unwrap().push(request.clone());
        let name = &request.descriptor.metric_name;
        if self.failing_metrics.contains(name) {
            return Err(format!("rate exceeded for {name}").into());
        }
        Ok(self.data_points.get(name).cloned().unwrap_or_default())
    }
}

/// Backoff that never sleeps and records how often it was asked to wait.
pub struct CountingBackoff {
    pub max_attempts: u32,
    pub waits: AtomicU32,
}

impl CountingBackoff {
    pub fn new(max_attempts: u32) -> Self {
        CountingBackoff {
            max_attempts,
            waits: AtomicU32::new(0),
        }
    }

    pub fn waits(&self) -> u32 {
        self.waits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backoff for CountingBackoff {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    async fn wait(&self, _attempt: u32) {
        self.waits.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn descriptor(namespace: &str, name: &str, dimensions: &[(&str, &str)]) -> MetricDescriptor {
    MetricDescriptor {
        namespace: namespace.to_string(),
        metric_name: name.to_string(),
        dimensions: dimensions
            .iter()
            .map(|(name, value)| Dimension::new(*name, *value))
            .collect(),
    }
}

pub fn data_point(minute: u32, average: f64) -> DataPoint {
    DataPoint {
        timestamp: Utc.with_ymd_and_hms(2023, 1, 1, 0, minute, 0).unwrap(),
        average: Some(average),
        unit: Some("Percent".to_string()),
        ..Default::default()
    }
}
