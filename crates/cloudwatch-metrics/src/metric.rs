// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Core value types shared by every stage of the pipeline.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A name/value pair qualifying a metric instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Dimension {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Identity of one monitored time series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricDescriptor {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
}

impl fmt::Display for MetricDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.metric_name)?;
        if !self.dimensions.is_empty() {
            let dims = self
                .dimensions
                .iter()
                .map(|d| format!("{}={}", d.name, d.value))
                .collect::<Vec<String>>();
            write!(f, "{{{}}}", dims.join(","))?;
        }
        Ok(())
    }
}

/// Range and aggregation period of one collection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub period_seconds: u32,
}

impl TimeWindow {
    /// Window of `interval_minutes` that ends at `end`.
    pub fn ending_at(end: DateTime<Utc>, interval_minutes: u32, period_seconds: u32) -> Self {
        TimeWindow {
            start: end - Duration::minutes(i64::from(interval_minutes)),
            end,
            period_seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Statistic {
    Average,
    Minimum,
    Maximum,
    SampleCount,
    Sum,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Statistic::Average,
        Statistic::Minimum,
        Statistic::Maximum,
        Statistic::SampleCount,
        Statistic::Sum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Average => "Average",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
            Statistic::SampleCount => "SampleCount",
            Statistic::Sum => "Sum",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatistic(pub String);

impl FromStr for Statistic {
    type Err = UnknownStatistic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statistic::ALL
            .into_iter()
            .find(|stat| stat.as_str() == s)
            .ok_or_else(|| UnknownStatistic(s.to_string()))
    }
}

/// Which aggregation functions to request for every metric.
///
/// Standard and percentile statistics cannot be mixed in a single
/// `GetMetricStatistics` call, so exactly one variant is ever active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatisticsSelector {
    Standard(BTreeSet<Statistic>),
    Extended(BTreeSet<String>),
}

impl Default for StatisticsSelector {
    fn default() -> Self {
        StatisticsSelector::Standard(Statistic::ALL.into_iter().collect())
    }
}

/// One concrete `GetMetricStatistics` query.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRequest {
    pub descriptor: MetricDescriptor,
    pub window: TimeWindow,
    pub selector: StatisticsSelector,
}

/// A raw sample as returned by the monitoring API.
///
/// Serializes to the field names CloudWatch itself uses, minus the timestamp
/// which the enricher re-emits as `@timestamp`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataPoint {
    #[serde(skip)]
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extended_statistics: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}
