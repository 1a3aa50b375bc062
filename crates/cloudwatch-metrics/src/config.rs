// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Metric selection configuration file.
//!
//! The file is read into loosely typed raw structs first and then validated
//! into a [`CollectionConfig`], so every later stage works with values that
//! are already known to be consistent.
//!
//! ```json
//! {
//!   "TimeInterval": 5,
//!   "Period": 60,
//!   "Statistics": ["Average", "Maximum"],
//!   "Configurations": [
//!     {"Namespace": "AWS/Lambda", "MetricName": "Duration"},
//!     {"Namespace": "AWS/EC2", "Dimensions": [{"Name": "InstanceId"}]}
//!   ]
//! }
//! ```

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::metric::{Statistic, StatisticsSelector};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("unable to read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error in configuration file format: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Period must be at least 1 second")]
    ZeroPeriod,
    #[error("TimeInterval ({interval_minutes} min) can't be shorter than Period ({period_seconds} sec)")]
    PeriodExceedsInterval {
        interval_minutes: u32,
        period_seconds: u32,
    },
    #[error("{name} is not one of Average, Minimum, Maximum, SampleCount, Sum")]
    UnknownStatistic { name: String },
    #[error("Statistics and ExtendedStatistics can't both be set")]
    ConflictingStatistics,
    #[error("Namespace is a required field (Configurations[{index}])")]
    MissingNamespace { index: usize },
    #[error("dimension {dimension} of {metric} collides with a reserved event field")]
    ReservedDimension { metric: String, dimension: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawConfig {
    time_interval: u32,
    period: u32,
    #[serde(default)]
    statistics: Option<Vec<String>>,
    #[serde(default)]
    extended_statistics: Option<Vec<String>>,
    configurations: Vec<RawFilter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawFilter {
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    metric_name: Option<String>,
    #[serde(default)]
    dimensions: Vec<DimensionFilter>,
    #[serde(default)]
    recently_active: Option<String>,
}

/// Restricts a listing to metrics carrying dimension `name`, and optionally
/// only the instance where it equals `value`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DimensionFilter {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// One `Configurations` entry: which metrics to enumerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricFilter {
    pub namespace: String,
    pub metric_name: Option<String>,
    pub dimensions: Vec<DimensionFilter>,
    /// Only list metrics with data in this recent span, e.g. `PT3H`.
    pub recently_active: Option<String>,
}

impl MetricFilter {
    pub fn namespace(namespace: impl Into<String>) -> Self {
        MetricFilter {
            namespace: namespace.into(),
            metric_name: None,
            dimensions: Vec::new(),
            recently_active: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionConfig {
    pub time_interval_minutes: u32,
    pub period_seconds: u32,
    pub selector: StatisticsSelector,
    pub filters: Vec<MetricFilter>,
}

impl CollectionConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read configuration file {}", path.display());
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(contents)?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if u64::from(raw.time_interval) * 60 < u64::from(raw.period) {
            return Err(ConfigError::PeriodExceedsInterval {
                interval_minutes: raw.time_interval,
                period_seconds: raw.period,
            });
        }

        let statistics = raw.statistics.unwrap_or_default();
        let extended_statistics = raw.extended_statistics.unwrap_or_default();
        let selector = selector_from(statistics, extended_statistics)?;

        let filters = raw
            .configurations
            .into_iter()
            .enumerate()
            .map(|(index, filter)| match filter.namespace {
                Some(namespace) if !namespace.is_empty() => Ok(MetricFilter {
                    namespace,
                    metric_name: filter.metric_name,
                    dimensions: filter.dimensions,
                    recently_active: filter.recently_active,
                }),
                _ => Err(ConfigError::MissingNamespace { index }),
            })
            .collect::<Result<Vec<MetricFilter>, ConfigError>>()?;

        Ok(CollectionConfig {
            time_interval_minutes: raw.time_interval,
            period_seconds: raw.period,
            selector,
            filters,
        })
    }
}

fn selector_from(
    statistics: Vec<String>,
    extended_statistics: Vec<String>,
) -> Result<StatisticsSelector, ConfigError> {
    let standard = statistics
        .iter()
        .map(|name| {
            name.parse::<Statistic>()
                .map_err(|_| ConfigError::UnknownStatistic { name: name.clone() })
        })
        .collect::<Result<BTreeSet<Statistic>, ConfigError>>()?;

    match (standard.is_empty(), extended_statistics.is_empty()) {
        (false, false) => Err(ConfigError::ConflictingStatistics),
        (false, true) => Ok(StatisticsSelector::Standard(standard)),
        (true, false) => Ok(StatisticsSelector::Extended(
            extended_statistics.into_iter().collect(),
        )),
        (true, true) => Ok(StatisticsSelector::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"{
        "TimeInterval": 5,
        "Period": 60,
        "Statistics": ["Average", "Maximum"],
        "Configurations": [
            {"Namespace": "AWS/Lambda", "MetricName": "Duration"},
            {"Namespace": "AWS/EC2", "Dimensions": [{"Name": "InstanceId", "Value": "i-1"}], "RecentlyActive": "PT3H"}
        ]
    }"#;

    #[test]
    fn test_valid_config() {
        let config = CollectionConfig::from_json(VALID).unwrap();
        assert_eq!(config.time_interval_minutes, 5);
        assert_eq!(config.period_seconds, 60);
        assert_eq!(
            config.selector,
            StatisticsSelector::Standard([Statistic::Average, Statistic::Maximum].into())
        );
        assert_eq!(config.filters.len(), 2);
        assert_eq!(config.filters[0].metric_name.as_deref(), Some("Duration"));
        assert_eq!(
            config.filters[1].dimensions,
            vec![DimensionFilter {
                name: "InstanceId".to_string(),
                value: Some("i-1".to_string()),
            }]
        );
        assert_eq!(config.filters[1].recently_active.as_deref(), Some("PT3H"));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let config = CollectionConfig::from_path(file.path()).unwrap();
        assert_eq!(config.filters[0].namespace, "AWS/Lambda");
    }

    #[test]
    fn test_missing_file() {
        let err = CollectionConfig::from_path(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_missing_time_interval() {
        let err = CollectionConfig::from_json(r#"{"Period": 60, "Configurations": []}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = CollectionConfig::from_json("{\"TimeInterval\": ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_non_integer_period() {
        let err = CollectionConfig::from_json(
            r#"{"TimeInterval": 5, "Period": "60", "Configurations": []}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = CollectionConfig::from_json(
            r#"{"TimeInterval": 5.5, "Period": 60, "Configurations": []}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_period_exceeds_interval() {
        let err = CollectionConfig::from_json(
            r#"{"TimeInterval": 1, "Period": 61, "Configurations": []}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PeriodExceedsInterval {
                interval_minutes: 1,
                period_seconds: 61
            }
        ));
    }

    #[test]
    fn test_period_equal_to_interval() {
        let config = CollectionConfig::from_json(
            r#"{"TimeInterval": 1, "Period": 60, "Configurations": []}"#,
        )
        .unwrap();
        assert_eq!(config.period_seconds, 60);
    }

    #[test]
    fn test_zero_period() {
        let err = CollectionConfig::from_json(
            r#"{"TimeInterval": 1, "Period": 0, "Configurations": []}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroPeriod));
    }

    #[test]
    fn test_unknown_statistic() {
        let err = CollectionConfig::from_json(
            r#"{"TimeInterval": 5, "Period": 60, "Statistics": ["Median"], "Configurations": []}"#,
        )
        .unwrap_err();
        match err {
            ConfigError::UnknownStatistic { name } => assert_eq!(name, "Median"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_conflicting_statistics() {
        let err = CollectionConfig::from_json(
            r#"{
                "TimeInterval": 5, "Period": 60,
                "Statistics": ["Average"], "ExtendedStatistics": ["p99"],
                "Configurations": []
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingStatistics));
    }

    #[test]
    fn test_extended_statistics_selector() {
        let config = CollectionConfig::from_json(
            r#"{
                "TimeInterval": 5, "Period": 60,
                "Statistics": [], "ExtendedStatistics": ["p99", "p50"],
                "Configurations": []
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.selector,
            StatisticsSelector::Extended(["p50".to_string(), "p99".to_string()].into())
        );
    }

    #[test]
    fn test_default_selector() {
        let config = CollectionConfig::from_json(
            r#"{"TimeInterval": 5, "Period": 60, "Statistics": null, "Configurations": []}"#,
        )
        .unwrap();
        assert_eq!(config.selector, StatisticsSelector::default());
    }

    #[test]
    fn test_missing_namespace() {
        let err = CollectionConfig::from_json(
            r#"{
                "TimeInterval": 5, "Period": 60,
                "Configurations": [{"Namespace": "AWS/EC2"}, {"MetricName": "CPUUtilization"}]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingNamespace { index: 1 }));

        let err = CollectionConfig::from_json(
            r#"{"TimeInterval": 5, "Period": 60, "Configurations": [{"Namespace": ""}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingNamespace { index: 0 }));
    }

    #[test]
    fn test_non_string_metric_name() {
        let err = CollectionConfig::from_json(
            r#"{
                "TimeInterval": 5, "Period": 60,
                "Configurations": [{"Namespace": "AWS/EC2", "MetricName": 7}]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
