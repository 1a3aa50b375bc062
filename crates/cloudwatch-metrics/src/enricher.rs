// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turns raw samples into flat, self-describing events.
//!
//! ```json
//! {"Average": 12.5, "Unit": "Milliseconds", "metric": "Duration",
//!  "@timestamp": "2023-01-01T00:00:00", "Namespace": "AWS/Lambda",
//!  "FunctionName": "my-function"}
//! ```

use serde::ser::Error as _;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ConfigError;
use crate::error::Error;
use crate::metric::{DataPoint, StatsRequest};

pub const TIMESTAMP_FIELD: &str = "@timestamp";
pub const METRIC_FIELD: &str = "metric";
pub const NAMESPACE_FIELD: &str = "Namespace";

const RESERVED_FIELDS: [&str; 3] = [TIMESTAMP_FIELD, METRIC_FIELD, NAMESPACE_FIELD];

/// ISO-8601 extended format, UTC, second precision, no offset.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEvent(Map<String, Value>);

impl EnrichedEvent {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Serializes the event as a single JSON line.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}

pub fn enrich(data_point: &DataPoint, request: &StatsRequest) -> Result<EnrichedEvent, Error> {
    let descriptor = &request.descriptor;

    let mut fields = object_fields(data_point)?;
    fields.insert(
        METRIC_FIELD.to_string(),
        Value::String(descriptor.metric_name.clone()),
    );
    fields.insert(
        TIMESTAMP_FIELD.to_string(),
        Value::String(data_point.timestamp.format(TIMESTAMP_FORMAT).to_string()),
    );
    fields.insert(
        NAMESPACE_FIELD.to_string(),
        Value::String(descriptor.namespace.clone()),
    );

    for dimension in &descriptor.dimensions {
        if RESERVED_FIELDS.contains(&dimension.name.as_str()) {
            return Err(ConfigError::ReservedDimension {
                metric: descriptor.to_string(),
                dimension: dimension.name.clone(),
            }
            .into());
        }
        fields.insert(dimension.name.clone(), Value::String(dimension.value.clone()));
    }

    Ok(EnrichedEvent(fields))
}

fn object_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(serde_json::Error::custom(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}
