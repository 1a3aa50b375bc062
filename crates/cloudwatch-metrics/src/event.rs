// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Scheduled trigger event and the collection window it defines.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::config::CollectionConfig;
use crate::metric::TimeWindow;

const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Error, Debug)]
pub enum EventError {
    #[error("no time field in the event")]
    MissingTime,
    #[error("event time {time:?} is not of the form YYYY-MM-DDTHH:MM:SSZ: {source}")]
    InvalidTime {
        time: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("event is not a JSON object: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unable to read the event: {0}")]
    Unreadable(#[source] std::io::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerEvent {
    #[serde(default)]
    pub time: Option<String>,
}

impl TriggerEvent {
    pub fn from_json(payload: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn time(&self) -> Result<DateTime<Utc>, EventError> {
        let time = self.time.as_deref().ok_or(EventError::MissingTime)?;
        NaiveDateTime::parse_from_str(time, EVENT_TIME_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|source| EventError::InvalidTime {
                time: time.to_string(),
                source,
            })
    }

    /// The window this event asks to collect: `TimeInterval` minutes ending at
    /// the event time.
    pub fn window(&self, config: &CollectionConfig) -> Result<TimeWindow, EventError> {
        Ok(TimeWindow::ending_at(
            self.time()?,
            config.time_interval_minutes,
            config.period_seconds,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::StatisticsSelector;

    fn config(time_interval_minutes: u32) -> CollectionConfig {
        CollectionConfig {
            time_interval_minutes,
            period_seconds: 60,
            selector: StatisticsSelector::default(),
            filters: vec![],
        }
    }

    #[test]
    fn test_window_from_event() {
        let event = TriggerEvent::from_json(r#"{"time": "2023-01-01T00:00:00Z"}"#).unwrap();
        let window = event.window(&config(10)).unwrap();
        assert_eq!(
            window.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2022-12-31T23:50:00"
        );
        assert_eq!(
            window.end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2023-01-01T00:00:00"
        );
        assert_eq!(window.period_seconds, 60);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let event = TriggerEvent::from_json(
            r#"{"id": "abc", "detail-type": "Scheduled Event", "time": "2023-06-15T12:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            event.time().unwrap().to_rfc3339(),
            "2023-06-15T12:30:00+00:00"
        );
    }

    #[test]
    fn test_missing_time() {
        let event = TriggerEvent::from_json(r#"{"detail-type": "Scheduled Event"}"#).unwrap();
        assert!(matches!(event.time(), Err(EventError::MissingTime)));
    }

    #[test]
    fn test_invalid_time() {
        let event = TriggerEvent::from_json(r#"{"time": "2023-01-01 00:00:00"}"#).unwrap();
        assert!(matches!(event.time(), Err(EventError::InvalidTime { .. })));
    }

    #[test]
    fn test_malformed_event() {
        assert!(matches!(
            TriggerEvent::from_json("[1, 2]"),
            Err(EventError::Malformed(_))
        ));
    }
}
