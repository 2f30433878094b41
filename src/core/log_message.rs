//! JSON envelope for a single log message

use super::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub tag: String,

    /// Nanoseconds since the Unix epoch, UTC; 0 when timestamps are disabled
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timestamp: i64,

    pub message: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl LogMessage {
    pub fn new(tag: impl Into<String>, timestamp: i64, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            timestamp,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Build a message stamped with the current UTC time
    pub fn now(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(tag, timestamp_nanos(Utc::now()), message)
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Serialize to a JSON line
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn deserialize(message: &str) -> Result<Self> {
        Ok(serde_json::from_str(message)?)
    }

    /// Timestamp as a `DateTime`, if one was recorded
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        if self.timestamp == 0 {
            return None;
        }
        Some(DateTime::from_timestamp_nanos(self.timestamp))
    }
}

/// Nanoseconds since the Unix epoch; saturates outside the representable range
pub fn timestamp_nanos(at: DateTime<Utc>) -> i64 {
    at.timestamp_nanos_opt().unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_timestamp() -> i64 {
        let at = Utc.with_ymd_and_hms(2017, 1, 3, 10, 23, 34).unwrap()
            + chrono::Duration::nanoseconds(200);
        timestamp_nanos(at)
    }

    #[test]
    fn test_serialize() {
        let message = LogMessage::new("Test", fixed_timestamp(), "messagestring");
        assert_eq!(
            message.serialize().unwrap(),
            r#"{"tag":"Test","timestamp":1483439014000000200,"message":"messagestring"}"#
        );
    }

    #[test]
    fn test_serialize_with_metadata() {
        let mut metadata = BTreeMap::new();
        metadata.insert("custom".to_string(), "field".to_string());

        let message =
            LogMessage::new("Test", fixed_timestamp(), "messagestring").with_metadata(metadata);
        assert_eq!(
            message.serialize().unwrap(),
            r#"{"tag":"Test","timestamp":1483439014000000200,"message":"messagestring","metadata":{"custom":"field"}}"#
        );
    }

    #[test]
    fn test_serialize_without_timestamp() {
        let message = LogMessage::new("Test", 0, "no clock");
        assert_eq!(
            message.serialize().unwrap(),
            r#"{"tag":"Test","message":"no clock"}"#
        );
        assert!(message.datetime().is_none());
    }

    #[test]
    fn test_deserialize() {
        let message = LogMessage::deserialize(
            r#"{"tag":"Test","timestamp":1483439014000000200,"message":"messagestring"}"#,
        )
        .unwrap();
        assert_eq!(message.tag, "Test");
        assert_eq!(message.timestamp, 1483439014000000200);
        assert_eq!(message.message, "messagestring");
        assert!(message.metadata.is_empty());
    }

    #[test]
    fn test_deserialize_invalid() {
        let result = LogMessage::deserialize("{not json");
        assert!(matches!(result, Err(crate::core::StreamError::JsonError(_))));
    }
}
