//! Classification instances

use super::value::AttributeMap;
use serde::{Deserialize, Serialize};

/// A time window during which a classification is in effect
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBoundary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl TimeBoundary {
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            start_time: Some(start_time.into()),
            end_time: Some(end_time.into()),
            time_zone: Some(time_zone.into()),
        }
    }
}

/// A typed tag on an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub type_name: String,
    /// Entity the classification is authoritatively attached to
    pub entity_guid: Option<String>,
    pub propagate: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validity_periods: Vec<TimeBoundary>,
    #[serde(default)]
    pub attributes: AttributeMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_boundary_json_shape() {
        let window = TimeBoundary::new("2024/01/01 00:00:00", "2024/12/31 23:59:59", "UTC");
        let json = serde_json::to_string(&window).unwrap();
        assert_eq!(
            json,
            r#"{"startTime":"2024/01/01 00:00:00","endTime":"2024/12/31 23:59:59","timeZone":"UTC"}"#
        );

        let partial: TimeBoundary = serde_json::from_str(r#"{"startTime":"2024/01/01 00:00:00"}"#).unwrap();
        assert_eq!(partial.end_time, None);
    }
}
