//! Shapes of the dashboard's `/query` body.
//!
//! Every field is optional on the wire. Per-target parameters arrived under
//! `data` in older dashboard versions and under `payload` in newer ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::util::time::parse_timestamp;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryRequest {
    pub request_id: Option<String>,
    pub panel_id: Option<Value>,
    pub range: TimeRange,
    pub interval: Option<String>,
    pub interval_ms: Option<u64>,
    pub max_data_points: Option<u64>,
    pub targets: Vec<Target>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TimeRange {
    pub from: Option<String>,
    pub to: Option<String>,
    pub raw: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Target {
    #[serde(deserialize_with = "lenient_name")]
    pub target: String,
    pub ref_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub payload: Option<Value>,
    pub data: Option<Value>,
}

/// Time window of one query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub now: DateTime<Utc>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub interval_ms: u64,
    pub max_data_points: u64,
}

impl QueryRequest {
    /// Identifier the dashboard attached to this request, for log correlation.
    pub fn correlation_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Unparseable or missing bounds fall back to `now`.
    pub fn window(&self, now: DateTime<Utc>) -> Window {
        let bound = |raw: Option<&str>| raw.and_then(parse_timestamp).unwrap_or(now);
        Window {
            now,
            from: bound(self.range.from.as_deref()),
            to: bound(self.range.to.as_deref()),
            interval_ms: self.interval_ms.unwrap_or_default(),
            max_data_points: self.max_data_points.unwrap_or_default(),
        }
    }
}

/// Anything but a string (`null`, numbers) reads as an empty name.
fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) => name,
        _ => String::new(),
    })
}

impl Target {
    /// Request parameters, preferring `payload` over the legacy `data`.
    pub fn request_detail(&self) -> Option<&Value> {
        self.payload.as_ref().or(self.data.as_ref())
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.request_detail().and_then(|detail| detail.get(key))
    }

    pub fn param_or(&self, key: &str, default: Value) -> Value {
        self.param(key).cloned().unwrap_or(default)
    }

    /// `transform` runs only when `key` is present; otherwise `default` is returned as is.
    pub fn param_map<T, F>(&self, key: &str, default: T, transform: F) -> T
    where
        F: FnOnce(&Value) -> T,
    {
        self.param(key).map_or(default, transform)
    }
}
