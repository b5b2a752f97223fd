use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Backend-assigned identifier for a single time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesId(u64);

impl SeriesId {
    /// Creates a series id from its raw backend value
    pub fn new(id: u64) -> Self {
        SeriesId(id)
    }

    /// Returns the raw backend value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Label key/value set distinguishing series that share a metric name.
///
/// Ordered so that two label sets with the same content always hash and
/// compare identically, which is what the series cache keys on.
pub type LabelMap = BTreeMap<String, String>;

/// Numeric measurements carried by a single event occurrence.
pub type Measurements = HashMap<String, f64>;

/// Free-form metadata carried by a single event occurrence.
pub type Metadata = HashMap<String, Value>;

/// Render a metadata value to its display string.
///
/// Nulls render empty (the caller drops empty-valued tags), strings render
/// unquoted, everything else falls back to compact JSON.
pub fn render_tag_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Current wall-clock time as whole unix seconds.
pub fn unix_now_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
