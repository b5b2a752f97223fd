//! Declarative metric definitions.
//!
//! A definition describes one derived time series: which event feeds it,
//! how to pull a numeric value out of that event, which unit the value is
//! converted to, and which metadata keys become series labels.

use crate::core::{render_tag_value, LabelMap, Measurements, Metadata};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How the derived series is aggregated by the storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Number of event occurrences
    Counter,
    /// Running sum of the extracted values
    Sum,
    /// Most recent extracted value
    LastValue,
    /// Statistical summary of the extracted values
    Summary,
    /// Value distribution over histogram buckets
    Distribution,
}

/// Metric type understood by the storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMetricType {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    /// Map the definition kind onto the backend's metric type.
    pub fn storage_type(&self) -> StorageMetricType {
        match self {
            MetricKind::Counter | MetricKind::Sum => StorageMetricType::Counter,
            MetricKind::LastValue | MetricKind::Summary => StorageMetricType::Gauge,
            MetricKind::Distribution => StorageMetricType::Histogram,
        }
    }
}

/// Measurement units understood by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Ticks of the platform's native monotonic clock
    Native,
    Second,
    Millisecond,
    Microsecond,
    Byte,
    Kilobyte,
    Megabyte,
    Gigabyte,
}

impl Unit {
    /// Declare a conversion from this unit into `to`.
    pub fn to(self, to: Unit) -> UnitSpec {
        UnitSpec::Convert { from: self, to }
    }

    /// Symbol registered with the backend as metric metadata.
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Native => "native",
            Unit::Second => "second",
            Unit::Millisecond => "millisecond",
            Unit::Microsecond => "microsecond",
            Unit::Byte => "byte",
            Unit::Kilobyte => "kilobyte",
            Unit::Megabyte => "megabyte",
            Unit::Gigabyte => "gigabyte",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Unit declaration on a metric definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSpec {
    /// No unit declared
    None,
    /// A bare unit symbol, recorded as metadata but not converted
    Bare(Unit),
    /// Convert every extracted value from one unit into another
    Convert { from: Unit, to: Unit },
}

impl UnitSpec {
    /// The unit values are stored in (after any conversion), if declared.
    pub fn stored_unit(&self) -> Option<Unit> {
        match self {
            UnitSpec::None => None,
            UnitSpec::Bare(unit) => Some(*unit),
            UnitSpec::Convert { to, .. } => Some(*to),
        }
    }
}

type ExtractFn = Arc<dyn Fn(&Measurements, &Metadata) -> Option<f64> + Send + Sync>;
type TagValuesFn = Arc<dyn Fn(&Metadata) -> Metadata + Send + Sync>;
type KeepFn = Arc<dyn Fn(&Metadata) -> bool + Send + Sync>;

/// Where a definition's numeric value comes from.
#[derive(Clone)]
pub enum ValueSource {
    /// Look up a measurement key; a missing key skips the event
    Measurement(String),
    /// Arbitrary function of measurements and metadata
    Computed(ExtractFn),
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Measurement(key) => write!(f, "Measurement({:?})", key),
            ValueSource::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

/// Declarative description of one derived time series.
///
/// Immutable after construction; the reporter holds definitions behind
/// `Arc` and never mutates them. Multiple definitions may share an event
/// name (fan-out) or a metric name (e.g. a summary and a counter over the
/// same measurement).
#[derive(Clone)]
pub struct MetricDefinition {
    kind: MetricKind,
    event_name: String,
    name: Vec<String>,
    value: ValueSource,
    unit: UnitSpec,
    tags: Vec<String>,
    tag_values: Option<TagValuesFn>,
    keep: Option<KeepFn>,
    description: Option<String>,
}

impl fmt::Debug for MetricDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricDefinition")
            .field("kind", &self.kind)
            .field("event_name", &self.event_name)
            .field("name", &self.name)
            .field("value", &self.value)
            .field("unit", &self.unit)
            .field("tags", &self.tags)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl MetricDefinition {
    /// Create a definition from a dotted metric name.
    ///
    /// By convention the trailing segment names the measurement and the
    /// leading segments name the source event, so `"http.request.duration"`
    /// subscribes to `http.request` and extracts the `duration`
    /// measurement. Both defaults can be overridden with [`event`] and
    /// [`measurement`]/[`value_with`].
    ///
    /// [`event`]: MetricDefinition::event
    /// [`measurement`]: MetricDefinition::measurement
    /// [`value_with`]: MetricDefinition::value_with
    pub fn new(kind: MetricKind, dotted_name: &str) -> Self {
        let name: Vec<String> = dotted_name
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let (event_name, measurement) = match name.as_slice() {
            [] => (String::new(), String::new()),
            [only] => (only.clone(), only.clone()),
            [event @ .., last] => (event.join("."), last.clone()),
        };

        Self {
            kind,
            event_name,
            name,
            value: ValueSource::Measurement(measurement),
            unit: UnitSpec::None,
            tags: Vec::new(),
            tag_values: None,
            keep: None,
            description: None,
        }
    }

    /// Shorthand for a counter definition.
    pub fn counter(dotted_name: &str) -> Self {
        Self::new(MetricKind::Counter, dotted_name)
    }

    /// Shorthand for a sum definition.
    pub fn sum(dotted_name: &str) -> Self {
        Self::new(MetricKind::Sum, dotted_name)
    }

    /// Shorthand for a last-value definition.
    pub fn last_value(dotted_name: &str) -> Self {
        Self::new(MetricKind::LastValue, dotted_name)
    }

    /// Shorthand for a summary definition.
    pub fn summary(dotted_name: &str) -> Self {
        Self::new(MetricKind::Summary, dotted_name)
    }

    /// Shorthand for a distribution definition.
    pub fn distribution(dotted_name: &str) -> Self {
        Self::new(MetricKind::Distribution, dotted_name)
    }

    /// Override the source event name.
    pub fn event(mut self, event_name: &str) -> Self {
        self.event_name = event_name.to_string();
        self
    }

    /// Extract the value from a specific measurement key.
    pub fn measurement(mut self, key: &str) -> Self {
        self.value = ValueSource::Measurement(key.to_string());
        self
    }

    /// Extract the value with an arbitrary function of measurements and
    /// metadata; returning `None` skips the event for this definition.
    pub fn value_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Measurements, &Metadata) -> Option<f64> + Send + Sync + 'static,
    {
        self.value = ValueSource::Computed(Arc::new(f));
        self
    }

    /// Declare the measurement unit (bare or conversion pair).
    pub fn unit(mut self, unit: UnitSpec) -> Self {
        self.unit = unit;
        self
    }

    /// Declare the ordered set of label keys extracted from metadata.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Derive the tag source map from metadata instead of using metadata
    /// directly.
    pub fn tag_values<F>(mut self, f: F) -> Self
    where
        F: Fn(&Metadata) -> Metadata + Send + Sync + 'static,
    {
        self.tag_values = Some(Arc::new(f));
        self
    }

    /// Discard events failing this predicate, for this definition only.
    pub fn keep<F>(mut self, f: F) -> Self
    where
        F: Fn(&Metadata) -> bool + Send + Sync + 'static,
    {
        self.keep = Some(Arc::new(f));
        self
    }

    /// Attach a free-text description, registered with the backend.
    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// The aggregation kind.
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// The source event name.
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// The ordered name segments.
    pub fn name(&self) -> &[String] {
        &self.name
    }

    /// The declared unit.
    pub fn unit_spec(&self) -> &UnitSpec {
        &self.unit
    }

    /// The declared label keys, in order.
    pub fn tag_keys(&self) -> &[String] {
        &self.tags
    }

    /// The description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Full metric name as stored: prefix plus dot-joined segments.
    pub fn storage_name(&self, prefix: &str) -> String {
        if prefix.is_empty() {
            self.name.join(".")
        } else {
            format!("{}.{}", prefix, self.name.join("."))
        }
    }

    /// Evaluate the keep predicate; absent means keep everything.
    pub fn keeps(&self, metadata: &Metadata) -> bool {
        match &self.keep {
            Some(keep) => keep(metadata),
            None => true,
        }
    }

    /// Extract the raw (pre-conversion) value for one event occurrence.
    pub fn extract(&self, measurements: &Measurements, metadata: &Metadata) -> Option<f64> {
        match &self.value {
            ValueSource::Measurement(key) => measurements.get(key).copied(),
            ValueSource::Computed(f) => f(measurements, metadata),
        }
    }

    /// Project event metadata onto the declared tags.
    ///
    /// Tag values are rendered to strings; tags that render empty are
    /// dropped so they never produce a distinct series.
    pub fn label_map(&self, metadata: &Metadata) -> LabelMap {
        let source = self.tag_values.as_ref().map(|f| f(metadata));
        let source = source.as_ref().unwrap_or(metadata);

        let mut labels = LabelMap::new();
        for tag in &self.tags {
            if let Some(value) = source.get(tag) {
                let rendered = render_tag_value(value);
                if !rendered.is_empty() {
                    labels.insert(tag.clone(), rendered);
                }
            }
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_and_measurement_derivation() {
        let def = MetricDefinition::summary("http.request.duration");
        assert_eq!(def.event_name(), "http.request");
        assert_eq!(def.name(), &["http", "request", "duration"]);

        let mut measurements = Measurements::new();
        measurements.insert("duration".into(), 12.5);
        assert_eq!(def.extract(&measurements, &Metadata::new()), Some(12.5));
    }

    #[test]
    fn test_event_override() {
        let def = MetricDefinition::counter("requests.total").event("http.request.stop");
        assert_eq!(def.event_name(), "http.request.stop");
        assert_eq!(def.storage_name("app"), "app.requests.total");
    }

    #[test]
    fn test_storage_name_without_prefix() {
        let def = MetricDefinition::counter("vm.memory.total");
        assert_eq!(def.storage_name(""), "vm.memory.total");
    }

    #[test]
    fn test_kind_storage_type_mapping() {
        assert_eq!(MetricKind::Counter.storage_type(), StorageMetricType::Counter);
        assert_eq!(MetricKind::Sum.storage_type(), StorageMetricType::Counter);
        assert_eq!(MetricKind::LastValue.storage_type(), StorageMetricType::Gauge);
        assert_eq!(MetricKind::Summary.storage_type(), StorageMetricType::Gauge);
        assert_eq!(MetricKind::Distribution.storage_type(), StorageMetricType::Histogram);
    }

    #[test]
    fn test_missing_measurement_yields_no_value() {
        let def = MetricDefinition::summary("db.query.duration");
        assert_eq!(def.extract(&Measurements::new(), &Metadata::new()), None);
    }

    #[test]
    fn test_computed_value() {
        let def = MetricDefinition::sum("queue.depth.delta")
            .value_with(|m, _| Some(m.get("in")? - m.get("out")?));

        let mut measurements = Measurements::new();
        measurements.insert("in".into(), 10.0);
        measurements.insert("out".into(), 4.0);
        assert_eq!(def.extract(&measurements, &Metadata::new()), Some(6.0));
    }

    #[test]
    fn test_label_projection_drops_empty_and_unknown() {
        let def = MetricDefinition::counter("http.request.count").tags(["method", "status", "host"]);

        let mut metadata = Metadata::new();
        metadata.insert("method".into(), json!("GET"));
        metadata.insert("status".into(), json!(""));
        metadata.insert("path".into(), json!("/ignored"));

        let labels = def.label_map(&metadata);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("method").map(String::as_str), Some("GET"));
    }

    #[test]
    fn test_tag_values_override() {
        let def = MetricDefinition::counter("http.request.count")
            .tags(["status_class"])
            .tag_values(|meta| {
                let mut derived = Metadata::new();
                if let Some(status) = meta.get("status").and_then(|v| v.as_i64()) {
                    derived.insert("status_class".into(), json!(format!("{}xx", status / 100)));
                }
                derived
            });

        let mut metadata = Metadata::new();
        metadata.insert("status".into(), json!(503));

        let labels = def.label_map(&metadata);
        assert_eq!(labels.get("status_class").map(String::as_str), Some("5xx"));
    }

    #[test]
    fn test_keep_predicate_default_is_keep() {
        let def = MetricDefinition::counter("a.b");
        assert!(def.keeps(&Metadata::new()));

        let filtered = MetricDefinition::counter("a.b")
            .keep(|meta| meta.get("route").map(|r| r != "/health").unwrap_or(true));
        let mut metadata = Metadata::new();
        metadata.insert("route".into(), json!("/health"));
        assert!(!filtered.keeps(&metadata));
    }

    #[test]
    fn test_unit_stored_unit() {
        assert_eq!(UnitSpec::None.stored_unit(), None);
        assert_eq!(UnitSpec::Bare(Unit::Byte).stored_unit(), Some(Unit::Byte));
        assert_eq!(
            Unit::Native.to(Unit::Millisecond).stored_unit(),
            Some(Unit::Millisecond)
        );
    }
}
