//! Live metric snapshots and timeseries

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Near-real-time compute aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub updated_at: DateTime<Utc>,
    pub cpu_percent: f64,
    pub instances_monitored: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_in_mbps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_out_mbps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MetricSnapshot {
    pub fn new(cpu_percent: f64, instances_monitored: u32) -> Self {
        Self {
            updated_at: Utc::now(),
            cpu_percent,
            instances_monitored,
            memory_percent: None,
            network_in_mbps: None,
            network_out_mbps: None,
            error: None,
            message: None,
        }
    }

    /// Zeroed snapshot carrying an error marker
    pub fn failed(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(0.0, 0)
        }
    }

    /// Zeroed snapshot for adapters without live metrics
    pub fn placeholder(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(0.0, 0)
        }
    }
}

/// Key under which a metric's values are published
pub fn values_key(metric: &str) -> &'static str {
    match metric {
        "cpu" => "cpu_percent",
        "memory" => "memory_percent",
        _ => "values",
    }
}

/// Ordered `(timestamp, value)` series
///
/// Timestamps and values always have equal length, including on error paths.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesSeries {
    metric: String,
    timestamps: Vec<String>,
    values: Vec<f64>,
    error: Option<String>,
    message: Option<String>,
}

impl TimeseriesSeries {
    /// Build a series from points, sorting them by timestamp
    pub fn from_points<I>(metric: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        let mut points: Vec<_> = points.into_iter().collect();
        points.sort_by_key(|(ts, _)| *ts);

        let (timestamps, values) = points
            .into_iter()
            .map(|(ts, value)| (ts.to_rfc3339_opts(SecondsFormat::Secs, true), value))
            .unzip();

        Self {
            metric: metric.into(),
            timestamps,
            values,
            error: None,
            message: None,
        }
    }

    pub fn empty(metric: impl Into<String>) -> Self {
        Self::from_points(metric, std::iter::empty())
    }

    pub fn failed(metric: impl Into<String>, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::empty(metric)
        }
    }

    pub fn not_implemented(metric: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty(metric)
        }
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn timestamps(&self) -> &[String] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for TimeseriesSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.error.is_some()) + usize::from(self.message.is_some());
        let mut map = serializer.serialize_map(Some(2 + extra))?;
        map.serialize_entry("ts", &self.timestamps)?;
        map.serialize_entry(values_key(&self.metric), &self.values)?;
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        if let Some(message) = &self.message {
            map.serialize_entry("message", message)?;
        }
        map.end()
    }
}
