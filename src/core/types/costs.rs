//! Cost records and the swallow-as-data operation outcome

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

/// One service's cost within a query window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLineItem {
    pub service: String,
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CostLineItem {
    pub fn new(service: impl Into<String>, cost: f64) -> Self {
        Self {
            service: service.into(),
            cost,
            project: None,
            category: None,
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Sort cost items most expensive first
pub fn sort_by_cost_desc(items: &mut [CostLineItem]) {
    items.sort_by(|a, b| b.cost.total_cmp(&a.cost));
}

/// Cost for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCostPoint {
    /// Always `YYYY-MM-DD`
    pub date: String,
    pub cost: f64,
}

impl DailyCostPoint {
    pub fn new(date: NaiveDate, cost: f64) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            cost,
        }
    }

    /// Build a point from a vendor date representation, if it can be understood
    pub fn from_raw(raw: &str, cost: f64) -> Option<Self> {
        normalize_date(raw).map(|date| Self { date, cost })
    }
}

/// Normalize vendor date and datetime representations to `YYYY-MM-DD`
///
/// Accepts `2024-01-05`, `20240105`, RFC 3339 timestamps and naive `2024-01-05T10:00:00`.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })?;

    Some(date.format("%Y-%m-%d").to_string())
}

/// Inline error marker returned in place of data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationFailure {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of an adapter operation that never propagates failures
///
/// A failed list operation serializes as `[{"error": ...}]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Data(T),
    Failed(OperationFailure),
}

impl<T> Outcome<T> {
    pub fn failed(error: impl ToString) -> Self {
        Self::Failed(OperationFailure {
            error: error.to_string(),
            message: None,
        })
    }

    pub fn failed_with_message(error: impl ToString, message: impl Into<String>) -> Self {
        Self::Failed(OperationFailure {
            error: error.to_string(),
            message: Some(message.into()),
        })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Data(data) => Some(data),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Data(_) => None,
            Self::Failed(failure) => Some(&failure.error),
        }
    }
}

impl<T> From<Result<T, crate::core::providers::ProviderError>> for Outcome<T> {
    fn from(result: Result<T, crate::core::providers::ProviderError>) -> Self {
        match result {
            Ok(data) => Self::Data(data),
            Err(e) => Self::failed(e),
        }
    }
}

impl<T: Serialize> Serialize for Outcome<Vec<T>> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Data(items) => items.serialize(serializer),
            Outcome::Failed(failure) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(failure)?;
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date_variants() {
        assert_eq!(normalize_date("2024-01-05").as_deref(), Some("2024-01-05"));
        assert_eq!(normalize_date("20240105").as_deref(), Some("2024-01-05"));
        assert_eq!(
            normalize_date("2024-01-05T13:45:00Z").as_deref(),
            Some("2024-01-05")
        );
        assert_eq!(
            normalize_date("2024-01-05T13:45:00").as_deref(),
            Some("2024-01-05")
        );
        assert!(normalize_date("yesterday").is_none());
    }

    #[test]
    fn test_failed_outcome_serializes_as_error_list() {
        let outcome: Outcome<Vec<CostLineItem>> = Outcome::failed("access denied");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!([{"error": "access denied"}]));
    }

    #[test]
    fn test_data_outcome_serializes_as_plain_list() {
        let outcome = Outcome::Data(vec![CostLineItem::new("EC2", 12.5).with_category("Compute")]);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"service": "EC2", "cost": 12.5, "category": "Compute"}])
        );
    }

    #[test]
    fn test_sort_by_cost_desc() {
        let mut items = vec![
            CostLineItem::new("a", 1.0),
            CostLineItem::new("b", 3.0),
            CostLineItem::new("c", 2.0),
        ];
        sort_by_cost_desc(&mut items);
        let order: Vec<_> = items.iter().map(|i| i.service.as_str()).collect();
        assert_eq!(order, ["b", "c", "a"]);
    }
}
