//! Anomalies, forecasts, recommendations, alerts, budgets and service breakdowns

use super::costs::CostLineItem;
use super::round_to;
use serde::{Deserialize, Serialize};

/// Alert and anomaly severity buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Warning,
    Medium,
    Low,
}

/// Effort and impact rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: String,
    pub service: String,
    pub category: String,
    pub expected_cost: f64,
    pub actual_cost: f64,
    pub deviation_percent: f64,
    pub severity: Severity,
    pub detected_at: String,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: String,
    pub cost: f64,
    /// `actual` or `forecast`
    #[serde(rename = "type")]
    pub kind: String,
    pub cost_low: f64,
    pub cost_high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecast_data: Vec<ForecastPoint>,
    pub current_mtd: f64,
    pub projected_eom: f64,
    pub daily_average: f64,
    pub trend: Trend,
    /// 0 to 1
    pub confidence: f64,
}

impl Forecast {
    /// Forecast with no projection, only the current month-to-date spend
    pub fn empty(current_mtd: f64) -> Self {
        Self {
            forecast_data: Vec::new(),
            current_mtd,
            projected_eom: 0.0,
            daily_average: 0.0,
            trend: Trend::Stable,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub potential_savings_monthly: f64,
    pub potential_savings_yearly: f64,
    pub effort: Level,
    pub impact: Level,
    pub category: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub acknowledged: bool,
    /// ISO-8601, compared lexicographically when merging
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetKind {
    Overall,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    AtRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BudgetKind,
    pub budget_amount: f64,
    pub spent_amount: f64,
    pub remaining_amount: f64,
    pub utilization_percent: f64,
    pub projected_eom: f64,
    pub projected_utilization: f64,
    pub period: String,
    pub start_date: String,
    pub end_date: String,
    pub status: BudgetStatus,
}

/// Services grouped under one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub total_cost: f64,
    pub service_count: usize,
    pub services: Vec<CostLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicesBreakdown {
    pub breakdown: Vec<CategoryBreakdown>,
    pub total_cost: f64,
    pub total_services: usize,
    pub category_count: usize,
}

impl ServicesBreakdown {
    pub fn empty() -> Self {
        Self {
            breakdown: Vec::new(),
            total_cost: 0.0,
            total_services: 0,
            category_count: 0,
        }
    }

    /// Group items by category (missing category becomes `Other`), costliest category first
    pub fn from_items(items: &[CostLineItem]) -> Self {
        let mut categories: Vec<CategoryBreakdown> = Vec::new();

        for item in items {
            let name = item.category.as_deref().unwrap_or("Other");
            let position = match categories.iter().position(|c| c.category == name) {
                Some(position) => position,
                None => {
                    categories.push(CategoryBreakdown {
                        category: name.to_string(),
                        total_cost: 0.0,
                        service_count: 0,
                        services: Vec::new(),
                    });
                    categories.len() - 1
                }
            };

            let category = &mut categories[position];
            category.total_cost += item.cost;
            category.service_count += 1;
            category.services.push(item.clone());
        }

        for category in &mut categories {
            category.total_cost = round_to(category.total_cost, 2);
        }
        categories.sort_by(|a, b| b.total_cost.total_cmp(&a.total_cost));

        Self {
            total_cost: round_to(categories.iter().map(|c| c.total_cost).sum(), 2),
            total_services: categories.iter().map(|c| c.service_count).sum(),
            category_count: categories.len(),
            breakdown: categories,
        }
    }
}
