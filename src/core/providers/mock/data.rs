//! Synthetic dataset generators
//!
//! Pure functions over an injected RNG and clock so tests can seed them.

use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::providers::{ProviderError, ProviderResult};
use crate::core::providers::shared::{
    check_window, days_in_month, month_end, month_start, shift_days, trailing_window,
};
use crate::core::types::{
    Alert, Anomaly, Budget, BudgetKind, BudgetStatus, CostLineItem, DailyCostPoint, Forecast,
    ForecastPoint, Level, MetricSnapshot, Recommendation, Severity, Trend, round_to,
    sort_by_cost_desc,
};

pub struct BaseService {
    pub service: &'static str,
    pub project: &'static str,
    pub category: &'static str,
    pub cost: f64,
}

pub const BASE_SERVICES: [BaseService; 5] = [
    BaseService {
        service: "Compute Engine",
        project: "my-project",
        category: "Compute",
        cost: 1250.45,
    },
    BaseService {
        service: "Cloud Storage",
        project: "my-project",
        category: "Storage",
        cost: 450.30,
    },
    BaseService {
        service: "BigQuery",
        project: "analytics",
        category: "Analytics",
        cost: 890.75,
    },
    BaseService {
        service: "Cloud SQL",
        project: "database",
        category: "Database",
        cost: 675.20,
    },
    BaseService {
        service: "Kubernetes Engine",
        project: "k8s-prod",
        category: "Containers",
        cost: 2100.00,
    },
];

/// Monthly budget per category, plus the overall cap
const CATEGORY_BUDGETS: [(&str, f64); 5] = [
    ("Compute", 1500.0),
    ("Storage", 600.0),
    ("Analytics", 1000.0),
    ("Database", 800.0),
    ("Containers", 2500.0),
];
const OVERALL_BUDGET: f64 = 6000.0;

const PROVIDER: &str = "mock";

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Base services jittered by ±10%, costliest first
pub fn month_to_date_items<R: Rng>(rng: &mut R) -> Vec<CostLineItem> {
    let mut items: Vec<_> = BASE_SERVICES
        .iter()
        .map(|base| {
            let cost = round_to(base.cost * rng.gen_range(0.9..=1.1), 2);
            CostLineItem::new(base.service, cost)
                .with_project(base.project)
                .with_category(base.category)
        })
        .collect();
    sort_by_cost_desc(&mut items);
    items
}

/// One point per day ending `today`, oldest first
pub fn daily_costs<R: Rng>(
    rng: &mut R,
    days: u32,
    today: NaiveDate,
) -> ProviderResult<Vec<DailyCostPoint>> {
    if days == 0 {
        return Ok(Vec::new());
    }
    let (start, _) = trailing_window(PROVIDER, today, days)?;
    Ok(start
        .iter_days()
        .take(days as usize)
        .map(|date| DailyCostPoint::new(date, round_to(150.0 + rng.gen_range(-50.0..100.0), 2)))
        .collect())
}

pub fn live_metrics<R: Rng>(rng: &mut R) -> MetricSnapshot {
    MetricSnapshot {
        memory_percent: Some(round_to(60.0 + rng.gen_range(-15.0..20.0), 1)),
        network_in_mbps: Some(round_to(25.5 + rng.gen_range(-10.0..15.0), 1)),
        network_out_mbps: Some(round_to(18.3 + rng.gen_range(-5.0..10.0), 1)),
        ..MetricSnapshot::new(round_to(45.0 + rng.gen_range(-20.0..30.0), 1), 12)
    }
}

/// `min(minutes, 60)` one-minute points ending at `now`
pub fn timeseries_points<R: Rng>(
    rng: &mut R,
    metric: &str,
    minutes: u32,
    now: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, f64)> {
    let count = minutes.min(60);
    let base = if metric == "cpu" { 50.0 } else { 100.0 };
    (0..count)
        .map(|i| {
            let ts = now - Duration::minutes(i64::from(count - i - 1));
            (ts, round_to(base + rng.gen_range(-20.0..20.0), 1))
        })
        .collect()
}

fn anomaly_severity(deviation: f64) -> Severity {
    match deviation {
        d if d >= 70.0 => Severity::Critical,
        d if d >= 50.0 => Severity::High,
        d if d >= 35.0 => Severity::Medium,
        _ => Severity::Low,
    }
}

/// Two anomalies on randomly chosen services
pub fn anomalies<R: Rng>(
    rng: &mut R,
    provider: &str,
    items: &[CostLineItem],
    now: DateTime<Utc>,
) -> Vec<Anomaly> {
    let picked: Vec<CostLineItem> = items.choose_multiple(rng, 2).cloned().collect();
    picked
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let deviation = round_to(rng.gen_range(25.0..80.0), 1);
            let expected = round_to(item.cost / (1.0 + deviation / 100.0), 2);
            let detected_at = now - Duration::hours(rng.gen_range(1..48));
            Anomaly {
                id: format!("{}-anomaly-{}", provider, idx + 1),
                category: item.category.clone().unwrap_or_else(|| "Other".to_string()),
                expected_cost: expected,
                actual_cost: item.cost,
                deviation_percent: deviation,
                severity: anomaly_severity(deviation),
                detected_at: iso(detected_at),
                description: format!(
                    "{} spend is {}% above the expected baseline",
                    item.service, deviation
                ),
                recommendation: format!("Review recent usage changes for {}", item.service),
                service: item.service,
            }
        })
        .collect()
}

/// Extrapolate the month-to-date daily average to the end of the month
pub fn forecast<R: Rng>(
    rng: &mut R,
    current_mtd: f64,
    days: u32,
    today: NaiveDate,
) -> ProviderResult<Forecast> {
    check_window(PROVIDER, days)?;
    let elapsed = f64::from(today.day());
    let remaining = f64::from(days_in_month(today) - today.day());
    let daily_average = round_to(current_mtd / elapsed, 2);
    let trend_factor: f64 = rng.gen_range(0.97..1.06);

    let forecast_data = (1..=days)
        .map(|offset| {
            let date = shift_days(today, i64::from(offset)).ok_or_else(|| {
                ProviderError::invalid_request(
                    PROVIDER,
                    format!("{} days after {} is out of range", offset, today),
                )
            })?;
            let cost = round_to(daily_average * trend_factor * rng.gen_range(0.95..1.05), 2);
            Ok(ForecastPoint {
                date: date.format("%Y-%m-%d").to_string(),
                cost,
                kind: "forecast".to_string(),
                cost_low: round_to(cost * 0.85, 2),
                cost_high: round_to(cost * 1.15, 2),
            })
        })
        .collect::<ProviderResult<Vec<_>>>()?;

    let trend = if trend_factor > 1.02 {
        Trend::Increasing
    } else if trend_factor < 0.99 {
        Trend::Decreasing
    } else {
        Trend::Stable
    };

    Ok(Forecast {
        forecast_data,
        current_mtd: round_to(current_mtd, 2),
        projected_eom: round_to(current_mtd + daily_average * trend_factor * remaining, 2),
        daily_average,
        trend,
        confidence: round_to(rng.gen_range(0.75..0.92), 2),
    })
}

struct RecommendationTemplate {
    kind: &'static str,
    title: &'static str,
    description: &'static str,
    monthly: f64,
    effort: Level,
    impact: Level,
    category: &'static str,
}

const RECOMMENDATIONS: [RecommendationTemplate; 4] = [
    RecommendationTemplate {
        kind: "rightsizing",
        title: "Rightsize underutilized Compute Engine instances",
        description: "Several instances averaged under 20% CPU over the last 14 days.",
        monthly: 320.0,
        effort: Level::Medium,
        impact: Level::High,
        category: "Compute",
    },
    RecommendationTemplate {
        kind: "commitment",
        title: "Purchase committed use discounts for Kubernetes Engine",
        description: "Steady node pool usage qualifies for a one-year commitment.",
        monthly: 410.0,
        effort: Level::Low,
        impact: Level::High,
        category: "Containers",
    },
    RecommendationTemplate {
        kind: "storage_class",
        title: "Move infrequently accessed Cloud Storage data to Nearline",
        description: "Objects older than 90 days are rarely read.",
        monthly: 85.0,
        effort: Level::Low,
        impact: Level::Medium,
        category: "Storage",
    },
    RecommendationTemplate {
        kind: "idle_resource",
        title: "Delete idle Cloud SQL replicas",
        description: "Read replicas served no connections in the last 7 days.",
        monthly: 150.0,
        effort: Level::Medium,
        impact: Level::Medium,
        category: "Database",
    },
];

pub fn recommendations<R: Rng>(
    rng: &mut R,
    provider: &str,
    now: DateTime<Utc>,
) -> Vec<Recommendation> {
    RECOMMENDATIONS
        .iter()
        .enumerate()
        .map(|(idx, template)| {
            let monthly = round_to(template.monthly * rng.gen_range(0.9..1.1), 2);
            Recommendation {
                id: format!("{}-rec-{}", provider, idx + 1),
                kind: template.kind.to_string(),
                title: template.title.to_string(),
                description: template.description.to_string(),
                potential_savings_monthly: monthly,
                potential_savings_yearly: round_to(monthly * 12.0, 2),
                effort: template.effort,
                impact: template.impact,
                category: template.category.to_string(),
                status: "open".to_string(),
                created_at: iso(now - Duration::days(idx as i64 + 1)),
            }
        })
        .collect()
}

fn budget(
    id: String,
    name: String,
    kind: BudgetKind,
    amount: f64,
    spent: f64,
    today: NaiveDate,
) -> Budget {
    let projected = round_to(
        spent / f64::from(today.day()) * f64::from(days_in_month(today)),
        2,
    );
    let projected_utilization = round_to(projected / amount * 100.0, 1);
    Budget {
        id,
        name,
        kind,
        budget_amount: amount,
        spent_amount: round_to(spent, 2),
        remaining_amount: round_to(amount - spent, 2),
        utilization_percent: round_to(spent / amount * 100.0, 1),
        projected_eom: projected,
        projected_utilization,
        period: "monthly".to_string(),
        start_date: month_start(today).format("%Y-%m-%d").to_string(),
        end_date: month_end(today).format("%Y-%m-%d").to_string(),
        status: if projected_utilization > 100.0 {
            BudgetStatus::AtRisk
        } else {
            BudgetStatus::OnTrack
        },
    }
}

/// One overall budget followed by one budget per category
pub fn budgets(provider: &str, items: &[CostLineItem], today: NaiveDate) -> Vec<Budget> {
    let total: f64 = items.iter().map(|item| item.cost).sum();
    let mut budgets = vec![budget(
        format!("{}-budget-overall", provider),
        "Monthly cloud spend".to_string(),
        BudgetKind::Overall,
        OVERALL_BUDGET,
        total,
        today,
    )];

    for (category, amount) in CATEGORY_BUDGETS {
        let spent: f64 = items
            .iter()
            .filter(|item| item.category.as_deref() == Some(category))
            .map(|item| item.cost)
            .sum();
        budgets.push(budget(
            format!("{}-budget-{}", provider, category.to_lowercase()),
            format!("{} budget", category),
            BudgetKind::Category,
            amount,
            spent,
            today,
        ));
    }
    budgets
}

/// Alerts for every anomaly and every at-risk budget, plus an informational report notice
pub fn alerts(anomalies: &[Anomaly], budgets: &[Budget], now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = anomalies
        .iter()
        .map(|anomaly| Alert {
            id: format!("alert-{}", anomaly.id),
            kind: "anomaly".to_string(),
            title: format!("Cost anomaly: {}", anomaly.service),
            message: anomaly.description.clone(),
            severity: anomaly.severity,
            acknowledged: false,
            created_at: anomaly.detected_at.clone(),
        })
        .collect();

    alerts.extend(
        budgets
            .iter()
            .filter(|budget| budget.status == BudgetStatus::AtRisk)
            .map(|budget| Alert {
                id: format!("alert-{}", budget.id),
                kind: "budget".to_string(),
                title: format!("Budget at risk: {}", budget.name),
                message: format!(
                    "Projected spend is {}% of the {} budget",
                    budget.projected_utilization, budget.budget_amount
                ),
                severity: if budget.projected_utilization >= 120.0 {
                    Severity::Critical
                } else {
                    Severity::Warning
                },
                acknowledged: false,
                created_at: iso(now),
            }),
    );

    alerts.push(Alert {
        id: "alert-monthly-report".to_string(),
        kind: "report".to_string(),
        title: "Monthly cost report available".to_string(),
        message: "Last month's cost report is ready to review.".to_string(),
        severity: Severity::Low,
        acknowledged: true,
        created_at: iso(now - Duration::days(3)),
    });

    alerts
}
