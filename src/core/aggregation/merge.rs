//! Cross-provider merge rules

use crate::core::types::{
    Alert, AlertSummary, Anomaly, Budget, BudgetKind, BudgetStatus, BudgetSummary, Recommendation,
    RecommendationSummary, Severity, SeverityCounts, Tagged, round_to,
};

/// Largest deviation first
pub fn merge_anomalies(mut anomalies: Vec<Tagged<Anomaly>>) -> Vec<Tagged<Anomaly>> {
    anomalies.sort_by(|a, b| {
        b.item
            .deviation_percent
            .total_cmp(&a.item.deviation_percent)
    });
    anomalies
}

pub fn merge_recommendations(
    mut recommendations: Vec<Tagged<Recommendation>>,
) -> RecommendationSummary {
    let total: f64 = recommendations
        .iter()
        .map(|r| r.item.potential_savings_monthly)
        .sum();

    recommendations.sort_by(|a, b| {
        b.item
            .potential_savings_monthly
            .total_cmp(&a.item.potential_savings_monthly)
    });

    RecommendationSummary {
        recommendation_count: recommendations.len(),
        recommendations,
        total_potential_savings_monthly: round_to(total, 2),
        total_potential_savings_yearly: round_to(total * 12.0, 2),
    }
}

/// Newest first; ISO-8601 timestamps compare correctly as strings
pub fn merge_alerts(mut alerts: Vec<Tagged<Alert>>) -> AlertSummary {
    alerts.sort_by(|a, b| b.item.created_at.cmp(&a.item.created_at));

    let mut severity_counts = SeverityCounts::default();
    for alert in &alerts {
        let bucket = match alert.item.severity {
            Severity::Critical => &mut severity_counts.critical,
            Severity::High => &mut severity_counts.high,
            Severity::Warning => &mut severity_counts.warning,
            Severity::Medium => &mut severity_counts.medium,
            Severity::Low => &mut severity_counts.low,
        };
        *bucket += 1;
    }

    AlertSummary {
        total_count: alerts.len(),
        unacknowledged_count: alerts.iter().filter(|a| !a.item.acknowledged).count(),
        severity_counts,
        alerts,
    }
}

/// Totals come from `overall` budgets only; category budgets would double count
pub fn merge_budgets(budgets: Vec<Tagged<Budget>>) -> BudgetSummary {
    let (total_budget, total_spent) = budgets
        .iter()
        .filter(|b| b.item.kind == BudgetKind::Overall)
        .fold((0.0, 0.0), |(budget, spent), b| {
            (budget + b.item.budget_amount, spent + b.item.spent_amount)
        });

    let overall_utilization = if total_budget > 0.0 {
        round_to(total_spent / total_budget * 100.0, 1)
    } else {
        0.0
    };

    BudgetSummary {
        at_risk_count: budgets
            .iter()
            .filter(|b| b.item.status == BudgetStatus::AtRisk)
            .count(),
        budgets,
        total_budget: round_to(total_budget, 2),
        total_spent: round_to(total_spent, 2),
        total_remaining: round_to(total_budget - total_spent, 2),
        overall_utilization,
    }
}
