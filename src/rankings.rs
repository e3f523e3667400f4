//! Per-user ranked tables.

use std::cmp::Ordering;

use crate::config::{REPORT_MONTHS, TABLE_LIMIT};
use crate::models::{DowngradeCandidate, LowEngagement, TopUser, UsageRecord, ZeroUsage};
use crate::stats;

pub fn top_users(records: &[UsageRecord]) -> Vec<TopUser> {
    let mut ranked: Vec<&UsageRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.total_interactions().cmp(&a.total_interactions()));

    ranked
        .into_iter()
        .take(TABLE_LIMIT)
        .map(|record| TopUser {
            user: record.name.clone(),
            downloads: record.downloads,
            calls: record.calls,
            conferences: record.conferences,
            total_interactions: record.total_interactions(),
            monthly_avg: stats::round_to(record.total_interactions() as f64 / REPORT_MONTHS, 1),
        })
        .collect()
}

pub fn low_engagement(records: &[UsageRecord]) -> Vec<LowEngagement> {
    let mut ranked: Vec<&UsageRecord> = records.iter().collect();
    ranked.sort_by_key(|record| record.total_interactions());

    ranked
        .into_iter()
        .take(TABLE_LIMIT)
        .map(|record| LowEngagement {
            name: record.name.clone(),
            account_type: record.account_type.clone(),
            total_interactions: record.total_interactions(),
        })
        .collect()
}

/// Seats with no recorded activity, in sheet order.
pub fn zero_usage(records: &[UsageRecord]) -> Vec<ZeroUsage> {
    records
        .iter()
        .filter(|record| record.total_interactions() == 0)
        .take(TABLE_LIMIT)
        .map(|record| ZeroUsage {
            name: record.name.clone(),
            account_type: record.account_type.clone(),
            cost_3y: record.cost_3y,
        })
        .collect()
}

pub fn cost_per_interaction(cost: f64, interactions: u64) -> f64 {
    if interactions == 0 {
        return f64::INFINITY;
    }
    cost / interactions as f64
}

/// Most expensive seats per interaction among the least active quarter of
/// users that did anything at all.
pub fn downgrade_candidates(records: &[UsageRecord]) -> Vec<DowngradeCandidate> {
    let active: Vec<&UsageRecord> = records
        .iter()
        .filter(|record| record.total_interactions() > 0)
        .collect();
    let totals: Vec<u64> = active.iter().map(|record| record.total_interactions()).collect();
    let Some(threshold) = stats::quantile(&totals, 0.25) else {
        return Vec::new();
    };

    let mut candidates: Vec<DowngradeCandidate> = active
        .into_iter()
        .filter(|record| record.total_interactions() as f64 <= threshold)
        .map(|record| DowngradeCandidate {
            name: record.name.clone(),
            account_type: record.account_type.clone(),
            total_interactions: record.total_interactions(),
            cost_per_interaction: cost_per_interaction(
                record.cost_3y,
                record.total_interactions(),
            ),
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.cost_per_interaction
            .partial_cmp(&a.cost_per_interaction)
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(TABLE_LIMIT);
    candidates
}
