use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{TeamRisk, UsageRecord};
use crate::stats;

pub const ZERO_RATE_WEIGHT: f64 = 0.6;
pub const LOW_RATE_WEIGHT: f64 = 0.4;
pub const UNSPECIFIED_TEAM: &str = "Unspecified";
pub const TEAM_RISK_HEADERS: [&str; 9] = [
    "Team",
    "Users",
    "ZeroUsage",
    "LowUtil",
    "ZeroRate",
    "LowRate",
    "AvgInteractions",
    "TotalCost3Y",
    "RiskScore",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Risk,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Warn => "warn",
            Status::Risk => "risk",
        }
    }
}

/// Share of the contract value already consumed; higher is worse.
pub fn apv_status(percent: Option<f64>) -> Status {
    match percent {
        Some(value) if value >= 80.0 => Status::Risk,
        Some(value) if value >= 60.0 => Status::Warn,
        _ => Status::Ok,
    }
}

/// Mean survey rating on a five-point scale; lower is worse.
pub fn survey_status(rating: Option<f64>) -> Status {
    match rating {
        Some(value) if value >= 4.0 => Status::Ok,
        Some(value) if value >= 3.0 => Status::Warn,
        Some(value) if value.is_finite() => Status::Risk,
        _ => Status::Ok,
    }
}

pub fn risk_score(zero_rate: f64, low_rate: f64) -> f64 {
    stats::round_to(ZERO_RATE_WEIGHT * zero_rate + LOW_RATE_WEIGHT * low_rate, 3)
}

/// Groups users by team and scores each team on idle and low-usage seats.
///
/// "Low" is measured against the q25 of the whole population, not of the
/// team. Records without a team are grouped as [`UNSPECIFIED_TEAM`]. Pass
/// `grouped = false` when the sheet has no team column at all.
pub fn score_teams(records: &[UsageRecord], grouped: bool) -> Vec<TeamRisk> {
    if !grouped {
        return Vec::new();
    }

    let totals: Vec<u64> = records.iter().map(|record| record.total_interactions()).collect();
    let threshold = stats::quantile(&totals, 0.25);

    let mut teams: BTreeMap<Option<&str>, Vec<&UsageRecord>> = BTreeMap::new();
    for record in records {
        teams.entry(record.team.as_deref()).or_default().push(record);
    }

    // BTreeMap orders `None` first; unassigned users go last.
    let (unassigned, named): (Vec<_>, Vec<_>) =
        teams.into_iter().partition(|(team, _)| team.is_none());

    let mut rows: Vec<TeamRisk> = named
        .into_iter()
        .chain(unassigned)
        .map(|(team, members)| {
            summarize_team(team.unwrap_or(UNSPECIFIED_TEAM), &members, threshold)
        })
        .collect();

    rows.sort_by(|a, b| {
        (b.risk_score, b.zero_rate, b.low_rate)
            .partial_cmp(&(a.risk_score, a.zero_rate, a.low_rate))
            .unwrap_or(Ordering::Equal)
    });
    rows
}

fn summarize_team(team: &str, members: &[&UsageRecord], threshold: Option<f64>) -> TeamRisk {
    let users = members.len();
    let zero_usage = members
        .iter()
        .filter(|record| record.total_interactions() == 0)
        .count();
    let low_util = match threshold {
        Some(threshold) => members
            .iter()
            .filter(|record| record.total_interactions() as f64 <= threshold)
            .count(),
        None => 0,
    };
    let interactions: Vec<f64> = members
        .iter()
        .map(|record| record.total_interactions() as f64)
        .collect();
    let total_cost: f64 = members.iter().map(|record| record.cost_3y).sum();

    let rate = |count: usize| {
        if users == 0 {
            0.0
        } else {
            stats::round_to(count as f64 / users as f64, 3)
        }
    };
    let zero_rate = rate(zero_usage);
    let low_rate = rate(low_util);

    TeamRisk {
        team: team.to_string(),
        users,
        zero_usage,
        low_util,
        zero_rate,
        low_rate,
        avg_interactions: stats::round_to(stats::mean(&interactions).unwrap_or(0.0), 2),
        total_cost_3y: stats::round_to(total_cost, 2),
        risk_score: risk_score(zero_rate, low_rate),
    }
}
