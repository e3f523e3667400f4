use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageRecord {
    pub name: String,
    pub account_type: Option<String>,
    pub team: Option<String>,
    pub downloads: u64,
    pub calls: u64,
    pub conferences: u64,
    pub cost_3y: f64,
}

impl UsageRecord {
    pub fn total_interactions(&self) -> u64 {
        self.downloads
            .saturating_add(self.calls)
            .saturating_add(self.conferences)
    }
}

/// Header names the usage sheet actually carried, reused as CSV headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageColumns {
    pub name: String,
    pub account_type: Option<String>,
    pub team: Option<String>,
    pub has_cost: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UsageSheet {
    pub columns: UsageColumns,
    pub records: Vec<UsageRecord>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Kpis {
    pub total_cost_3y: Option<f64>,
    pub apv_total: Option<f64>,
    pub spent_20m: Option<f64>,
    pub pct_apv_20m: Option<f64>,
    pub licensed_users: usize,
    pub downloads: u64,
    pub cost_per_download: Option<f64>,
    pub avg_survey: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopUser {
    pub user: String,
    pub downloads: u64,
    pub calls: u64,
    pub conferences: u64,
    pub total_interactions: u64,
    pub monthly_avg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LowEngagement {
    pub name: String,
    pub account_type: Option<String>,
    pub total_interactions: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZeroUsage {
    pub name: String,
    pub account_type: Option<String>,
    pub cost_3y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DowngradeCandidate {
    pub name: String,
    pub account_type: Option<String>,
    pub total_interactions: u64,
    pub cost_per_interaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TeamRisk {
    pub team: String,
    pub users: usize,
    pub zero_usage: usize,
    pub low_util: usize,
    pub zero_rate: f64,
    pub low_rate: f64,
    pub avg_interactions: f64,
    #[serde(rename = "TotalCost3Y")]
    pub total_cost_3y: f64,
    pub risk_score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub kpis: Kpis,
    pub columns: UsageColumns,
    pub top_users: Vec<TopUser>,
    pub low_engagement: Vec<LowEngagement>,
    pub zero_usage: Vec<ZeroUsage>,
    pub downgrade_candidates: Vec<DowngradeCandidate>,
    pub at_risk_teams: Vec<TeamRisk>,
}
