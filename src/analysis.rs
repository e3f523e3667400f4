use tracing::info;

use crate::config::Layout;
use crate::models::Analysis;
use crate::workbook::{ContractSummary, Workbook};
use crate::{metrics, rankings, risk, usage};

/// Runs every aggregation over a loaded workbook.
pub fn analyze(workbook: &Workbook, layout: &Layout) -> Analysis {
    let contract = ContractSummary::new(workbook.sheet_or_empty(&layout.contract_sheet));
    let usage = usage::read_usage(workbook.sheet_or_empty(&layout.usage_sheet));
    let survey = workbook.sheet_or_empty(&layout.survey_sheet);

    let kpis = metrics::compute_kpis(&contract, &usage.records, survey);
    let records = &usage.records;
    let analysis = Analysis {
        kpis,
        top_users: rankings::top_users(records),
        low_engagement: rankings::low_engagement(records),
        zero_usage: rankings::zero_usage(records),
        downgrade_candidates: rankings::downgrade_candidates(records),
        at_risk_teams: risk::score_teams(records, usage.columns.team.is_some()),
        columns: usage.columns,
    };

    info!(
        users = analysis.kpis.licensed_users,
        zero_usage = analysis.zero_usage.len(),
        downgrade = analysis.downgrade_candidates.len(),
        teams = analysis.at_risk_teams.len(),
        "analysis complete"
    );
    analysis
}
