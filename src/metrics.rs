//! Scalar KPIs for the report header.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::config::{
    CONTRACT_APV_ROW, GOVTECH_COST_ROW, SNG_COST_ROW, SURVEY_COLUMN, TOTAL_3_YEARS,
    TOTAL_COST_ROW, YEAR_1, YEAR_2, YEAR_2_ELAPSED,
};
use crate::models::{Kpis, UsageRecord};
use crate::stats;
use crate::workbook::{cell_text, ContractSummary, Table};

pub fn compute_kpis(contract: &ContractSummary, usage: &[UsageRecord], survey: &Table) -> Kpis {
    let total_cost_3y = contract.value(TOTAL_COST_ROW, TOTAL_3_YEARS);
    let apv_total = contract.value(CONTRACT_APV_ROW, TOTAL_3_YEARS);
    let spent_20m = window_spend(
        contract.value(GOVTECH_COST_ROW, YEAR_1),
        contract.value(SNG_COST_ROW, YEAR_1),
        contract.value(GOVTECH_COST_ROW, YEAR_2),
        contract.value(SNG_COST_ROW, YEAR_2),
    );

    let downloads = usage
        .iter()
        .map(|record| record.downloads)
        .fold(0, u64::saturating_add);
    let user_cost: f64 = usage.iter().map(|record| record.cost_3y).sum();

    Kpis {
        total_cost_3y,
        apv_total,
        spent_20m,
        pct_apv_20m: percent_of(spent_20m, apv_total),
        licensed_users: usage.len(),
        downloads,
        cost_per_download: cost_per_download(user_cost, downloads),
        avg_survey: average_survey_score(survey),
    }
}

/// Year 1 in full plus the elapsed share of year 2, for both cost lines.
pub fn window_spend(
    govtech_y1: Option<f64>,
    sng_y1: Option<f64>,
    govtech_y2: Option<f64>,
    sng_y2: Option<f64>,
) -> Option<f64> {
    Some((govtech_y1? + sng_y1?) + (govtech_y2? + sng_y2?) * YEAR_2_ELAPSED)
}

pub fn percent_of(part: Option<f64>, whole: Option<f64>) -> Option<f64> {
    match (part, whole) {
        (Some(part), Some(whole)) if whole != 0.0 => Some(part / whole * 100.0),
        _ => None,
    }
}

pub fn cost_per_download(total_cost: f64, downloads: u64) -> Option<f64> {
    (downloads > 0).then(|| total_cost / downloads as f64)
}

/// First run of digits in a free-text answer, e.g. `"4 - Useful"` gives 4.
pub fn survey_score(text: &str) -> Option<u32> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new(r"\d+").unwrap());
    digits.find(text)?.as_str().parse().ok()
}

pub fn average_survey_score(survey: &Table) -> Option<f64> {
    let Some(answers) = survey.column(SURVEY_COLUMN) else {
        warn!(column = SURVEY_COLUMN, "survey column missing");
        return None;
    };
    let scores: Vec<f64> = answers
        .filter_map(|cell| survey_score(&cell_text(cell)))
        .map(f64::from)
        .collect();
    stats::mean(&scores)
}

#[cfg(test)]
mod tests {
    use calamine::Data;

    use super::*;

    fn contract_table(rows: &[(&str, [f64; 3])]) -> Table {
        Table::new(
            vec![
                "Unnamed: 0".to_string(),
                YEAR_1.to_string(),
                YEAR_2.to_string(),
                TOTAL_3_YEARS.to_string(),
            ],
            rows.iter()
                .map(|(label, values)| {
                    let mut row = vec![Data::String(label.to_string())];
                    row.extend(values.iter().map(|value| Data::Float(*value)));
                    row
                })
                .collect(),
        )
    }

    fn survey_table(answers: &[&str]) -> Table {
        Table::new(
            vec![SURVEY_COLUMN.to_string()],
            answers
                .iter()
                .map(|answer| vec![Data::String(answer.to_string())])
                .collect(),
        )
    }

    fn user(downloads: u64, cost_3y: f64) -> UsageRecord {
        UsageRecord {
            name: "Avery Lee".to_string(),
            downloads,
            cost_3y,
            ..UsageRecord::default()
        }
    }

    #[test]
    fn window_spend_matches_formula() {
        let spend = window_spend(Some(100.0), Some(50.0), Some(120.0), Some(60.0));
        let expected = (100.0 + 50.0) + (120.0 + 60.0) * (8.0 / 12.0);
        assert!((spend.unwrap() - expected).abs() < 1e-9);
        assert_eq!(window_spend(Some(1.0), None, Some(1.0), Some(1.0)), None);
    }

    #[test]
    fn kpis_follow_contract_and_usage() {
        let table = contract_table(&[
            ("Total Cost", [4_000_000.0, 4_000_000.0, 12_000_000.0]),
            ("Contract APV", [5_000_000.0, 5_000_000.0, 15_000_000.0]),
            ("GovTech Cost", [3_000_000.0, 3_000_000.0, 9_000_000.0]),
            ("SNG Cost", [1_000_000.0, 1_000_000.0, 3_000_000.0]),
        ]);
        let contract = ContractSummary::new(&table);
        let usage = vec![user(150, 30_000.0), user(50, 20_000.0)];
        let survey = survey_table(&["4 - Useful", "5 (very)", "no opinion", "3"]);

        let kpis = compute_kpis(&contract, &usage, &survey);

        assert_eq!(kpis.total_cost_3y, Some(12_000_000.0));
        assert_eq!(kpis.apv_total, Some(15_000_000.0));
        let spend = 4_000_000.0 + 4_000_000.0 * (8.0 / 12.0);
        assert!((kpis.spent_20m.unwrap() - spend).abs() < 1e-6);
        assert!((kpis.pct_apv_20m.unwrap() - spend / 15_000_000.0 * 100.0).abs() < 1e-9);
        assert_eq!(kpis.licensed_users, 2);
        assert_eq!(kpis.downloads, 200);
        assert_eq!(kpis.cost_per_download, Some(250.0));
        assert_eq!(kpis.avg_survey, Some(4.0));
    }

    #[test]
    fn download_total_saturates() {
        let table = contract_table(&[]);
        let contract = ContractSummary::new(&table);
        let usage = vec![user(u64::MAX, 0.0), user(10, 0.0)];

        let kpis = compute_kpis(&contract, &usage, &Table::default());
        assert_eq!(kpis.downloads, u64::MAX);
    }

    #[test]
    fn missing_contract_rows_leave_kpis_undefined() {
        let table = contract_table(&[("Total Cost", [1.0, 1.0, 3.0])]);
        let contract = ContractSummary::new(&table);
        let kpis = compute_kpis(&contract, &[], &Table::default());

        assert_eq!(kpis.total_cost_3y, Some(3.0));
        assert_eq!(kpis.apv_total, None);
        assert_eq!(kpis.spent_20m, None);
        assert_eq!(kpis.pct_apv_20m, None);
        assert_eq!(kpis.cost_per_download, None);
        assert_eq!(kpis.avg_survey, None);
    }

    #[test]
    fn zero_apv_gives_no_percentage() {
        assert_eq!(percent_of(Some(10.0), Some(0.0)), None);
        assert_eq!(percent_of(Some(10.0), Some(40.0)), Some(25.0));
    }

    #[test]
    fn survey_score_takes_first_integer() {
        assert_eq!(survey_score("Rating: 4 out of 5"), Some(4));
        assert_eq!(survey_score("4.5"), Some(4));
        assert_eq!(survey_score("not useful"), None);
        assert_eq!(survey_score(""), None);
    }

    #[test]
    fn survey_without_numbers_is_undefined() {
        assert_eq!(average_survey_score(&survey_table(&["great", "meh"])), None);
    }
}
