//! CSV exports of the ranked tables, one file per table.
//!
//! User tables reuse the sheet's own header names so the files line up with
//! the source workbook.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::config::COST_COLUMN;
use crate::models::{Analysis, DowngradeCandidate, LowEngagement, TeamRisk, UsageColumns, ZeroUsage};
use crate::risk::TEAM_RISK_HEADERS;

pub const LOW_UTILIZATION_FILE: &str = "low_utilization_accounts.csv";
pub const REMOVE_SEATS_FILE: &str = "remove_seats.csv";
pub const DOWNGRADE_FILE: &str = "downgrade_candidates.csv";
pub const AT_RISK_FILE: &str = "at_risk_teams.csv";

/// One field of a user-table row. Numbers go through the csv serializer so
/// every file formats them the same way.
#[derive(Debug, Clone, PartialEq)]
pub enum CsvCell {
    Text(String),
    Count(u64),
    Number(f64),
}

impl Serialize for CsvCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CsvCell::Text(value) => serializer.serialize_str(value),
            CsvCell::Count(value) => serializer.serialize_u64(*value),
            CsvCell::Number(value) => serializer.serialize_f64(*value),
        }
    }
}

pub fn write_all(dir: &Path, analysis: &Analysis) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let columns = &analysis.columns;
    let files = vec![
        write_table(
            &dir.join(LOW_UTILIZATION_FILE),
            low_engagement_headers(columns),
            analysis
                .low_engagement
                .iter()
                .map(|row| low_engagement_record(row, columns)),
        )?,
        write_table(
            &dir.join(REMOVE_SEATS_FILE),
            zero_usage_headers(columns),
            analysis
                .zero_usage
                .iter()
                .map(|row| zero_usage_record(row, columns)),
        )?,
        write_table(
            &dir.join(DOWNGRADE_FILE),
            downgrade_headers(columns),
            analysis
                .downgrade_candidates
                .iter()
                .map(|row| downgrade_record(row, columns)),
        )?,
        write_team_risk(&dir.join(AT_RISK_FILE), &analysis.at_risk_teams)?,
    ];

    Ok(files)
}

fn write_table<I>(path: &Path, headers: Vec<String>, records: I) -> Result<PathBuf>
where
    I: Iterator<Item = Vec<CsvCell>>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record(&headers)?;
    let mut rows = 0usize;
    for record in records {
        writer.serialize(&record)?;
        rows += 1;
    }
    writer.flush()?;

    info!(path = %path.display(), rows, "wrote CSV");
    Ok(path.to_path_buf())
}

/// Header row is written by hand so an empty table still has one.
fn write_team_risk(path: &Path, rows: &[TeamRisk]) -> Result<PathBuf> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record(TEAM_RISK_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "wrote CSV");
    Ok(path.to_path_buf())
}

fn with_type(columns: &UsageColumns, mut headers: Vec<String>, tail: &[&str]) -> Vec<String> {
    if let Some(account_type) = &columns.account_type {
        headers.push(account_type.clone());
    }
    headers.extend(tail.iter().map(|header| header.to_string()));
    headers
}

fn low_engagement_headers(columns: &UsageColumns) -> Vec<String> {
    with_type(columns, vec![columns.name.clone()], &["total_interactions"])
}

fn zero_usage_headers(columns: &UsageColumns) -> Vec<String> {
    let tail: &[&str] = if columns.has_cost { &[COST_COLUMN] } else { &[] };
    with_type(columns, vec![columns.name.clone()], tail)
}

fn downgrade_headers(columns: &UsageColumns) -> Vec<String> {
    with_type(
        columns,
        vec![columns.name.clone()],
        &["total_interactions", "cost_per_interaction"],
    )
}

fn user_prefix(name: &str, account_type: Option<&str>, columns: &UsageColumns) -> Vec<CsvCell> {
    let mut record = vec![CsvCell::Text(name.to_string())];
    if columns.account_type.is_some() {
        record.push(CsvCell::Text(account_type.unwrap_or_default().to_string()));
    }
    record
}

fn low_engagement_record(row: &LowEngagement, columns: &UsageColumns) -> Vec<CsvCell> {
    let mut record = user_prefix(&row.name, row.account_type.as_deref(), columns);
    record.push(CsvCell::Count(row.total_interactions));
    record
}

fn zero_usage_record(row: &ZeroUsage, columns: &UsageColumns) -> Vec<CsvCell> {
    let mut record = user_prefix(&row.name, row.account_type.as_deref(), columns);
    if columns.has_cost {
        record.push(CsvCell::Number(row.cost_3y));
    }
    record
}

fn downgrade_record(row: &DowngradeCandidate, columns: &UsageColumns) -> Vec<CsvCell> {
    let mut record = user_prefix(&row.name, row.account_type.as_deref(), columns);
    record.push(CsvCell::Count(row.total_interactions));
    record.push(CsvCell::Number(row.cost_per_interaction));
    record
}
