use tracing::{debug, warn};

use crate::config::{
    ACCOUNT_TYPE_COLUMN, CALLS_COLUMN, CONFERENCES_COLUMN, COST_COLUMN, DOWNLOADS_COLUMN,
    NAME_COLUMN, TEAM_COLUMN_CANDIDATES,
};
use crate::models::{UsageColumns, UsageRecord, UsageSheet};
use crate::workbook::{cell_text, coerce_number, Table};

/// Picks the name, account-type and team headers for a usage sheet.
pub fn resolve_columns(table: &Table) -> UsageColumns {
    let name = if table.has_column(NAME_COLUMN) {
        NAME_COLUMN.to_string()
    } else {
        table
            .headers()
            .first()
            .cloned()
            .unwrap_or_else(|| NAME_COLUMN.to_string())
    };
    let account_type = table
        .has_column(ACCOUNT_TYPE_COLUMN)
        .then(|| ACCOUNT_TYPE_COLUMN.to_string());
    let team = table
        .first_present(TEAM_COLUMN_CANDIDATES)
        .map(str::to_string)
        .or_else(|| account_type.clone());

    UsageColumns {
        name,
        account_type,
        team,
        has_cost: table.has_column(COST_COLUMN),
    }
}

pub fn read_usage(table: &Table) -> UsageSheet {
    let columns = resolve_columns(table);

    for required in [DOWNLOADS_COLUMN, CALLS_COLUMN, CONFERENCES_COLUMN, COST_COLUMN] {
        if !table.has_column(required) {
            warn!(column = required, "usage column missing, treating as zero");
        }
    }
    if columns.team.is_none() {
        warn!("no team column found, at-risk teams will be empty");
    }

    let name_index = table.column_index(&columns.name);
    let type_index = columns
        .account_type
        .as_deref()
        .and_then(|name| table.column_index(name));
    let team_index = columns.team.as_deref().and_then(|name| table.column_index(name));
    let downloads_index = table.column_index(DOWNLOADS_COLUMN);
    let calls_index = table.column_index(CALLS_COLUMN);
    let conferences_index = table.column_index(CONFERENCES_COLUMN);
    let cost_index = table.column_index(COST_COLUMN);

    let text = |row: usize, index: Option<usize>| {
        index
            .map(|index| cell_text(table.cell(row, index)))
            .filter(|value| !value.trim().is_empty())
    };
    let number = |row: usize, index: Option<usize>| {
        index.and_then(|index| coerce_number(table.cell(row, index)))
    };

    let records: Vec<UsageRecord> = (0..table.len())
        .map(|row| UsageRecord {
            name: text(row, name_index).unwrap_or_default(),
            account_type: text(row, type_index),
            team: text(row, team_index),
            downloads: to_count(number(row, downloads_index)),
            calls: to_count(number(row, calls_index)),
            conferences: to_count(number(row, conferences_index)),
            cost_3y: number(row, cost_index).unwrap_or(0.0),
        })
        .collect();

    debug!(
        users = records.len(),
        name_column = %columns.name,
        team_column = columns.team.as_deref().unwrap_or("-"),
        "parsed usage sheet"
    );

    UsageSheet { columns, records }
}

fn to_count(value: Option<f64>) -> u64 {
    match value {
        Some(value) if value > 0.0 => value as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use calamine::Data;

    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn counts_default_to_zero_and_total_is_their_sum() {
        let table = Table::new(
            headers(&[NAME_COLUMN, DOWNLOADS_COLUMN, CALLS_COLUMN, COST_COLUMN]),
            vec![
                vec![
                    Data::String("Avery Lee".to_string()),
                    Data::Float(12.0),
                    Data::String("n/a".to_string()),
                    Data::Float(9_000.0),
                ],
                vec![
                    Data::String("Jules Moreno".to_string()),
                    Data::Float(-3.0),
                    Data::Int(4),
                    Data::Empty,
                ],
            ],
        );

        let usage = read_usage(&table);
        assert_eq!(usage.records.len(), 2);

        let avery = &usage.records[0];
        assert_eq!((avery.downloads, avery.calls, avery.conferences), (12, 0, 0));
        assert_eq!(avery.total_interactions(), 12);
        assert_eq!(avery.cost_3y, 9_000.0);

        let jules = &usage.records[1];
        assert_eq!(jules.total_interactions(), 4);
        assert_eq!(jules.cost_3y, 0.0);
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let table = Table::new(
            headers(&[NAME_COLUMN, DOWNLOADS_COLUMN, CALLS_COLUMN, CONFERENCES_COLUMN]),
            vec![vec![
                Data::String("Avery Lee".to_string()),
                Data::Float(1e19),
                Data::Float(1e19),
                Data::Int(5),
            ]],
        );

        let usage = read_usage(&table);
        assert_eq!(usage.records[0].total_interactions(), u64::MAX);
    }

    #[test]
    fn name_falls_back_to_first_column() {
        let table = Table::new(headers(&["Email", DOWNLOADS_COLUMN]), Vec::new());
        let columns = resolve_columns(&table);
        assert_eq!(columns.name, "Email");
        assert_eq!(columns.account_type, None);
        assert_eq!(columns.team, None);
        assert!(!columns.has_cost);
    }

    #[test]
    fn team_prefers_candidate_list_over_account_type() {
        let table = Table::new(
            headers(&[NAME_COLUMN, ACCOUNT_TYPE_COLUMN, "Division", "Agency"]),
            Vec::new(),
        );
        let columns = resolve_columns(&table);
        assert_eq!(columns.team.as_deref(), Some("Agency"));
        assert_eq!(columns.account_type.as_deref(), Some(ACCOUNT_TYPE_COLUMN));
    }

    #[test]
    fn team_falls_back_to_account_type() {
        let table = Table::new(headers(&[NAME_COLUMN, ACCOUNT_TYPE_COLUMN]), Vec::new());
        let columns = resolve_columns(&table);
        assert_eq!(columns.team.as_deref(), Some(ACCOUNT_TYPE_COLUMN));
    }

    #[test]
    fn blank_team_cells_are_unassigned() {
        let table = Table::new(
            headers(&[NAME_COLUMN, "Team"]),
            vec![vec![Data::String("Kiara Patel".to_string()), Data::String("  ".to_string())]],
        );
        let usage = read_usage(&table);
        assert_eq!(usage.records[0].team, None);
    }
}
