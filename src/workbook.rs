//! Spreadsheet loading on top of calamine.
//!
//! Every sheet is flattened into a [`Table`]: the first row becomes the
//! header list and the rest are kept as raw cells. Lookups never fail; a
//! missing sheet, column or cell simply yields nothing.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::{debug, warn};

static EMPTY_CELL: Data = Data::Empty;
static EMPTY_TABLE: Table = Table {
    headers: Vec::new(),
    rows: Vec::new(),
};

#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Data>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Data>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(index, cell)| {
                        let label = cell_text(cell);
                        if label.trim().is_empty() {
                            format!("Unnamed: {index}")
                        } else {
                            label
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows
            .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
            .map(|row| row.to_vec())
            .collect();

        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Returns the first candidate that is a header of this table.
    pub fn first_present<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates
            .iter()
            .copied()
            .find(|candidate| self.has_column(candidate))
    }

    pub fn cell(&self, row: usize, column: usize) -> &Data {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Cells of a named column, or `None` when the header is absent.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Data> + '_> {
        let index = self.column_index(name)?;
        Some((0..self.rows.len()).map(move |row| self.cell(row, index)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: HashMap<String, Table>,
}

impl Workbook {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut excel = open_workbook_auto(path)
            .with_context(|| format!("failed to open workbook {}", path.display()))?;

        let mut sheets = HashMap::new();
        for name in excel.sheet_names() {
            match excel.worksheet_range(&name) {
                Ok(range) => {
                    let table = Table::from_range(&range);
                    debug!(sheet = %name, rows = table.len(), "loaded sheet");
                    sheets.insert(name, table);
                }
                Err(err) => warn!(sheet = %name, error = %err, "skipping unreadable sheet"),
            }
        }

        Ok(Self { sheets })
    }

    pub fn from_sheets<I>(sheets: I) -> Self
    where
        I: IntoIterator<Item = (String, Table)>,
    {
        Self {
            sheets: sheets.into_iter().collect(),
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.get(name)
    }

    /// Like [`Workbook::sheet`] but degrades to an empty table.
    pub fn sheet_or_empty(&self, name: &str) -> &Table {
        self.sheet(name).unwrap_or_else(|| {
            warn!(sheet = name, "sheet not found, treating as empty");
            &EMPTY_TABLE
        })
    }
}

/// Rows of the contract sheet keyed by the label in their first column.
#[derive(Debug, Clone, Copy)]
pub struct ContractSummary<'a> {
    table: &'a Table,
}

impl<'a> ContractSummary<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self { table }
    }

    pub fn value(&self, row_name: &str, column: &str) -> Option<f64> {
        let column = self.table.column_index(column)?;
        let row = (0..self.table.len())
            .find(|&row| cell_text(self.table.cell(row, 0)).trim() == row_name)?;
        coerce_number(self.table.cell(row, column))
    }
}

pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        other => other.to_string(),
    }
}

/// Numeric view of a cell; blanks, errors and unparseable text give `None`.
pub fn coerce_number(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Float(value) => *value,
        Data::Int(value) => *value as f64,
        Data::Bool(value) => f64::from(u8::from(*value)),
        Data::String(value) => value.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract_table() -> Table {
        Table::new(
            vec![
                "Unnamed: 0".to_string(),
                "Year 1".to_string(),
                "Year 2".to_string(),
                "Total 3 Years".to_string(),
            ],
            vec![
                vec![
                    Data::String("Total Cost".to_string()),
                    Data::Float(4_000_000.0),
                    Data::Float(4_000_000.0),
                    Data::Float(12_000_000.0),
                ],
                vec![
                    Data::String("SNG Cost".to_string()),
                    Data::Int(250_000),
                    Data::Empty,
                    Data::String("n/a".to_string()),
                ],
            ],
        )
    }

    #[test]
    fn contract_lookup_by_row_and_column() {
        let table = contract_table();
        let contract = ContractSummary::new(&table);
        assert_eq!(contract.value("Total Cost", "Total 3 Years"), Some(12_000_000.0));
        assert_eq!(contract.value("SNG Cost", "Year 1"), Some(250_000.0));
    }

    #[test]
    fn contract_lookup_missing_pieces_are_undefined() {
        let table = contract_table();
        let contract = ContractSummary::new(&table);
        assert_eq!(contract.value("SNG Cost", "Year 2"), None);
        assert_eq!(contract.value("SNG Cost", "Total 3 Years"), None);
        assert_eq!(contract.value("Contract APV", "Year 1"), None);
        assert_eq!(contract.value("Total Cost", "Year 3"), None);
    }

    #[test]
    fn first_present_respects_candidate_order() {
        let table = Table::new(
            vec!["Team".to_string(), "Agency".to_string()],
            Vec::new(),
        );
        assert_eq!(table.first_present(&["Dept", "Agency", "Team"]), Some("Agency"));
        assert_eq!(table.first_present(&["Dept", "Group"]), None);
    }

    #[test]
    fn from_range_names_blank_headers_and_drops_empty_rows() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 1));
        range.set_value((0, 1), Data::String("Year 1".to_string()));
        range.set_value((1, 0), Data::String("Total Cost".to_string()));
        range.set_value((1, 1), Data::Float(10.0));
        range.set_value((3, 0), Data::String("SNG Cost".to_string()));

        let table = Table::from_range(&range);
        assert_eq!(table.headers(), ["Unnamed: 0", "Year 1"]);
        assert_eq!(table.len(), 2);
        assert_eq!(cell_text(table.cell(1, 0)), "SNG Cost");
    }

    #[test]
    fn cells_outside_the_table_read_as_empty() {
        let table = contract_table();
        assert_eq!(table.cell(10, 0), &Data::Empty);
        assert_eq!(table.cell(0, 10), &Data::Empty);
    }

    #[test]
    fn numbers_coerce_from_text_and_reject_garbage() {
        assert_eq!(coerce_number(&Data::String(" 42.5 ".to_string())), Some(42.5));
        assert_eq!(coerce_number(&Data::String("many".to_string())), None);
        assert_eq!(coerce_number(&Data::Float(f64::NAN)), None);
        assert_eq!(coerce_number(&Data::Empty), None);
        assert_eq!(coerce_number(&Data::Int(7)), Some(7.0));
    }

    #[test]
    fn missing_sheet_degrades_to_empty_table() {
        let workbook = Workbook::from_sheets([("Usage-Price".to_string(), Table::default())]);
        assert!(workbook.sheet("Usage-Price").is_some());
        assert!(workbook.sheet_or_empty("38 Survey Responses").is_empty());
    }
}
