//! Workbook layout and fixed report parameters.

pub const CONTRACT_SHEET: &str = "Contract APV and Spend";
pub const USAGE_SHEET: &str = "Usage-Price";
pub const SURVEY_SHEET: &str = "38 Survey Responses";

pub const YEAR_1: &str = "Year 1";
pub const YEAR_2: &str = "Year 2";
pub const TOTAL_3_YEARS: &str = "Total 3 Years";

pub const TOTAL_COST_ROW: &str = "Total Cost";
pub const CONTRACT_APV_ROW: &str = "Contract APV";
pub const GOVTECH_COST_ROW: &str = "GovTech Cost";
pub const SNG_COST_ROW: &str = "SNG Cost";

pub const NAME_COLUMN: &str = "Licensed User Name (2)";
pub const ACCOUNT_TYPE_COLUMN: &str = "Account Type(Short)";
pub const DOWNLOADS_COLUMN: &str = "No of Report download";
pub const CALLS_COLUMN: &str = "No of Call";
pub const CONFERENCES_COLUMN: &str = "No. Participants Attended Gartner Conferences";
pub const COST_COLUMN: &str = "Total Cost (3 Years)";
pub const SURVEY_COLUMN: &str = "Q1_Overall_Usefulness";

/// Checked in order; the first header present in the usage sheet wins.
pub const TEAM_COLUMN_CANDIDATES: &[&str] = &[
    "Department",
    "Dept",
    "Agency",
    "Organisation",
    "Organization",
    "Org",
    "Team",
    "Division",
    "Group",
    ACCOUNT_TYPE_COLUMN,
];

pub const TABLE_LIMIT: usize = 10;
/// Months of the contract elapsed at reporting time.
pub const REPORT_MONTHS: f64 = 20.0;
/// Share of year 2 that falls inside the reporting window.
pub const YEAR_2_ELAPSED: f64 = 8.0 / 12.0;
pub const EXPORT_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub contract_sheet: String,
    pub usage_sheet: String,
    pub survey_sheet: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            contract_sheet: CONTRACT_SHEET.to_string(),
            usage_sheet: USAGE_SHEET.to_string(),
            survey_sheet: SURVEY_SHEET.to_string(),
        }
    }
}

impl Layout {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            contract_sheet: pick("USAGE_REPORT_CONTRACT_SHEET", CONTRACT_SHEET),
            usage_sheet: pick("USAGE_REPORT_USAGE_SHEET", USAGE_SHEET),
            survey_sheet: pick("USAGE_REPORT_SURVEY_SHEET", SURVEY_SHEET),
        }
    }
}
