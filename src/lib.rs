//! Refreshes a static usage report from a vendor usage/contract workbook.
//!
//! The workbook is aggregated into KPIs and ranked user/team tables
//! ([`analysis`]), the KPIs are patched into the existing HTML report
//! ([`report`]) and the tables are written beside it as CSV ([`export`]).

pub mod analysis;
pub mod config;
pub mod export;
pub mod format;
pub mod metrics;
pub mod models;
pub mod rankings;
pub mod report;
pub mod risk;
pub mod stats;
pub mod usage;
pub mod workbook;
