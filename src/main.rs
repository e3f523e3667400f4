use std::path::PathBuf;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use usage_report_refresh::config::{Layout, EXPORT_DIR};
use usage_report_refresh::workbook::Workbook;
use usage_report_refresh::{analysis, export, format, report};

const USAGE: &str = "Usage: usage-report-refresh <excel> <public/INDEX.html>";

#[derive(Parser)]
#[command(name = "usage-report-refresh")]
#[command(version)]
#[command(about = "Refresh the usage report KPIs and CSV exports from a vendor workbook", long_about = None)]
struct Cli {
    /// Workbook with the contract, usage and survey sheets
    #[arg(value_name = "EXCEL")]
    workbook: PathBuf,
    /// Report document to patch in place
    #[arg(value_name = "HTML")]
    html: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(_) => {
            println!("{USAGE}");
            std::process::exit(1);
        }
    };

    let layout = Layout::from_env();
    let workbook = Workbook::open(&cli.workbook)?;
    let analysis = analysis::analyze(&workbook, &layout);
    debug!(kpis = %serde_json::to_string(&analysis.kpis)?, "computed KPIs");

    let as_of = report::as_of_date(&cli.workbook)?;
    report::patch_file(&cli.html, &analysis.kpis, &as_of)?;
    info!(path = %cli.html.display(), as_of = %as_of, "report patched");

    let export_dir = cli
        .html
        .parent()
        .map(|parent| parent.join(EXPORT_DIR))
        .unwrap_or_else(|| PathBuf::from(EXPORT_DIR));
    export::write_all(&export_dir, &analysis)
        .with_context(|| format!("failed to export CSVs to {}", export_dir.display()))?;

    for user in &analysis.top_users {
        info!(
            user = %user.user,
            downloads = user.downloads,
            calls = user.calls,
            conferences = user.conferences,
            total = user.total_interactions,
            monthly_avg = user.monthly_avg,
            "top user"
        );
    }
    info!(
        cost_per_download = %format::money(analysis.kpis.cost_per_download),
        survey = %format::rating(analysis.kpis.avg_survey),
        "KPI summary"
    );

    println!("OK: refreshed {} and CSVs.", cli.html.display());
    Ok(())
}
