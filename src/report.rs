//! In-place patching of the published HTML report.
//!
//! The document is never generated here. A KPI block delimited by sentinel
//! comments is dropped in right after the overview container, replacing any
//! block a previous run left behind, and the tab handlers are normalized.

use std::fmt::Write;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use regex::Regex;
use tracing::{debug, warn};

use crate::format;
use crate::models::Kpis;
use crate::risk;

pub const FRAGMENT_START: &str = "<!-- KPI v2 START -->";
pub const FRAGMENT_END: &str = "<!-- KPI v2 END -->";

const KPI_STYLE: &str = r#"<style>
  :root { --kpi-green:#16a34a; --kpi-amber:#f59e0b; --kpi-red:#dc2626; --kpi-blue:#0d6efd; }
  .kpi-grid { display:grid; grid-template-columns: repeat(4, minmax(180px,1fr)); gap:12px; margin:12px 0 8px 0; }
  .kpi-card { background:#0d6efd; color:#fff; border-radius:14px; padding:16px; box-shadow:0 4px 14px rgba(0,0,0,.08); position:relative; }
  .kpi-value { font-size:28px; font-weight:700; line-height:1.1; }
  .kpi-label { font-size:13px; opacity:.95; margin-top:4px; }
  .kpi-sub   { font-size:12px; opacity:.9; margin-top:6px; }
  .kpi-pill { position:absolute; top:10px; right:10px; font-size:11px; padding:3px 8px; border-radius:999px; background:rgba(255,255,255,.18); border:1px solid rgba(255,255,255,.35); }
  .kpi-pill.ok::before, .kpi-pill.warn::before, .kpi-pill.risk::before { content:''; display:inline-block; width:8px; height:8px; border-radius:999px; margin-right:6px; vertical-align:middle; }
  .kpi-pill.ok::before { background:var(--kpi-green); }
  .kpi-pill.warn::before { background:var(--kpi-amber); }
  .kpi-pill.risk::before { background:var(--kpi-red); }
  .kpi-asof { font-size:12px; color:#6b7280; margin:4px 2px 14px 2px; }
  @media (max-width: 960px) { .kpi-grid { grid-template-columns: repeat(2, 1fr); } }
  @media (max-width: 540px) { .kpi-grid { grid-template-columns: 1fr; } }
</style>"#;

fn tab_handler() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"onclick="showTab\('([^']+)'\)""#).unwrap())
}

/// Current and legacy sentinel pairs, each with the blank lines an insertion adds.
fn injected_fragments() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(
                r"(?is)(?:\r?\n){0,2}<!--\s*KPI v2 START\s*-->.*?<!--\s*KPI v2 END\s*-->(?:\r?\n)?",
            )
            .unwrap(),
            Regex::new(
                r"(?is)(?:\r?\n){0,2}<!--\s*KPI START\s*-->.*?<!--\s*KPI END\s*-->(?:\r?\n)?",
            )
            .unwrap(),
        ]
    })
}

fn overview_anchor() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"(?i)<div[^>]+id="overview"[^>]*>"#).unwrap())
}

/// Rewrites `showTab('id')` handlers to also pass the triggering event.
pub fn normalize_tab_handlers(html: &str) -> String {
    tab_handler()
        .replace_all(html, r#"onclick="showTab('${1}', event)""#)
        .into_owned()
}

pub fn strip_fragments(html: &str) -> String {
    let mut output = html.to_string();
    for pattern in injected_fragments() {
        let removed = pattern.find_iter(&output).count();
        if removed > 0 {
            debug!(removed, pattern = pattern.as_str(), "removing previous KPI block");
            output = pattern.replace_all(&output, "").into_owned();
        }
    }
    output
}

/// Inserts `fragment` after the opening tag of the overview container.
/// Returns `None` when the document has no such container.
pub fn insert_after_anchor(html: &str, fragment: &str) -> Option<String> {
    let anchor = overview_anchor().find(html)?;
    let mut output = String::with_capacity(html.len() + fragment.len() + 3);
    output.push_str(&html[..anchor.end()]);
    output.push_str("\n\n");
    output.push_str(fragment);
    output.push('\n');
    output.push_str(&html[anchor.end()..]);
    Some(output)
}

pub fn render_kpi_fragment(kpis: &Kpis, as_of: &str) -> String {
    let apv = risk::apv_status(kpis.pct_apv_20m);
    let survey = risk::survey_status(kpis.avg_survey);

    let mut output = String::new();
    let _ = writeln!(output, "{FRAGMENT_START}");
    let _ = writeln!(output, "{KPI_STYLE}");
    let _ = writeln!(output, r#"<div class="kpi-grid">"#);

    let _ = writeln!(output, r#"  <div class="kpi-card">"#);
    let _ = writeln!(
        output,
        r#"    <div class="kpi-value">{}</div>"#,
        format::millions(kpis.total_cost_3y)
    );
    let _ = writeln!(
        output,
        r#"    <div class="kpi-label">Total Contract Cost (GovTech + SNG)</div>"#
    );
    let _ = writeln!(
        output,
        "    <div class=\"kpi-sub\">20\u{2011}month spend: <strong>{}</strong> \u{b7} {} of APV {}</div>",
        format::millions(kpis.spent_20m),
        format::percent(kpis.pct_apv_20m),
        format::millions(kpis.apv_total)
    );
    let _ = writeln!(
        output,
        r#"    <div class="kpi-pill {}">APV utilization</div>"#,
        apv.as_str()
    );
    let _ = writeln!(output, "  </div>");

    let _ = writeln!(output, r#"  <div class="kpi-card">"#);
    let _ = writeln!(
        output,
        r#"    <div class="kpi-value">{}</div>"#,
        format::count(kpis.licensed_users)
    );
    let _ = writeln!(output, r#"    <div class="kpi-label">Licensed Users</div>"#);
    let _ = writeln!(output, "  </div>");

    let _ = writeln!(output, r#"  <div class="kpi-card">"#);
    let _ = writeln!(
        output,
        r#"    <div class="kpi-value">{}</div>"#,
        format::money(kpis.cost_per_download)
    );
    let _ = writeln!(output, r#"    <div class="kpi-label">Cost per Download</div>"#);
    let _ = writeln!(output, "  </div>");

    let _ = writeln!(output, r#"  <div class="kpi-card">"#);
    let _ = writeln!(
        output,
        r#"    <div class="kpi-value">{}</div>"#,
        format::rating(kpis.avg_survey)
    );
    let _ = writeln!(
        output,
        r#"    <div class="kpi-label">User Satisfaction (5 scale)</div>"#
    );
    let _ = writeln!(
        output,
        r#"    <div class="kpi-pill {}">Survey</div>"#,
        survey.as_str()
    );
    let _ = writeln!(output, "  </div>");

    let _ = writeln!(output, "</div>");
    let _ = writeln!(
        output,
        r#"<div class="kpi-asof">Data as of: <strong>{as_of}</strong></div>"#
    );
    let _ = write!(output, "{FRAGMENT_END}");

    output
}

/// Applies every rewrite to `html`. Running it again on its own output
/// changes nothing but the KPI values.
pub fn patch(html: &str, kpis: &Kpis, as_of: &str) -> String {
    let html = normalize_tab_handlers(html);
    let html = strip_fragments(&html);
    let fragment = render_kpi_fragment(kpis, as_of);

    match insert_after_anchor(&html, &fragment) {
        Some(patched) => patched,
        None => {
            warn!("overview container not found, KPI block omitted");
            html
        }
    }
}

/// Local calendar date of the file's last modification.
pub fn as_of_date(path: &Path) -> Result<String> {
    let modified = fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .with_context(|| format!("failed to read modification time of {}", path.display()))?;
    let modified: DateTime<Local> = modified.into();
    Ok(modified.format("%Y-%m-%d").to_string())
}

pub fn patch_file(path: &Path, kpis: &Kpis, as_of: &str) -> Result<()> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let html = match String::from_utf8(bytes) {
        Ok(html) => html,
        Err(err) => {
            warn!(path = %path.display(), "document is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };

    let patched = patch(&html, kpis, as_of);
    fs::write(path, patched).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
