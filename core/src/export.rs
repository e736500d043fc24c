//! Export surfaces: CSV, JSON and an HTML report.
//!
//! Exports read the ledger's records in order and never mutate them.

use crate::{
    customer::CustomerRecord,
    error::{LedgerError, LedgerResult},
    snapshot::LedgerSnapshot,
    store::write_atomically,
};
use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

pub const CSV_HEADER: [&str; 3] = ["Name", "Mobile Number", "Quantity"];

pub const CLIENTS_JSON: &str = "customers.json";
pub const CLIENTS_CSV: &str = "customers.csv";
pub const REPORT_STEM: &str = "monthly_sales_report";

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Monthly Sales Report</title>
    <style>
        body { font-family: Arial, sans-serif; }
        h1 { color: #4CAF50; }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 10px; text-align: left; border-bottom: 1px solid #ddd; }
        th { background-color: #f2f2f2; }
        tr:hover { background-color: #f5f5f5; }
    </style>
</head>
<body>
    <h1>Monthly Sales Report</h1>
    <table>
        <thead>
            <tr>
                <th>Name</th>
                <th>Mobile Number</th>
                <th>Coffee Quantity</th>
            </tr>
        </thead>
        <tbody>
"#;

const HTML_TAIL: &str = r#"        </tbody>
    </table>
</body>
</html>
"#;

/// Files written by `write_monthly_report`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub csv:  PathBuf,
    pub json: PathBuf,
    /// Absolute, ready to hand to a browser.
    pub html: PathBuf,
}

// ── Rendering ──────────────────────────────────────────────────

pub fn render_csv(customers: &[CustomerRecord]) -> String {
    let mut out = String::new();
    push_csv_row(&mut out, CSV_HEADER.iter().map(|h| h.to_string()));
    for c in customers {
        push_csv_row(
            &mut out,
            [c.name.clone(), c.mobile_number.to_string(), c.coffee_count.to_string()].into_iter(),
        );
    }
    out
}

pub fn render_json(customers: &[CustomerRecord]) -> LedgerResult<String> {
    LedgerSnapshot::new(customers.to_vec()).to_json()
}

pub fn render_html(customers: &[CustomerRecord]) -> String {
    let mut out = String::from(HTML_HEAD);
    for c in customers {
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "            <tr>\n                <td>{}</td>\n                <td>{}</td>\n                <td>{}</td>\n            </tr>\n",
            escape_html(&c.name),
            c.mobile_number,
            c.coffee_count,
        );
    }
    out.push_str(HTML_TAIL);
    out
}

// ── Writing ────────────────────────────────────────────────────

pub fn export_csv(customers: &[CustomerRecord], path: &Path) -> LedgerResult<()> {
    write_export(path, render_csv(customers))
}

pub fn export_json(customers: &[CustomerRecord], path: &Path) -> LedgerResult<()> {
    write_export(path, render_json(customers)?)
}

pub fn export_html(customers: &[CustomerRecord], path: &Path) -> LedgerResult<()> {
    write_export(path, render_html(customers))
}

/// `customers.json` and `customers.csv` under `clients_dir`.
pub fn export_clients_data(customers: &[CustomerRecord], clients_dir: &Path) -> LedgerResult<()> {
    export_json(customers, &clients_dir.join(CLIENTS_JSON))?;
    export_csv(customers, &clients_dir.join(CLIENTS_CSV))?;
    Ok(())
}

/// The monthly sales report in all three formats under `report_dir`.
pub fn write_monthly_report(customers: &[CustomerRecord], report_dir: &Path) -> LedgerResult<ReportPaths> {
    let csv = report_dir.join(format!("{REPORT_STEM}.csv"));
    let json = report_dir.join(format!("{REPORT_STEM}.json"));
    let html = report_dir.join(format!("{REPORT_STEM}.html"));

    export_csv(customers, &csv)?;
    export_json(customers, &json)?;
    export_html(customers, &html)?;

    let html = std::path::absolute(&html).map_err(|source| LedgerError::Export {
        path: html.clone(),
        source,
    })?;
    Ok(ReportPaths { csv, json, html })
}

fn write_export(path: &Path, content: String) -> LedgerResult<()> {
    write_atomically(path, content.as_bytes()).map_err(|source| LedgerError::Export {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("exported customers to {}", path.display());
    Ok(())
}

// ── Escaping ───────────────────────────────────────────────────

fn push_csv_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let row: Vec<String> = fields.map(|f| escape_csv(&f)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

fn escape_csv(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&'  => out.push_str("&amp;"),
            '<'  => out.push_str("&lt;"),
            '>'  => out.push_str("&gt;"),
            '"'  => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _    => out.push(ch),
        }
    }
    out
}
