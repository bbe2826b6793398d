//! Multi-format output for Issue Records
//!
//! All three artifacts derive from the same in-memory record: the CSV and
//! HTML emitters read `IssueRecord::cells()`, the JSON emitter serializes
//! the record directly, so values stay consistent across formats.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::record::{Field, IssueRecord};

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to serialize record to JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fixed relative locations of the emitted artifacts.
pub struct OutputPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
    pub html: PathBuf,
    pub log: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            csv: dir.join("issue_details.csv"),
            json: dir.join("issue_details.json"),
            html: dir.join("issue_details.html"),
            log: dir.join("fetch_log.txt"),
        }
    }
}

/// Write the record to all three formats.
pub fn write_all(record: &IssueRecord, paths: &OutputPaths) -> Result<(), EmitError> {
    write_json(record, &paths.json)?;
    write_csv(record, &paths.csv)?;
    write_html(record, &paths.html)?;
    Ok(())
}

/// Two-row tabular file: header row of field names, one data row of values.
pub fn write_csv(record: &IssueRecord, path: &Path) -> Result<(), EmitError> {
    let mut writer = csv::Writer::from_path(path)?;
    let cells = record.cells();
    writer.write_record(cells.iter().map(|(name, _)| *name))?;
    writer.write_record(cells.iter().map(|(_, value)| value.as_str()))?;
    writer.flush()?;
    Ok(())
}

/// Pretty-printed JSON object in record field order.
pub fn write_json(record: &IssueRecord, path: &Path) -> Result<(), EmitError> {
    let json = serde_json::to_string_pretty(record)?;
    fs::write(path, json)?;
    Ok(())
}

/// HTML rendering of the record: cover image column plus a details table.
pub fn write_html(record: &IssueRecord, path: &Path) -> Result<(), EmitError> {
    fs::write(path, render_html(record))?;
    Ok(())
}

pub fn render_html(record: &IssueRecord) -> String {
    let rows: String = record
        .cells()
        .iter()
        .filter(|(name, _)| !matches!(*name, "Cover" | "Creators"))
        .map(|(name, value)| {
            format!(
                "        <tr><th>{}</th><td>{}</td></tr>\n",
                escape(name),
                escape(value)
            )
        })
        .collect();

    let creators_list = match &record.creators {
        Field::Credits(creators) => {
            let items: String = creators
                .iter()
                .map(|c| {
                    format!(
                        "          <li><strong>{}</strong> - {}</li>\n",
                        escape(&c.name),
                        escape(&c.role)
                    )
                })
                .collect();
            format!("<ol>\n{}        </ol>", items)
        }
        Field::Text(text) => escape(text),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Comic Issue Details</title>
  <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.1.3/dist/css/bootstrap.min.css" rel="stylesheet">
</head>
<body>
  <div class="container mt-4">
    <h1 class="mb-4">Issue Details</h1>
    <div class="row">
      <div class="col-md-4">
        <div class="card">
          <img src="{cover}" alt="Cover Image" class="card-img-top">
          <div class="card-body">
            <h5 class="card-title">Cover Image</h5>
          </div>
        </div>
      </div>
      <div class="col-md-8">
        <table class="table table-bordered">
          <tbody>
{rows}        <tr><th>Creators</th><td>{creators}</td></tr>
          </tbody>
        </table>
      </div>
    </div>
  </div>
</body>
</html>
"#,
        cover = escape(&record.cover),
        rows = rows,
        creators = creators_list,
    )
}

/// Minimal HTML escaping for embedded cell values.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
