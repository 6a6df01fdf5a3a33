//! Rendering command summaries as a table, JSON or CSV.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

use crate::Result;

/// Output format of a command summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Boxed two-column table
    #[default]
    Table,
    /// Pretty-printed JSON document
    Json,
    /// `field,value` rows
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "Unknown format: {}. Supported: json, csv, table",
                other
            )),
        }
    }
}

/// A command result that can be shown in every [`OutputFormat`].
pub trait Summary: Serialize {
    /// Heading of the table form.
    fn title(&self) -> String;

    /// Field/value pairs of the table and CSV forms.
    fn rows(&self) -> Vec<(String, String)>;
}

/// Builds one field/value pair.
pub fn row(field: &str, value: impl ToString) -> (String, String) {
    (field.to_string(), value.to_string())
}

/// Writes `summary` to `out` in `format`.
pub fn render<S: Summary>(summary: &S, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, summary)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut csv = csv::Writer::from_writer(&mut *out);
            csv.write_record(["field", "value"]).map_err(csv_error)?;
            for (field, value) in summary.rows() {
                csv.write_record([field.as_str(), value.as_str()]).map_err(csv_error)?;
            }
            csv.flush()?;
        }
        OutputFormat::Table => write_table(&summary.title(), &summary.rows(), out)?,
    }
    Ok(())
}

fn csv_error(err: csv::Error) -> std::io::Error {
    std::io::Error::other(err)
}

fn write_table(
    title: &str,
    rows: &[(String, String)],
    out: &mut dyn Write,
) -> std::io::Result<()> {
    let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, v)| v.chars().count())
        .max()
        .unwrap_or(0);
    let value_width = value_width.max(title.chars().count().saturating_sub(key_width + 3));
    let bar = |w: usize| "─".repeat(w + 2);

    writeln!(out, "┌{}┐", bar(key_width + value_width + 3))?;
    writeln!(
        out,
        "│ {:<width$} │",
        title,
        width = key_width + value_width + 3
    )?;
    writeln!(out, "├{}┬{}┤", bar(key_width), bar(value_width))?;
    for (key, value) in rows {
        writeln!(
            out,
            "│ {:<kw$} │ {:>vw$} │",
            key,
            value,
            kw = key_width,
            vw = value_width
        )?;
    }
    writeln!(out, "└{}┴{}┘", bar(key_width), bar(value_width))?;
    Ok(())
}
