//! Task export to CSV and JSON.

use std::io::Write;

use crate::entities::Task;
use crate::errors::TimerResult;

const CSV_HEADER: [&str; 8] = [
    "ID",
    "Name",
    "Duration (minutes)",
    "Tags",
    "Status",
    "Time Spent (minutes)",
    "Created At",
    "Completed At",
];

/// Export formats understood by [`write`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = crate::errors::TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(crate::errors::TimerError::invalid(format!(
                "unknown export format '{other}' (use csv or json)"
            ))),
        }
    }
}

/// Write `tasks` in `format`.
pub fn write<W: Write>(tasks: &[Task], format: ExportFormat, out: W) -> TimerResult<()> {
    match format {
        ExportFormat::Csv => write_csv(tasks, out),
        ExportFormat::Json => write_json(tasks, out),
    }
}

/// One header row, then one row per task. Tags are joined with `, `.
pub fn write_csv<W: Write>(tasks: &[Task], mut out: W) -> TimerResult<()> {
    write_row(&mut out, CSV_HEADER.iter().map(|h| (*h).to_string()))?;

    for task in tasks {
        let tags: Vec<&str> = task.tags.iter().map(String::as_str).collect();
        write_row(
            &mut out,
            [
                task.id.to_string(),
                task.name.clone(),
                task.duration_minutes.to_string(),
                tags.join(", "),
                task.status.to_string(),
                task.time_spent_minutes.to_string(),
                task.created_at.to_rfc3339(),
                task.completed_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_default(),
            ],
        )?;
    }

    out.flush()?;
    Ok(())
}

/// The same records the data file holds, as a pretty JSON array.
pub fn write_json<W: Write>(tasks: &[Task], mut out: W) -> TimerResult<()> {
    serde_json::to_writer_pretty(&mut out, tasks)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn write_row<W: Write>(out: &mut W, fields: impl IntoIterator<Item = String>) -> TimerResult<()> {
    let line = fields
        .into_iter()
        .map(|f| escape_field(&f))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{line}")?;
    Ok(())
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
