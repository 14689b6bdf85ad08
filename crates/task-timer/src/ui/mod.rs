//! Terminal UI helpers for task display.
//!
//! This module uses println! for CLI output, which is appropriate
//! for terminal user interfaces.

#![allow(clippy::disallowed_macros)]

mod countdown;

pub use countdown::CountdownDisplay;

use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use crate::domain::StatsReport;
use crate::entities::{Config, ConfigKey, Task, TaskStatus};

/// Get colored status string
pub fn status_colored(status: TaskStatus) -> String {
    match status {
        TaskStatus::Pending => "pending".yellow().to_string(),
        TaskStatus::Completed => "completed".green().to_string(),
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Pending => Color::Yellow,
        TaskStatus::Completed => Color::Green,
    }
}

fn tags_cell(task: &Task) -> String {
    if task.tags.is_empty() {
        "-".to_string()
    } else {
        task.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

/// Create a table for displaying tasks
pub fn task_table<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Duration").fg(Color::Cyan),
        Cell::new("Tags").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
        Cell::new("Spent").fg(Color::Cyan),
    ]);

    for task in tasks {
        table.add_row(vec![
            Cell::new(task.id),
            Cell::new(&task.name),
            Cell::new(format!("{} min", task.duration_minutes)),
            Cell::new(tags_cell(task)),
            Cell::new(task.status.to_string()).fg(status_color(task.status)),
            Cell::new(format!("{} min", task.time_spent_minutes)),
        ]);
    }

    table
}

/// Create a table for the per-tag breakdown of a report
pub fn tag_stats_table(report: &StatsReport) -> Option<Table> {
    let per_tag = report.per_tag.as_ref().filter(|b| !b.is_empty())?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Tag").fg(Color::Cyan),
        Cell::new("Tasks").fg(Color::Cyan),
        Cell::new("Done").fg(Color::Cyan),
        Cell::new("Progress").fg(Color::Cyan),
        Cell::new("Time").fg(Color::Cyan),
    ]);

    for (tag, bucket) in per_tag {
        table.add_row(vec![
            Cell::new(tag),
            Cell::new(bucket.total),
            Cell::new(bucket.completed).fg(Color::Green),
            Cell::new(format!("{}%", bucket.completed_pct)),
            Cell::new(format!("{} min", bucket.time_spent)),
        ]);
    }

    Some(table)
}

/// Display a statistics report
pub fn display_stats(report: &StatsReport) {
    let title = match &report.filter_tag {
        Some(tag) => format!("Statistics for tag '{tag}'"),
        None => "Statistics".to_string(),
    };
    println!("{}", title.cyan().bold());
    println!("{}", "═".repeat(60).dimmed());

    println!("{}: {}", "Total tasks".bold(), report.total);
    println!(
        "{}: {} ({}%)",
        "Completed".bold(),
        report.completed.to_string().green(),
        report.completed_pct
    );
    println!("{}: {}", "Pending".bold(), report.pending.to_string().yellow());
    println!("{}: {} min", "Time spent".bold(), report.total_time_spent);

    if let Some(table) = tag_stats_table(report) {
        println!();
        println!("{}", "By tag".bold().underline());
        println!("{table}");
    }
}

/// Display task details in a formatted way
pub fn display_task_details(task: &Task) {
    println!("{}", "═".repeat(60).dimmed());
    println!(
        "{} {} {}",
        "Task".cyan().bold(),
        task.id.to_string().cyan().bold(),
        format!("[{}]", task.status).yellow()
    );
    println!("{}", "═".repeat(60).dimmed());
    println!();

    println!("{}: {}", "Name".bold(), task.name);
    println!("{}: {}", "Status".bold(), status_colored(task.status));
    println!("{}: {} min", "Duration".bold(), task.duration_minutes);
    println!("{}: {}", "Tags".bold(), tags_cell(task));
    println!("{}: {} min", "Time spent".bold(), task.time_spent_minutes);
    println!(
        "{}: {}",
        "Created".bold(),
        task.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(at) = task.completed_at {
        println!("{}: {}", "Completed".bold(), at.format("%Y-%m-%d %H:%M UTC"));
    }

    println!();
}

/// Display every configuration key and its value
pub fn display_config(config: &Config) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Key").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
    ]);
    for key in ConfigKey::ALL {
        table.add_row(vec![Cell::new(key), Cell::new(config.get(key))]);
    }
    println!("{table}");
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}
