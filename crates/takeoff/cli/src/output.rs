//! Output formatting utilities

use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Print rows as a table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No results".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "!".yellow(), message);
}
