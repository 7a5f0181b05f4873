//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use sizing_core::leak::{RemediationKind, RiskBand};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table
pub fn print_rows<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    println!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a monthly USD amount
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format gigabytes, switching to terabytes above 1024
pub fn format_gb(gb: u32) -> String {
    if gb >= 1024 && gb % 1024 == 0 {
        format!("{} TB", gb / 1024)
    } else {
        format!("{} GB", gb)
    }
}

/// Color a risk band
pub fn color_band(band: RiskBand) -> String {
    match band {
        RiskBand::Low => band.as_str().green().to_string(),
        RiskBand::Medium => band.as_str().yellow().to_string(),
        RiskBand::High => band.as_str().red().to_string(),
    }
}

/// Color a remediation severity
pub fn color_kind(kind: RemediationKind) -> String {
    match kind {
        RemediationKind::Critical => "critical".red().bold().to_string(),
        RemediationKind::Warning => "warning".yellow().to_string(),
        RemediationKind::Info => "info".blue().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_gb() {
        assert_eq!(format_gb(512), "512 GB");
        assert_eq!(format_gb(4096), "4 TB");
        assert_eq!(format_gb(1500), "1500 GB");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(49.0), "$49.00");
        assert_eq!(format_currency(1234.5), "$1234.50");
    }
}
