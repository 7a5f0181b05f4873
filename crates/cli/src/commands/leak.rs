//! Revenue leak command

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sizing_core::{RevenueLeakInput, RevenueLeakResult};
use std::path::PathBuf;
use tabled::Tabled;

use super::{read_request, required};
use crate::client::Backend;
use crate::output::{
    color_band, color_kind, format_currency, print_heading, print_json, print_rows, OutputFormat,
};

#[derive(Debug, Args)]
pub struct LeakArgs {
    /// Read the metrics from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["revenue", "conversion", "response_minutes"])]
    pub input: Option<PathBuf>,

    /// Monthly revenue
    #[arg(long, required_unless_present = "input")]
    pub revenue: Option<f64>,

    /// Conversion rate in percent
    #[arg(long, required_unless_present = "input")]
    pub conversion: Option<f64>,

    /// Average lead response time in minutes
    #[arg(long, required_unless_present = "input")]
    pub response_minutes: Option<f64>,
}

impl LeakArgs {
    fn input(&self) -> Result<RevenueLeakInput> {
        if let Some(path) = &self.input {
            return read_request(path);
        }

        Ok(RevenueLeakInput {
            revenue: required(self.revenue, "--revenue")?,
            conversion_rate: required(self.conversion, "--conversion")?,
            response_time_minutes: required(self.response_minutes, "--response-minutes")?,
        })
    }
}

#[derive(Tabled)]
struct RemediationRow {
    #[tabled(rename = "Severity")]
    kind: String,
    #[tabled(rename = "Issue")]
    issue: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Link")]
    link: String,
}

/// Score revenue leak risk
pub async fn run(backend: &Backend, args: &LeakArgs, format: OutputFormat) -> Result<()> {
    let input = args.input()?;
    let result = backend.score_leak(&input).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => print_leak(&result),
    }

    Ok(())
}

fn print_leak(result: &RevenueLeakResult) {
    print_heading("Revenue Leak Assessment");
    println!(
        "Risk score:             {} ({})",
        result.risk_score.to_string().bold(),
        color_band(result.band)
    );
    println!(
        "{}  {}",
        "Estimated monthly leak:".bold(),
        format_currency(result.monthly_leak as f64).red().bold()
    );
    println!();

    let rows: Vec<RemediationRow> = result
        .remediation
        .iter()
        .map(|r| RemediationRow {
            kind: color_kind(r.kind),
            issue: r.issue.clone(),
            action: r.action.clone(),
            link: r.link.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    print_rows(rows);
}
