//! Build validation command

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use sizing_core::configurator::{DriveType, StorageDrive, ValidationResult};
use sizing_core::ConfiguratorState;
use std::path::PathBuf;
use tabled::Tabled;

use super::{read_request, required};
use crate::client::Backend;
use crate::output::{
    format_currency, print_error, print_heading, print_json, print_rows, print_success,
    print_warning, OutputFormat,
};

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Read the build from a JSON file instead of flags
    #[arg(long, conflicts_with_all = [
        "cpu", "ram", "drive", "gpu_count", "gpu_type", "network", "no_redundancy",
    ])]
    pub input: Option<PathBuf>,

    /// CPU model, e.g. "Intel Xeon Gold" or "AMD Epyc 7763"
    #[arg(long, required_unless_present = "input")]
    pub cpu: Option<String>,

    /// Installed RAM in GB
    #[arg(long, required_unless_present = "input")]
    pub ram: Option<u32>,

    /// Drive group as TYPE:SIZExQTY, e.g. nvme:1000x2 (repeatable)
    #[arg(long, value_parser = parse_drive)]
    pub drive: Vec<StorageDrive>,

    #[arg(long, default_value_t = 0)]
    pub gpu_count: u32,

    /// GPU model, e.g. "A100-80GB"
    #[arg(long)]
    pub gpu_type: Option<String>,

    /// Network speed in Gbps
    #[arg(long, default_value_t = 10)]
    pub network: u32,

    /// Build without redundant power supplies
    #[arg(long)]
    pub no_redundancy: bool,
}

impl ValidateArgs {
    fn build(&self) -> Result<ConfiguratorState> {
        if let Some(path) = &self.input {
            return read_request(path);
        }

        Ok(ConfiguratorState {
            cpu_model: required(self.cpu.clone(), "--cpu")?,
            ram_gb: required(self.ram, "--ram")?,
            storage_drives: self.drive.clone(),
            gpu_count: self.gpu_count,
            gpu_type: self.gpu_type.clone(),
            network_speed_gbps: self.network,
            power_redundancy: !self.no_redundancy,
        })
    }
}

/// Parse a drive group given as TYPE:SIZExQTY; QTY defaults to 1
pub fn parse_drive(value: &str) -> Result<StorageDrive, String> {
    let (kind, rest) = value
        .split_once(':')
        .ok_or_else(|| format!("expected TYPE:SIZExQTY, got '{}'", value))?;
    let kind = DriveType::from_str(kind.trim(), true)
        .map_err(|_| format!("unknown drive type '{}' (nvme, ssd, hdd)", kind))?;

    let (size, qty) = match rest.split_once(['x', 'X']) {
        Some((size, qty)) => (size, qty),
        None => (rest, "1"),
    };
    let size_gb = size
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid drive size '{}'", size))?;
    let qty = qty
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid drive quantity '{}'", qty))?;

    Ok(StorageDrive { kind, size_gb, qty })
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Validate an explicit build
pub async fn run(backend: &Backend, args: &ValidateArgs, format: OutputFormat) -> Result<()> {
    let build = args.build()?;
    let result = backend.validate(&build).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            print_heading("Build Validation");
            println!("CPU:                    {}", build.cpu_model.cyan());
            println!();
            print_validation(&result);
        }
    }

    Ok(())
}

/// Print a validation verdict with its metrics
pub fn print_validation(result: &ValidationResult) {
    print_rows(vec![
        MetricRow {
            metric: "Monthly cost",
            value: format_currency(result.metrics.total_cost_monthly as f64),
        },
        MetricRow {
            metric: "Power draw",
            value: format!("{} W", result.metrics.power_draw_watts),
        },
        MetricRow {
            metric: "Rack units",
            value: format!("{}U", result.metrics.rack_unit_size),
        },
    ]);
    println!();

    for block in &result.hard_blocks {
        print_error(block);
    }
    for warning in &result.warnings {
        print_warning(warning);
    }

    if result.is_valid {
        print_success(&result.explanation);
    } else {
        println!("{}", result.explanation.red().bold());
    }
}
