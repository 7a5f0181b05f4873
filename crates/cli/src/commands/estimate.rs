//! Workload estimate command

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use sizing_core::configurator::ValidationResult;
use sizing_core::estimator::{Environment, EstimatorResult, ModelSize, TrafficPattern, WorkloadType};
use sizing_core::{ConfiguratorState, WorkloadIntent};
use std::path::PathBuf;
use tabled::Tabled;

use super::{read_request, required};
use crate::client::Backend;
use crate::commands::validate::print_validation;
use crate::output::{format_gb, print_heading, print_info, print_json, print_rows, OutputFormat};

#[derive(Debug, Args)]
pub struct EstimateArgs {
    /// Read the workload intent from a JSON file instead of flags
    #[arg(long, conflicts_with_all = [
        "workload", "traffic", "users", "environment", "rps", "dataset_gb", "model_size",
        "storage_tb",
    ])]
    pub input: Option<PathBuf>,

    /// Workload type
    #[arg(long, value_enum, required_unless_present = "input")]
    pub workload: Option<WorkloadType>,

    /// Traffic pattern
    #[arg(long, value_enum, required_unless_present = "input")]
    pub traffic: Option<TrafficPattern>,

    /// Concurrent users
    #[arg(long, required_unless_present = "input")]
    pub users: Option<u32>,

    /// Deployment environment
    #[arg(long, value_enum, default_value = "production")]
    pub environment: Environment,

    /// Sustained requests per second
    #[arg(long)]
    pub rps: Option<f64>,

    /// Working dataset size in GB
    #[arg(long)]
    pub dataset_gb: Option<f64>,

    /// Model size class for AI/ML workloads
    #[arg(long, value_enum)]
    pub model_size: Option<ModelSize>,

    /// Raw storage capacity in TB
    #[arg(long)]
    pub storage_tb: Option<f64>,

    /// Also turn the estimate into a build and validate it
    #[arg(long)]
    pub handoff: bool,
}

impl EstimateArgs {
    fn intent(&self) -> Result<WorkloadIntent> {
        if let Some(path) = &self.input {
            return read_request(path);
        }

        let mut intent = WorkloadIntent::new(
            required(self.workload, "--workload")?,
            required(self.traffic, "--traffic")?,
            required(self.users, "--users")?,
            self.environment,
        );
        intent.requests_per_second = self.rps;
        intent.dataset_size_gb = self.dataset_gb;
        intent.model_size_params = self.model_size;
        intent.storage_capacity_tb = self.storage_tb;
        Ok(intent)
    }
}

#[derive(Tabled)]
struct SpecRow {
    #[tabled(rename = "Resource")]
    resource: &'static str,
    #[tabled(rename = "Recommended")]
    value: String,
}

/// Estimate hardware for a workload
pub async fn run(backend: &Backend, args: &EstimateArgs, format: OutputFormat) -> Result<()> {
    let intent = args.intent()?;
    let result = backend.estimate(&intent).await?;

    let handoff = if args.handoff {
        let build = ConfiguratorState::from_estimate(&result.recommended_spec);
        let verdict = backend.validate(&build).await?;
        Some((build, verdict))
    } else {
        None
    };

    match format {
        OutputFormat::Json => match &handoff {
            Some((build, verdict)) => print_json(&json!({
                "estimate": result,
                "build": build,
                "validation": verdict,
            }))?,
            None => print_json(&result)?,
        },
        OutputFormat::Table => {
            print_estimate(&intent, &result);
            if let Some((build, verdict)) = &handoff {
                println!();
                print_handoff(build, verdict);
            }
        }
    }

    Ok(())
}

fn print_estimate(intent: &WorkloadIntent, result: &EstimatorResult) {
    let spec = &result.recommended_spec;

    print_heading("Hardware Estimate");
    println!("Workload:               {}", intent.workload_type.as_str().cyan());
    println!("Users:                  {}", intent.user_count);
    println!(
        "Headroom:               {}",
        format!("{}x", result.headroom_factor).bold()
    );
    println!();

    let gpu = match &spec.gpu_type {
        Some(kind) => format!("{} x {}", spec.gpu_count, kind),
        None => "none".to_string(),
    };
    print_rows(vec![
        SpecRow {
            resource: "CPU",
            value: format!("{} cores", spec.cpu_cores),
        },
        SpecRow {
            resource: "RAM",
            value: format_gb(spec.ram_gb),
        },
        SpecRow {
            resource: "Storage",
            value: format_gb(spec.storage_gb),
        },
        SpecRow {
            resource: "Network",
            value: format!("{} Gbps", spec.network_gbps),
        },
        SpecRow {
            resource: "GPU",
            value: gpu,
        },
    ]);

    if !result.breakdown.formulas.is_empty() {
        println!();
        println!("{}", "Formulas".bold());
        for formula in &result.breakdown.formulas {
            println!("  {}", formula);
        }
    }

    println!();
    for assumption in &result.breakdown.assumptions {
        print_info(assumption);
    }
}

fn print_handoff(build: &ConfiguratorState, verdict: &ValidationResult) {
    print_heading("Suggested Build");
    println!("CPU:                    {}", build.cpu_model.cyan());
    println!("RAM:                    {}", format_gb(build.ram_gb));
    for drive in &build.storage_drives {
        println!(
            "Storage:                {} x {} {}",
            drive.qty,
            format_gb(drive.size_gb),
            drive.kind.as_str()
        );
    }
    println!();
    print_validation(verdict);
}
