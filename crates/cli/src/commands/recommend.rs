//! Server recommendation command

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sizing_core::recommender::{AppType, Persistence, ServerSku, TrafficLevel};
use sizing_core::{RecommendationResponse, WorkloadIntentLite};
use std::path::PathBuf;
use tabled::Tabled;

use super::{read_request, required};
use crate::client::Backend;
use crate::output::{
    format_currency, format_gb, print_heading, print_info, print_json, print_rows, print_warning,
    OutputFormat,
};

#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// Read the intent from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["app", "traffic", "persistence", "data_gb", "model_gb"])]
    pub input: Option<PathBuf>,

    /// Application type
    #[arg(long, value_enum, required_unless_present = "input")]
    pub app: Option<AppType>,

    /// Traffic tier
    #[arg(long, value_enum, required_unless_present = "input")]
    pub traffic: Option<TrafficLevel>,

    #[arg(long, value_enum, default_value = "ephemeral")]
    pub persistence: Persistence,

    /// Data size in GB (db and cache)
    #[arg(long)]
    pub data_gb: Option<f64>,

    /// Model size in GB (ml)
    #[arg(long)]
    pub model_gb: Option<f64>,
}

impl RecommendArgs {
    fn intent(&self) -> Result<WorkloadIntentLite> {
        if let Some(path) = &self.input {
            return read_request(path);
        }

        Ok(WorkloadIntentLite {
            app_type: required(self.app, "--app")?,
            traffic: required(self.traffic, "--traffic")?,
            persistence: self.persistence,
            data_size_gb: self.data_gb,
            model_size_gb: self.model_gb,
        })
    }
}

/// Row for the server table
#[derive(Tabled)]
pub struct SkuRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "CPU")]
    cpu: u32,
    #[tabled(rename = "RAM")]
    ram: String,
    #[tabled(rename = "Storage")]
    storage: String,
    #[tabled(rename = "GPU VRAM")]
    vram: String,
    #[tabled(rename = "Price/mo")]
    price: String,
}

impl From<&ServerSku> for SkuRow {
    fn from(sku: &ServerSku) -> Self {
        Self {
            id: sku.id.clone(),
            name: sku.name.clone(),
            cpu: sku.cpu_cores,
            ram: format_gb(sku.ram_gb),
            storage: format!("{} {}", format_gb(sku.storage_gb), sku.storage_type.as_str()),
            vram: sku
                .gpu_vram_gb
                .map(format_gb)
                .unwrap_or_else(|| "-".to_string()),
            price: format_currency(sku.price_monthly),
        }
    }
}

/// Recommend catalog servers for a coarse intent
pub async fn run(backend: &Backend, args: &RecommendArgs, format: OutputFormat) -> Result<()> {
    let intent = args.intent()?;
    let result = backend.recommend(&intent).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => print_recommendation(&result),
    }

    Ok(())
}

fn print_recommendation(result: &RecommendationResponse) {
    let req = &result.requirements;

    print_heading("Requirements");
    println!("CPU:                    {} cores", req.min_cpu_cores);
    println!("RAM:                    {}", format_gb(req.min_ram_gb));
    println!(
        "Storage:                {} {}",
        format_gb(req.min_storage_gb),
        req.storage_type.as_str()
    );
    if let Some(vram) = req.min_gpu_vram_gb {
        println!("GPU VRAM:               {}", format_gb(vram));
    }
    println!("Basis:                  {}", req.description.dimmed());
    println!();

    if result.recommendations.is_empty() {
        print_warning(&format!(
            "No catalog server satisfies these requirements ({} is the largest shortfall)",
            result.explanation.bottleneck
        ));
    } else {
        print_rows(
            result
                .recommendations
                .iter()
                .map(SkuRow::from)
                .collect::<Vec<_>>(),
        );
        println!();
        println!(
            "{} {}",
            "Bottleneck:".bold(),
            result.explanation.bottleneck.yellow()
        );
    }

    print_info(&format!(
        "{} (factor {})",
        result.explanation.headroom, result.explanation.factor
    ));
}
