//! Catalog listing command

use anyhow::Result;

use super::recommend::SkuRow;
use crate::client::Backend;
use crate::output::{print_json, print_rows, OutputFormat};

/// List the server catalog
pub async fn run(backend: &Backend, format: OutputFormat) -> Result<()> {
    let skus = backend.catalog().await?;

    match format {
        OutputFormat::Json => print_json(&skus)?,
        OutputFormat::Table => print_rows(skus.iter().map(SkuRow::from).collect::<Vec<_>>()),
    }

    Ok(())
}
