//! Subcommand implementations

pub mod catalog;
pub mod estimate;
pub mod leak;
pub mod recommend;
pub mod validate;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use sizing_core::{parse_request, Validate};
use std::path::Path;

use crate::client::schema_error;

/// Read and validate a JSON request body from a file
pub fn read_request<T: DeserializeOwned + Validate>(path: &Path) -> Result<T> {
    let body = std::fs::read(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    parse_request(&body)
        .map_err(schema_error)
        .with_context(|| format!("Invalid request in {}", path.display()))
}

/// Unwrap a flag that clap only enforces when `--input` is absent
pub(crate) fn required<T>(value: Option<T>, flag: &str) -> Result<T> {
    value.with_context(|| format!("{} is required unless --input is given", flag))
}
