//! Service configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sizing_core::recommender::MAX_CANDIDATES;
use sizing_core::Operation;

/// Environment variable naming an optional configuration file
pub const CONFIG_FILE_ENV: &str = "SIZING_CONFIG";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SizingConfig {
    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// JSON file replacing the built-in SKU catalog
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Length of a rate-limit window in seconds
    #[serde(default = "default_window_secs")]
    pub rate_limit_window_secs: u64,

    #[serde(default = "default_estimate_limit")]
    pub estimate_limit: u32,

    #[serde(default = "default_validate_limit")]
    pub validate_limit: u32,

    #[serde(default = "default_recommend_limit")]
    pub recommend_limit: u32,

    #[serde(default = "default_leak_limit")]
    pub leak_limit: u32,

    /// Servers returned per recommendation
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_window_secs() -> u64 {
    60
}

fn default_estimate_limit() -> u32 {
    30
}

fn default_validate_limit() -> u32 {
    50
}

fn default_recommend_limit() -> u32 {
    20
}

fn default_leak_limit() -> u32 {
    60
}

fn default_max_candidates() -> usize {
    MAX_CANDIDATES
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            catalog_path: None,
            rate_limit_window_secs: default_window_secs(),
            estimate_limit: default_estimate_limit(),
            validate_limit: default_validate_limit(),
            recommend_limit: default_recommend_limit(),
            leak_limit: default_leak_limit(),
            max_candidates: default_max_candidates(),
        }
    }
}

impl SizingConfig {
    /// Load configuration from the optional config file and environment
    pub fn load() -> Result<Self> {
        let file = std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);
        Self::load_from(file.as_deref())
    }

    /// Load configuration from `file` (if given) overlaid with `SIZING_*` variables
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(config::Environment::with_prefix("SIZING").try_parsing(true))
            .build()
            .context("failed to read service configuration")?;

        config
            .try_deserialize()
            .context("invalid service configuration")
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs.max(1))
    }

    /// Requests allowed per window for an operation
    pub fn limit_for(&self, op: Operation) -> u32 {
        match op {
            Operation::Estimate => self.estimate_limit,
            Operation::Validate => self.validate_limit,
            Operation::Recommend => self.recommend_limit,
            Operation::Leak => self.leak_limit,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SizingConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.limit_for(Operation::Estimate), 30);
        assert_eq!(config.limit_for(Operation::Validate), 50);
        assert_eq!(config.limit_for(Operation::Recommend), 20);
        assert_eq!(config.limit_for(Operation::Leak), 60);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
        assert_eq!(config.max_candidates, 3);
    }

    #[test]
    fn test_load_from_file_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"port": 9090, "recommend_limit": 5, "max_candidates": 2, "catalog_path": "/etc/sizing/catalog.json"}}"#
        )
        .unwrap();

        let config = SizingConfig::load_from(Some(file.path())).unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.recommend_limit, 5);
        assert_eq!(config.estimate_limit, 30);
        assert_eq!(config.max_candidates, 2);
        assert_eq!(
            config.catalog_path.as_deref(),
            Some(Path::new("/etc/sizing/catalog.json"))
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = SizingConfig::load_from(Some(Path::new("/nonexistent/sizing.json")));
        assert!(result.is_err());
    }
}
