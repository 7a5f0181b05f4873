//! Recommendation request and response types

use serde::{Deserialize, Serialize};

use crate::schema::{SchemaError, Validate, Violations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    Web,
    Db,
    Cache,
    Ml,
}

impl AppType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppType::Web => "web",
            AppType::Db => "db",
            AppType::Cache => "cache",
            AppType::Ml => "ml",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TrafficLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    Ephemeral,
    Persistent,
}

impl Persistence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persistence::Ephemeral => "ephemeral",
            Persistence::Persistent => "persistent",
        }
    }
}

/// Storage media, ordered from slowest to fastest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Hdd,
    Ssd,
    Nvme,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Hdd => "hdd",
            StorageType::Ssd => "ssd",
            StorageType::Nvme => "nvme",
        }
    }
}

/// Coarse sizing intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadIntentLite {
    pub app_type: AppType,
    pub traffic: TrafficLevel,
    pub persistence: Persistence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_size_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_size_gb: Option<f64>,
}

impl Validate for WorkloadIntentLite {
    fn validate(&self) -> Result<(), SchemaError> {
        let mut v = Violations::new();
        v.optional_at_most("dataSizeGb", self.data_size_gb, super::MAX_SIZE_GB);
        v.optional_at_most("modelSizeGb", self.model_size_gb, super::MAX_SIZE_GB);
        v.finish()
    }
}

/// Minimum envelope a SKU must satisfy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRequirements {
    pub min_cpu_cores: u32,
    pub min_ram_gb: u32,
    pub min_storage_gb: u32,
    pub storage_type: StorageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_gpu_vram_gb: Option<u32>,
    pub description: String,
}

/// Catalog entry with a fixed monthly price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSku {
    pub id: String,
    pub name: String,
    pub cpu_cores: u32,
    pub ram_gb: u32,
    pub storage_gb: u32,
    pub storage_type: StorageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_vram_gb: Option<u32>,
    pub price_monthly: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationExplanation {
    pub bottleneck: String,
    pub headroom: String,
    pub factor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub requirements: ServerRequirements,
    pub recommendations: Vec<ServerSku>,
    pub explanation: RecommendationExplanation,
}
