//! Configurator request and verdict types

use serde::{Deserialize, Serialize};

use crate::schema::{SchemaError, Validate, Violations};

/// Minimum RAM accepted for an explicit build
pub const MIN_BUILD_RAM_GB: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum DriveType {
    #[serde(rename = "NVMe")]
    Nvme,
    #[serde(rename = "SSD")]
    Ssd,
    #[serde(rename = "HDD")]
    Hdd,
}

impl DriveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveType::Nvme => "NVMe",
            DriveType::Ssd => "SSD",
            DriveType::Hdd => "HDD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageDrive {
    #[serde(rename = "type")]
    pub kind: DriveType,
    #[serde(rename = "sizeGB")]
    pub size_gb: u32,
    pub qty: u32,
}

/// Explicit build description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguratorState {
    pub cpu_model: String,
    #[serde(rename = "ramGB")]
    pub ram_gb: u32,
    #[serde(default)]
    pub storage_drives: Vec<StorageDrive>,
    pub gpu_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_type: Option<String>,
    pub network_speed_gbps: u32,
    pub power_redundancy: bool,
}

impl Validate for ConfiguratorState {
    fn validate(&self) -> Result<(), SchemaError> {
        let mut v = Violations::new();
        if self.cpu_model.trim().is_empty() {
            v.push("cpuModel", "must not be empty");
        }
        v.min_u32("ramGB", self.ram_gb, MIN_BUILD_RAM_GB);
        for (i, drive) in self.storage_drives.iter().enumerate() {
            v.min_u32(&format!("storageDrives[{i}].sizeGB"), drive.size_gb, 1);
            v.min_u32(&format!("storageDrives[{i}].qty"), drive.qty, 1);
        }
        v.min_u32("networkSpeedGbps", self.network_speed_gbps, 1);
        v.finish()
    }
}

/// Rounded build metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMetrics {
    pub total_cost_monthly: u64,
    pub power_draw_watts: u64,
    pub rack_unit_size: u8,
}

/// Build feasibility verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub hard_blocks: Vec<String>,
    pub warnings: Vec<String>,
    pub metrics: BuildMetrics,
    pub explanation: String,
}
