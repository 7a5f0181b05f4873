//! Estimate to build handoff
//!
//! Seeds a configurator build from an estimator envelope so the estimate can
//! be priced and checked for feasibility.

use crate::configurator::{ConfiguratorState, DriveType, StorageDrive, MIN_BUILD_RAM_GB};
use crate::estimator::RecommendedSpec;

/// Above this core count the build moves to the high-density CPU
pub const HIGH_DENSITY_CORES: u32 = 32;

pub const HIGH_DENSITY_CPU: &str = "AMD Epyc 7763";
pub const STANDARD_CPU: &str = "Intel Xeon Gold";

/// Build a configurator state from an estimated envelope
///
/// Storage is split across a mirrored NVMe pair and RAM is raised to the
/// configurator minimum when the estimate is smaller.
pub fn configurator_from_estimate(spec: &RecommendedSpec) -> ConfiguratorState {
    let cpu_model = if spec.cpu_cores > HIGH_DENSITY_CORES {
        HIGH_DENSITY_CPU
    } else {
        STANDARD_CPU
    };

    let half = (spec.storage_gb as f64 / 2.0).round() as u32;

    ConfiguratorState {
        cpu_model: cpu_model.to_string(),
        ram_gb: spec.ram_gb.max(MIN_BUILD_RAM_GB),
        storage_drives: vec![StorageDrive {
            kind: DriveType::Nvme,
            size_gb: half.max(1),
            qty: 2,
        }],
        gpu_count: spec.gpu_count,
        gpu_type: spec.gpu_type.clone(),
        network_speed_gbps: spec.network_gbps.max(1),
        power_redundancy: true,
    }
}

impl ConfiguratorState {
    pub fn from_estimate(spec: &RecommendedSpec) -> Self {
        configurator_from_estimate(spec)
    }
}
