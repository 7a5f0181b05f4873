//! Configurator constraint validation
//!
//! Accumulates monthly cost and power draw component by component and
//! classifies the build. An infeasible build is a normal result with
//! `is_valid == false`, not an error.

mod model;

pub use model::{
    BuildMetrics, ConfiguratorState, DriveType, StorageDrive, ValidationResult, MIN_BUILD_RAM_GB,
};

use tracing::debug;

pub const CHASSIS_POWER_WATTS: f64 = 200.0;
pub const CHASSIS_COST_MONTHLY: f64 = 50.0;

pub const RAM_COST_PER_GB: f64 = 4.0;
pub const RAM_WATTS_PER_GB: f64 = 0.5;

/// Above this draw a build without redundant supplies is flagged
pub const REDUNDANCY_THRESHOLD_WATTS: f64 = 1000.0;
/// Above this draw a build needs a 2U chassis
pub const TWO_U_THRESHOLD_WATTS: u64 = 800;

pub const LOW_RAM_WARNING: &str = "Less than 16GB RAM is not recommended for production nodes.";
pub const MISSING_GPU_TYPE_BLOCK: &str = "GPU count > 0 but no GPU type selected.";
pub const NO_REDUNDANCY_WARNING: &str =
    "Power draw > 1000W but no redundancy selected. High risk of failure.";
pub const LOW_POWER_NETWORK_BLOCK: &str = "Cannot drive >40Gbps network with low-power CPU.";
pub const VALID_EXPLANATION: &str = "Configuration is valid for build.";

/// Cost and power added by a CPU family, matched on the model name
fn cpu_profile(cpu_model: &str) -> (f64, f64) {
    if cpu_model.contains("Epyc") {
        (200.0, 180.0)
    } else if cpu_model.contains("Xeon") {
        (180.0, 200.0)
    } else {
        // Unrecognised families carry no adjustment
        (0.0, 0.0)
    }
}

/// Per-unit cost and power of a GPU, matched on the type name
fn gpu_profile(gpu_type: &str) -> (f64, f64) {
    if gpu_type.contains("A100") {
        (800.0, 400.0)
    } else {
        (150.0, 75.0)
    }
}

impl DriveType {
    fn cost_per_gb(&self) -> f64 {
        match self {
            DriveType::Nvme => 0.15,
            DriveType::Ssd | DriveType::Hdd => 0.08,
        }
    }

    fn watts(&self) -> f64 {
        match self {
            DriveType::Nvme => 10.0,
            DriveType::Ssd | DriveType::Hdd => 7.0,
        }
    }
}

/// Classify a build and compute its monthly cost and power draw
pub fn validate(state: &ConfiguratorState) -> ValidationResult {
    let mut hard_blocks = Vec::new();
    let mut warnings = Vec::new();
    let mut power = CHASSIS_POWER_WATTS;
    let mut cost = CHASSIS_COST_MONTHLY;

    let (cpu_cost, cpu_power) = cpu_profile(&state.cpu_model);
    cost += cpu_cost;
    power += cpu_power;

    let ram = state.ram_gb as f64;
    cost += ram * RAM_COST_PER_GB;
    power += ram * RAM_WATTS_PER_GB;
    if state.ram_gb < 16 {
        warnings.push(LOW_RAM_WARNING.to_string());
    }

    for drive in &state.storage_drives {
        let qty = drive.qty as f64;
        cost += qty * drive.size_gb as f64 * drive.kind.cost_per_gb();
        power += qty * drive.kind.watts();
    }

    if state.gpu_count > 0 {
        match state.gpu_type.as_deref() {
            None | Some("") => hard_blocks.push(MISSING_GPU_TYPE_BLOCK.to_string()),
            Some(gpu_type) => {
                let (gpu_cost, gpu_power) = gpu_profile(gpu_type);
                cost += state.gpu_count as f64 * gpu_cost;
                power += state.gpu_count as f64 * gpu_power;
            }
        }
    }

    if power > REDUNDANCY_THRESHOLD_WATTS && !state.power_redundancy {
        warnings.push(NO_REDUNDANCY_WARNING.to_string());
    }

    if state.network_speed_gbps > 40 && state.cpu_model.contains("Atom") {
        hard_blocks.push(LOW_POWER_NETWORK_BLOCK.to_string());
    }

    let power_draw_watts = power.round() as u64;
    let metrics = BuildMetrics {
        total_cost_monthly: cost.round() as u64,
        power_draw_watts,
        rack_unit_size: if power_draw_watts > TWO_U_THRESHOLD_WATTS { 2 } else { 1 },
    };

    let explanation = if hard_blocks.is_empty() {
        VALID_EXPLANATION.to_string()
    } else {
        format!("Configuration invalid due to: {}", hard_blocks.join(", "))
    };

    debug!(
        cpu_model = %state.cpu_model,
        cost = metrics.total_cost_monthly,
        power = metrics.power_draw_watts,
        hard_blocks = hard_blocks.len(),
        warnings = warnings.len(),
        "Build validated"
    );

    ValidationResult {
        is_valid: hard_blocks.is_empty(),
        hard_blocks,
        warnings,
        metrics,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xeon_build() -> ConfiguratorState {
        ConfiguratorState {
            cpu_model: "Intel Xeon Gold".to_string(),
            ram_gb: 32,
            storage_drives: vec![StorageDrive {
                kind: DriveType::Ssd,
                size_gb: 512,
                qty: 1,
            }],
            gpu_count: 0,
            gpu_type: None,
            network_speed_gbps: 10,
            power_redundancy: true,
        }
    }

    #[test]
    fn test_standard_build_is_valid() {
        let result = validate(&xeon_build());

        assert!(result.is_valid);
        assert!(result.hard_blocks.is_empty());
        assert!(result.warnings.is_empty());
        // 50 + 180 + 128 + 40.96
        assert_eq!(result.metrics.total_cost_monthly, 399);
        // 200 + 200 + 16 + 7
        assert_eq!(result.metrics.power_draw_watts, 423);
        assert_eq!(result.metrics.rack_unit_size, 1);
        assert_eq!(result.explanation, VALID_EXPLANATION);
    }

    #[test]
    fn test_gpu_without_type_is_blocked() {
        let mut state = xeon_build();
        state.gpu_count = 1;

        let result = validate(&state);

        assert!(!result.is_valid);
        assert!(result.hard_blocks.contains(&MISSING_GPU_TYPE_BLOCK.to_string()));
        assert_eq!(
            result.explanation,
            "Configuration invalid due to: GPU count > 0 but no GPU type selected."
        );
    }

    #[test]
    fn test_low_ram_warns_but_stays_valid() {
        let mut state = xeon_build();
        state.ram_gb = 8;

        let result = validate(&state);

        assert!(result.is_valid);
        assert!(result.warnings.contains(&LOW_RAM_WARNING.to_string()));
    }

    #[test]
    fn test_a100_pair_needs_redundancy_and_two_u() {
        let state = ConfiguratorState {
            cpu_model: "AMD Epyc 7763".to_string(),
            ram_gb: 256,
            storage_drives: vec![StorageDrive {
                kind: DriveType::Nvme,
                size_gb: 2048,
                qty: 2,
            }],
            gpu_count: 2,
            gpu_type: Some("NVIDIA A100-80GB".to_string()),
            network_speed_gbps: 100,
            power_redundancy: false,
        };

        let result = validate(&state);

        // 200 + 180 + 128 + 20 + 800
        assert_eq!(result.metrics.power_draw_watts, 1328);
        // 50 + 200 + 1024 + 614.4 + 1600
        assert_eq!(result.metrics.total_cost_monthly, 3488);
        assert_eq!(result.metrics.rack_unit_size, 2);
        assert!(result.is_valid);
        assert_eq!(result.warnings, vec![NO_REDUNDANCY_WARNING.to_string()]);
    }

    #[test]
    fn test_other_gpu_types_use_flat_profile() {
        let mut state = xeon_build();
        state.gpu_count = 2;
        state.gpu_type = Some("NVIDIA T4".to_string());

        let result = validate(&state);

        assert_eq!(result.metrics.power_draw_watts, 423 + 150);
        assert_eq!(result.metrics.total_cost_monthly, 399 + 300);
    }

    #[test]
    fn test_atom_cannot_drive_fast_network() {
        let mut state = xeon_build();
        state.cpu_model = "Intel Atom".to_string();
        state.network_speed_gbps = 100;
        state.gpu_count = 1;

        let result = validate(&state);

        assert!(!result.is_valid);
        assert_eq!(
            result.hard_blocks,
            vec![
                MISSING_GPU_TYPE_BLOCK.to_string(),
                LOW_POWER_NETWORK_BLOCK.to_string()
            ]
        );
        assert!(result.explanation.contains(", "));
    }

    #[test]
    fn test_atom_at_forty_gbps_is_allowed() {
        let mut state = xeon_build();
        state.cpu_model = "Intel Atom".to_string();
        state.network_speed_gbps = 40;

        assert!(validate(&state).is_valid);
    }

    #[test]
    fn test_validity_matches_hard_blocks_and_rack_threshold() {
        for gpu_count in 0..4 {
            for gpu_type in [None, Some("A100"), Some("L4")] {
                for ram_gb in [8, 64, 512, 1024] {
                    let mut state = xeon_build();
                    state.gpu_count = gpu_count;
                    state.gpu_type = gpu_type.map(str::to_string);
                    state.ram_gb = ram_gb;

                    let result = validate(&state);
                    assert_eq!(result.is_valid, result.hard_blocks.is_empty());
                    assert_eq!(
                        result.metrics.rack_unit_size == 2,
                        result.metrics.power_draw_watts > 800
                    );
                }
            }
        }
    }

    #[test]
    fn test_schema_rejects_small_ram_and_empty_drives() {
        let json = r#"{
            "cpuModel": "",
            "ramGB": 4,
            "storageDrives": [{"type": "NVMe", "sizeGB": 0, "qty": 0}],
            "gpuCount": 0,
            "networkSpeedGbps": 0,
            "powerRedundancy": true
        }"#;
        let err =
            crate::schema::parse_request::<ConfiguratorState>(json.as_bytes()).unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "cpuModel",
                "ramGB",
                "storageDrives[0].sizeGB",
                "storageDrives[0].qty",
                "networkSpeedGbps"
            ]
        );
    }

    #[test]
    fn test_unknown_drive_type_is_malformed() {
        let json = r#"{
            "cpuModel": "Intel Xeon Gold",
            "ramGB": 32,
            "storageDrives": [{"type": "Tape", "sizeGB": 100, "qty": 1}],
            "gpuCount": 0,
            "networkSpeedGbps": 10,
            "powerRedundancy": true
        }"#;
        let err =
            crate::schema::parse_request::<ConfiguratorState>(json.as_bytes()).unwrap_err();
        assert!(matches!(err, crate::schema::SchemaError::Malformed(_)));
    }
}
