//! Workload estimator
//!
//! Maps a declared workload to a hardware envelope. Workload-specific rules
//! run first, headroom is applied last so rounding never erodes a workload
//! minimum. Every rule that fires is recorded in the breakdown.

mod model;

pub use model::{
    Breakdown, Environment, EstimateOutputs, EstimatorResult, ModelSize, RecommendedSpec,
    TrafficPattern, WorkloadIntent, WorkloadType,
};

use tracing::debug;

pub const BASE_CPU_CORES: u32 = 2;
pub const BASE_RAM_GB: u32 = 4;
pub const BASE_STORAGE_GB: f64 = 50.0;
pub const BASE_NETWORK_GBPS: u32 = 1;

/// Requests per second a single core is assumed to serve
pub const RPS_PER_CORE: f64 = 250.0;
/// Used when a web workload does not state its request rate
pub const DEFAULT_RPS: f64 = 50.0;
/// Used when a database workload does not state its dataset size
pub const DEFAULT_DATASET_GB: f64 = 10.0;
/// Database users a single core is assumed to serve
pub const USERS_PER_DB_CORE: f64 = 50.0;

/// Largest request rate accepted; keeps every sized field within u32 after headroom
pub const MAX_REQUESTS_PER_SECOND: f64 = 1.0e9;
/// Largest dataset accepted (100 PB)
pub const MAX_DATASET_GB: f64 = 1.0e8;

impl TrafficPattern {
    /// Headroom multiplier and the assumption it encodes
    pub fn headroom(&self) -> (f64, &'static str) {
        match self {
            TrafficPattern::Bursty => (2.0, "Bursty traffic requires 100% headroom buffer."),
            TrafficPattern::PredictableSpikes => {
                (1.5, "Predictable spikes require 50% headroom buffer.")
            }
            TrafficPattern::Constant => (1.2, "Constant traffic requires 20% standard headroom."),
        }
    }
}

/// Working envelope before headroom
struct Envelope {
    cpu: u32,
    ram: u32,
    storage: f64,
    gpu: u32,
    gpu_type: Option<&'static str>,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            cpu: BASE_CPU_CORES,
            ram: BASE_RAM_GB,
            storage: BASE_STORAGE_GB,
            gpu: 0,
            gpu_type: None,
        }
    }
}

/// Estimate the hardware envelope for a workload
///
/// Total over validated input; the same intent always yields the same result.
pub fn estimate(intent: &WorkloadIntent) -> EstimatorResult {
    let mut assumptions = Vec::new();
    let mut formulas = Vec::new();
    let mut env = Envelope::default();

    let (headroom, rationale) = intent.traffic_pattern.headroom();
    assumptions.push(rationale.to_string());

    match intent.workload_type {
        WorkloadType::WebServer => {
            let rps = stated_or(intent.requests_per_second, DEFAULT_RPS);
            let core_req = ceil_u32(rps / RPS_PER_CORE);
            env.cpu = env.cpu.max(core_req);
            env.ram = env.ram.max(env.cpu.saturating_mul(2));
            formulas.push(format!(
                "CPU = Max({BASE_CPU_CORES}, Ceil({rps} RPS / {RPS_PER_CORE} per core))"
            ));
            formulas.push("RAM = CPU * 2GB".to_string());
        }
        WorkloadType::Database => {
            let data = stated_or(intent.dataset_size_gb, DEFAULT_DATASET_GB);
            env.cpu = 4u32.max(ceil_u32(intent.user_count as f64 / USERS_PER_DB_CORE));
            env.ram = 8u32.max(ceil_u32(data * 1.5));
            env.storage = (data * 3.0).max(100.0);
            formulas.push(format!(
                "CPU = Max(4, Ceil({} users / {USERS_PER_DB_CORE} per core))",
                intent.user_count
            ));
            formulas.push(format!("RAM = Dataset ({data}GB) * 1.5 multiplier"));
            formulas.push("Storage = Dataset * 3 (for logs/backups)".to_string());
        }
        WorkloadType::AiMl => {
            env.gpu = 1;
            env.cpu = 8;
            env.ram = 32;
            match intent.model_size_params {
                Some(ModelSize::Xlarge) => {
                    env.gpu_type = Some("A100-80GB");
                    env.ram = 128;
                    formulas.push("LLM (70B+) requires A100-80GB class GPU.".to_string());
                    formulas.push("RAM = 128GB for xlarge model staging".to_string());
                }
                Some(ModelSize::Large) => {
                    env.gpu_type = Some("A10G");
                    env.ram = 64;
                    formulas.push("Large model requires A10G class GPU.".to_string());
                    formulas.push("RAM = 64GB for large model staging".to_string());
                }
                _ => {
                    env.gpu_type = Some("T4");
                    formulas.push("Small/medium model fits a T4 class GPU.".to_string());
                }
            }
            formulas.push("CPU = 8 cores to drive one GPU".to_string());
        }
        WorkloadType::StorageNode | WorkloadType::GeneralCompute => {
            assumptions.push(format!(
                "No dedicated sizing rules for {} workloads; base envelope applied.",
                intent.workload_type.as_str()
            ));
        }
    }

    let cpu = ceil_u32(env.cpu as f64 * headroom);
    let ram = ceil_u32(env.ram as f64 * headroom);
    let storage = ceil_u32(env.storage);

    debug!(
        workload = intent.workload_type.as_str(),
        headroom = headroom,
        cpu_before = env.cpu,
        ram_before = env.ram,
        cpu_cores = cpu,
        ram_gb = ram,
        "Workload estimate computed"
    );

    EstimatorResult {
        recommended_spec: RecommendedSpec {
            cpu_cores: cpu,
            ram_gb: ram,
            storage_gb: storage,
            network_gbps: BASE_NETWORK_GBPS,
            gpu_count: env.gpu,
            gpu_type: env.gpu_type.map(str::to_string),
        },
        headroom_factor: headroom,
        breakdown: Breakdown {
            inputs: intent.clone(),
            assumptions,
            formulas,
            outputs: EstimateOutputs {
                cpu,
                ram,
                storage,
                gpu: env.gpu,
            },
        },
    }
}

/// A stated figure of zero means "not stated"
fn stated_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| *v > 0.0).unwrap_or(default)
}

/// Round up to a whole unit; sizing never rounds down
///
/// Saturates at `u32::MAX`. Validated input stays well below it.
fn ceil_u32(value: f64) -> u32 {
    value.ceil().clamp(0.0, u32::MAX as f64) as u32
}
