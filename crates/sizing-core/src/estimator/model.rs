//! Estimator request and result types

use serde::{Deserialize, Serialize};

use crate::schema::{SchemaError, Validate, Violations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum WorkloadType {
    WebServer,
    Database,
    AiMl,
    StorageNode,
    GeneralCompute,
}

impl WorkloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadType::WebServer => "web_server",
            WorkloadType::Database => "database",
            WorkloadType::AiMl => "ai_ml",
            WorkloadType::StorageNode => "storage_node",
            WorkloadType::GeneralCompute => "general_compute",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum TrafficPattern {
    Constant,
    Bursty,
    PredictableSpikes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Staging,
    Dev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Small,
    Medium,
    Large,
    Xlarge,
}

/// Declared workload shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadIntent {
    pub workload_type: WorkloadType,
    pub traffic_pattern: TrafficPattern,
    pub user_count: u32,
    pub environment: Environment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<f64>,
    #[serde(default, rename = "datasetSizeGB", skip_serializing_if = "Option::is_none")]
    pub dataset_size_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_size_params: Option<ModelSize>,
    #[serde(default, rename = "storageCapacityTB", skip_serializing_if = "Option::is_none")]
    pub storage_capacity_tb: Option<f64>,
}

impl WorkloadIntent {
    /// Intent with only the required fields set
    pub fn new(
        workload_type: WorkloadType,
        traffic_pattern: TrafficPattern,
        user_count: u32,
        environment: Environment,
    ) -> Self {
        Self {
            workload_type,
            traffic_pattern,
            user_count,
            environment,
            requests_per_second: None,
            dataset_size_gb: None,
            model_size_params: None,
            storage_capacity_tb: None,
        }
    }
}

impl Validate for WorkloadIntent {
    fn validate(&self) -> Result<(), SchemaError> {
        let mut v = Violations::new();
        v.min_u32("userCount", self.user_count, 1);
        v.optional_at_most(
            "requestsPerSecond",
            self.requests_per_second,
            super::MAX_REQUESTS_PER_SECOND,
        );
        v.optional_at_most("datasetSizeGB", self.dataset_size_gb, super::MAX_DATASET_GB);
        v.optional_non_negative("storageCapacityTB", self.storage_capacity_tb);
        v.finish()
    }
}

/// Final hardware envelope after headroom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedSpec {
    pub cpu_cores: u32,
    #[serde(rename = "ramGB")]
    pub ram_gb: u32,
    #[serde(rename = "storageGB")]
    pub storage_gb: u32,
    pub network_gbps: u32,
    pub gpu_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_type: Option<String>,
}

/// Final figures echoed in the breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateOutputs {
    pub cpu: u32,
    pub ram: u32,
    pub storage: u32,
    pub gpu: u32,
}

/// Auditable record of how an estimate was reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub inputs: WorkloadIntent,
    pub assumptions: Vec<String>,
    pub formulas: Vec<String>,
    pub outputs: EstimateOutputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatorResult {
    pub recommended_spec: RecommendedSpec,
    pub headroom_factor: f64,
    pub breakdown: Breakdown,
}
