//! Server recommendation engine
//!
//! Derives a requirement envelope from a coarse workload intent, filters the
//! SKU catalog down to entries that satisfy every dimension and reports the
//! dimension that binds hardest on the cheapest match.

mod catalog;
mod model;

pub use catalog::{Catalog, CatalogError};
pub use model::{
    AppType, Persistence, RecommendationExplanation, RecommendationResponse, ServerRequirements,
    ServerSku, StorageType, TrafficLevel, WorkloadIntentLite,
};

use tracing::debug;

/// Candidates returned per recommendation
pub const MAX_CANDIDATES: usize = 3;

pub const DEFAULT_DB_DATA_GB: f64 = 10.0;
pub const DEFAULT_CACHE_DATA_GB: f64 = 4.0;
pub const DEFAULT_MODEL_GB: f64 = 7.0;

/// Largest data or model size accepted (100 PB)
pub const MAX_SIZE_GB: f64 = 1.0e8;

impl TrafficLevel {
    /// Base (cores, RAM GB) for the traffic tier
    fn base(&self) -> (f64, f64) {
        match self {
            TrafficLevel::Low => (1.0, 2.0),
            TrafficLevel::Medium => (2.0, 4.0),
            TrafficLevel::High => (4.0, 8.0),
        }
    }
}

impl Persistence {
    /// Safety multiplier applied to every requirement dimension
    pub fn headroom(&self) -> f64 {
        match self {
            Persistence::Ephemeral => 1.2,
            Persistence::Persistent => 1.5,
        }
    }
}

/// Requirement dimension compared against a SKU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Cpu,
    Ram,
    Storage,
    GpuVram,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Cpu => "CPU",
            Dimension::Ram => "RAM",
            Dimension::Storage => "Storage",
            Dimension::GpuVram => "GPU VRAM",
        }
    }
}

/// Derive the minimum envelope for a workload, headroom included
pub fn calculate_requirements(intent: &WorkloadIntentLite) -> ServerRequirements {
    let (tier_cpu, tier_ram) = intent.traffic.base();
    let persistent = intent.persistence == Persistence::Persistent;
    let general_media = if persistent {
        StorageType::Nvme
    } else {
        StorageType::Ssd
    };

    let (cpu, ram, storage, vram, storage_type, description) = match intent.app_type {
        AppType::Web => (
            tier_cpu,
            tier_ram,
            20.0,
            None,
            general_media,
            "CPU/RAM based on traffic",
        ),
        AppType::Db => {
            let data = intent.data_size_gb.unwrap_or(DEFAULT_DB_DATA_GB);
            (
                tier_cpu * 2.0,
                tier_ram.max(data * 2.0),
                (data * 1.2).max(20.0),
                None,
                StorageType::Nvme,
                "RAM sized to keep the working set in memory",
            )
        }
        AppType::Cache => {
            let data = intent.data_size_gb.unwrap_or(DEFAULT_CACHE_DATA_GB);
            (
                tier_cpu,
                tier_ram.max(data * 1.5),
                20.0,
                None,
                general_media,
                "RAM sized to hold the cached dataset",
            )
        }
        AppType::Ml => {
            let model = intent.model_size_gb.unwrap_or(DEFAULT_MODEL_GB);
            (
                tier_cpu.max(4.0),
                tier_ram.max(model * 1.5),
                (model * 2.0).max(50.0),
                Some(model * 1.2),
                StorageType::Nvme,
                "GPU VRAM sized to hold model weights",
            )
        }
    };

    let headroom = intent.persistence.headroom();
    ServerRequirements {
        min_cpu_cores: scale(cpu, headroom),
        min_ram_gb: scale(ram, headroom),
        min_storage_gb: scale(storage, headroom),
        storage_type,
        min_gpu_vram_gb: vram.map(|v| scale(v, headroom)),
        description: description.to_string(),
    }
}

fn scale(value: f64, headroom: f64) -> u32 {
    (value * headroom).ceil().clamp(0.0, u32::MAX as f64) as u32
}

/// Whether a SKU satisfies every requirement dimension
pub fn satisfies(sku: &ServerSku, req: &ServerRequirements) -> bool {
    sku.cpu_cores >= req.min_cpu_cores
        && sku.ram_gb >= req.min_ram_gb
        && sku.storage_gb >= req.min_storage_gb
        && sku.storage_type >= req.storage_type
        && req
            .min_gpu_vram_gb
            .map_or(true, |vram| sku.gpu_vram_gb.unwrap_or(0) >= vram)
}

/// Requirement over capacity per dimension; infinite when capacity is zero
fn utilization(
    req: &ServerRequirements,
    cpu: u32,
    ram: u32,
    storage: u32,
    vram: u32,
) -> Vec<(Dimension, f64)> {
    let ratio = |need: u32, have: u32| {
        if have == 0 {
            f64::INFINITY
        } else {
            need as f64 / have as f64
        }
    };

    let mut dims = vec![
        (Dimension::Cpu, ratio(req.min_cpu_cores, cpu)),
        (Dimension::Ram, ratio(req.min_ram_gb, ram)),
        (Dimension::Storage, ratio(req.min_storage_gb, storage)),
    ];
    if let Some(need) = req.min_gpu_vram_gb {
        dims.push((Dimension::GpuVram, ratio(need, vram)));
    }
    dims
}

/// Highest ratio wins; earlier dimensions win ties
fn most_binding(dims: Vec<(Dimension, f64)>) -> Dimension {
    let mut best = (Dimension::Cpu, f64::NEG_INFINITY);
    for (dim, ratio) in dims {
        if ratio > best.1 {
            best = (dim, ratio);
        }
    }
    best.0
}

/// Recommends SKUs from a catalog
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Catalog,
    max_candidates: usize,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl Recommender {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            max_candidates: MAX_CANDIDATES,
        }
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates.max(1);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Produce the requirement envelope and the cheapest qualifying SKUs
    pub fn recommend(&self, intent: &WorkloadIntentLite) -> RecommendationResponse {
        let requirements = calculate_requirements(intent);

        let mut matches: Vec<ServerSku> = self
            .catalog
            .skus()
            .iter()
            .filter(|sku| satisfies(sku, &requirements))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            a.price_monthly
                .total_cmp(&b.price_monthly)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(self.max_candidates);

        let bottleneck = match matches.first() {
            Some(cheapest) => most_binding(utilization(
                &requirements,
                cheapest.cpu_cores,
                cheapest.ram_gb,
                cheapest.storage_gb,
                cheapest.gpu_vram_gb.unwrap_or(0),
            )),
            None => self.shortfall(&requirements),
        };

        let headroom = intent.persistence.headroom();
        let explanation = RecommendationExplanation {
            bottleneck: bottleneck.label().to_string(),
            headroom: format!(
                "{}% headroom for {} workloads",
                ((headroom - 1.0) * 100.0).round() as u32,
                intent.persistence.as_str()
            ),
            factor: format!("{headroom}x"),
        };

        debug!(
            min_cpu = requirements.min_cpu_cores,
            min_ram = requirements.min_ram_gb,
            candidates = matches.len(),
            bottleneck = bottleneck.label(),
            "Server recommendation computed"
        );

        RecommendationResponse {
            requirements,
            recommendations: matches,
            explanation,
        }
    }

    /// Dimension that exceeds the largest catalog capacity by the widest margin
    fn shortfall(&self, req: &ServerRequirements) -> Dimension {
        let skus = self.catalog.skus();
        let max_of = |f: fn(&ServerSku) -> u32| skus.iter().map(f).max().unwrap_or(0);
        most_binding(utilization(
            req,
            max_of(|s| s.cpu_cores),
            max_of(|s| s.ram_gb),
            max_of(|s| s.storage_gb),
            max_of(|s| s.gpu_vram_gb.unwrap_or(0)),
        ))
    }
}

/// Recommend against the built-in catalog
pub fn recommend(intent: &WorkloadIntentLite) -> RecommendationResponse {
    Recommender::default().recommend(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Validate;

    fn intent(app_type: AppType, traffic: TrafficLevel, persistence: Persistence) -> WorkloadIntentLite {
        WorkloadIntentLite {
            app_type,
            traffic,
            persistence,
            data_size_gb: None,
            model_size_gb: None,
        }
    }

    #[test]
    fn test_web_medium_requirements() {
        let req = calculate_requirements(&intent(
            AppType::Web,
            TrafficLevel::Medium,
            Persistence::Ephemeral,
        ));

        assert_eq!(req.min_cpu_cores, 3);
        assert_eq!(req.min_ram_gb, 5);
        assert_eq!(req.min_storage_gb, 24);
        assert_eq!(req.storage_type, StorageType::Ssd);
        assert_eq!(req.description, "CPU/RAM based on traffic");
    }

    #[test]
    fn test_db_high_requirements() {
        let mut db = intent(AppType::Db, TrafficLevel::High, Persistence::Persistent);
        db.data_size_gb = Some(50.0);

        let req = calculate_requirements(&db);

        assert_eq!(req.min_cpu_cores, 12);
        assert_eq!(req.min_ram_gb, 150);
        assert_eq!(req.min_storage_gb, 90);
        assert_eq!(req.storage_type, StorageType::Nvme);
    }

    #[test]
    fn test_ml_requirements_include_vram() {
        let mut ml = intent(AppType::Ml, TrafficLevel::Low, Persistence::Ephemeral);
        ml.model_size_gb = Some(10.0);

        let req = calculate_requirements(&ml);

        assert_eq!(req.min_cpu_cores, 5);
        assert_eq!(req.min_ram_gb, 18);
        assert_eq!(req.min_gpu_vram_gb, Some(15));
    }

    #[test]
    fn test_cheapest_fit_first_with_cpu_bottleneck() {
        let response = recommend(&intent(
            AppType::Web,
            TrafficLevel::Medium,
            Persistence::Ephemeral,
        ));

        assert_eq!(response.recommendations[0].id, "edge-1");
        assert_eq!(response.explanation.bottleneck, "CPU");
        assert_eq!(response.explanation.factor, "1.2x");
        assert_eq!(
            response.explanation.headroom,
            "20% headroom for ephemeral workloads"
        );
    }

    #[test]
    fn test_db_bottleneck_is_ram() {
        let mut db = intent(AppType::Db, TrafficLevel::High, Persistence::Persistent);
        db.data_size_gb = Some(50.0);

        let response = recommend(&db);

        let ids: Vec<_> = response.recommendations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["beast-x", "ml-a100"]);
        assert_eq!(response.explanation.bottleneck, "RAM");
        assert_eq!(response.explanation.factor, "1.5x");
    }

    #[test]
    fn test_ml_picks_gpu_sku() {
        let mut ml = intent(AppType::Ml, TrafficLevel::Low, Persistence::Ephemeral);
        ml.model_size_gb = Some(10.0);

        let response = recommend(&ml);

        assert_eq!(response.recommendations[0].id, "ml-t4");
        assert_eq!(response.explanation.bottleneck, "GPU VRAM");
    }

    #[test]
    fn test_list_is_capped() {
        let response = recommend(&intent(
            AppType::Web,
            TrafficLevel::Low,
            Persistence::Ephemeral,
        ));

        assert_eq!(response.recommendations.len(), MAX_CANDIDATES);
    }

    #[test]
    fn test_max_candidates_is_configurable() {
        let web = intent(AppType::Web, TrafficLevel::Low, Persistence::Ephemeral);

        let one = Recommender::default().with_max_candidates(1).recommend(&web);
        assert_eq!(one.recommendations.len(), 1);
        assert_eq!(one.recommendations[0].id, "edge-1");

        let floor = Recommender::default().with_max_candidates(0).recommend(&web);
        assert_eq!(floor.recommendations.len(), 1);
    }

    #[test]
    fn test_largest_accepted_data_size_fits() {
        let mut db = intent(AppType::Db, TrafficLevel::High, Persistence::Persistent);
        db.data_size_gb = Some(MAX_SIZE_GB);
        assert!(db.validate().is_ok());

        let req = calculate_requirements(&db);

        // 1e8 * 2 * 1.5 headroom
        assert_eq!(req.min_ram_gb, 300_000_000);
    }

    #[test]
    fn test_rejects_sizes_beyond_representable_envelope() {
        let mut ml = intent(AppType::Ml, TrafficLevel::Low, Persistence::Ephemeral);
        ml.data_size_gb = Some(1e10);
        ml.model_size_gb = Some(1e12);

        let err = ml.validate().unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["dataSizeGb", "modelSizeGb"]);
    }

    #[test]
    fn test_no_fit_reports_shortfall() {
        let mut ml = intent(AppType::Ml, TrafficLevel::High, Persistence::Persistent);
        ml.model_size_gb = Some(200.0);

        let response = recommend(&ml);

        assert!(response.recommendations.is_empty());
        assert_eq!(response.explanation.bottleneck, "GPU VRAM");
    }

    #[test]
    fn test_custom_catalog_without_gpus() {
        let catalog = Catalog::new(vec![ServerSku {
            id: "plain".to_string(),
            name: "Plain".to_string(),
            cpu_cores: 64,
            ram_gb: 1024,
            storage_gb: 10_000,
            storage_type: StorageType::Nvme,
            gpu_vram_gb: None,
            price_monthly: 10.0,
        }])
        .unwrap();

        let response = Recommender::new(catalog)
            .recommend(&intent(AppType::Ml, TrafficLevel::Low, Persistence::Ephemeral));

        assert!(response.recommendations.is_empty());
        assert_eq!(response.explanation.bottleneck, "GPU VRAM");
    }

    #[test]
    fn test_every_candidate_fits_and_is_sorted() {
        for app in [AppType::Web, AppType::Db, AppType::Cache, AppType::Ml] {
            for traffic in [TrafficLevel::Low, TrafficLevel::Medium, TrafficLevel::High] {
                for persistence in [Persistence::Ephemeral, Persistence::Persistent] {
                    let response = recommend(&intent(app, traffic, persistence));
                    for sku in &response.recommendations {
                        assert!(satisfies(sku, &response.requirements));
                    }
                    for pair in response.recommendations.windows(2) {
                        assert!(pair[0].price_monthly <= pair[1].price_monthly);
                    }
                }
            }
        }
    }

    #[test]
    fn test_hdd_sku_never_meets_ssd_requirement() {
        let mut sku = Catalog::default().skus()[0].clone();
        sku.storage_type = StorageType::Hdd;
        let req = calculate_requirements(&intent(
            AppType::Web,
            TrafficLevel::Low,
            Persistence::Ephemeral,
        ));

        assert!(!satisfies(&sku, &req));
    }
}
