//! SKU catalog
//!
//! The built-in inventory can be replaced by a JSON file holding an array of
//! SKUs. A replacement is checked before it is accepted.

use std::collections::HashSet;
use std::path::Path;

use super::model::{ServerSku, StorageType};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog is empty")]
    Empty,

    #[error("duplicate SKU id: {0}")]
    DuplicateId(String),

    #[error("SKU {id} is invalid: {reason}")]
    InvalidSku { id: String, reason: String },
}

/// Validated list of purchasable SKUs
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    skus: Vec<ServerSku>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists and malformed entries
    pub fn new(skus: Vec<ServerSku>) -> Result<Self, CatalogError> {
        if skus.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for sku in &skus {
            if !seen.insert(sku.id.as_str()) {
                return Err(CatalogError::DuplicateId(sku.id.clone()));
            }
            let reason = if sku.cpu_cores == 0 {
                Some("cpuCores must be at least 1")
            } else if sku.ram_gb == 0 {
                Some("ramGb must be at least 1")
            } else if sku.storage_gb == 0 {
                Some("storageGb must be at least 1")
            } else if !sku.price_monthly.is_finite() || sku.price_monthly < 0.0 {
                Some("priceMonthly must be a non-negative number")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(CatalogError::InvalidSku {
                    id: sku.id.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        Ok(Self { skus })
    }

    /// Load a catalog from a JSON array of SKUs
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let skus: Vec<ServerSku> = serde_json::from_str(&content)?;
        Self::new(skus)
    }

    pub fn skus(&self) -> &[ServerSku] {
        &self.skus
    }

    pub fn len(&self) -> usize {
        self.skus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skus.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            skus: builtin_skus(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn sku(
    id: &str,
    name: &str,
    cpu_cores: u32,
    ram_gb: u32,
    storage_gb: u32,
    storage_type: StorageType,
    gpu_vram_gb: Option<u32>,
    price_monthly: f64,
) -> ServerSku {
    ServerSku {
        id: id.to_string(),
        name: name.to_string(),
        cpu_cores,
        ram_gb,
        storage_gb,
        storage_type,
        gpu_vram_gb,
        price_monthly,
    }
}

fn builtin_skus() -> Vec<ServerSku> {
    use StorageType::{Nvme, Ssd};

    vec![
        sku("edge-1", "Edge-1 Micro", 4, 8, 256, Ssd, None, 49.0),
        sku("std-2", "Standard-2 General", 8, 32, 1024, Nvme, None, 129.0),
        sku("cache-2", "Cache-2 MemOpt", 8, 64, 256, Ssd, None, 179.0),
        sku("db-opt-4", "DB-Opt-4 HighMem", 16, 128, 4096, Nvme, None, 299.0),
        sku("ml-t4", "Tensor-T4", 8, 64, 1024, Nvme, Some(16), 349.0),
        sku("beast-x", "Beast-X Extreme", 64, 512, 16384, Nvme, None, 599.0),
        sku("ml-a100", "Tensor-A100", 32, 256, 8192, Nvme, Some(80), 899.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 7);
        assert!(Catalog::new(catalog.skus().to_vec()).is_ok());
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(Catalog::new(vec![]), Err(CatalogError::Empty)));

        let mut skus = builtin_skus();
        skus.push(skus[0].clone());
        match Catalog::new(skus) {
            Err(CatalogError::DuplicateId(id)) => assert_eq!(id, "edge-1"),
            other => panic!("expected duplicate id, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_zero_capacity_and_negative_price() {
        let mut skus = builtin_skus();
        skus[1].ram_gb = 0;
        assert!(matches!(
            Catalog::new(skus),
            Err(CatalogError::InvalidSku { .. })
        ));

        let mut skus = builtin_skus();
        skus[2].price_monthly = -1.0;
        assert!(matches!(
            Catalog::new(skus),
            Err(CatalogError::InvalidSku { .. })
        ));
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"tiny","name":"Tiny","cpuCores":2,"ramGb":4,"storageGb":64,"storageType":"ssd","priceMonthly":19}}]"#
        )
        .unwrap();

        let catalog = Catalog::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.skus()[0].storage_type, StorageType::Ssd);
        assert_eq!(catalog.skus()[0].gpu_vram_gb, None);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            Catalog::from_json_file(file.path()),
            Err(CatalogError::Parse(_))
        ));
    }
}
