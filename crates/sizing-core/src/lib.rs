//! Hardware sizing engine
//!
//! This crate provides the pure computation behind the sizing service:
//! - Workload estimation (workload shape to hardware envelope)
//! - Build validation (cost, power and feasibility of an explicit build)
//! - Server recommendation against a SKU catalog
//! - Revenue leak risk scoring
//! - Request schema validation, rate limiting and observability helpers

pub mod configurator;
pub mod estimator;
pub mod handoff;
pub mod leak;
pub mod observability;
pub mod ratelimit;
pub mod recommender;
pub mod schema;

pub use configurator::{validate, ConfiguratorState, ValidationResult};
pub use estimator::{estimate, EstimatorResult, WorkloadIntent};
pub use handoff::configurator_from_estimate;
pub use leak::{score_leak, RevenueLeakInput, RevenueLeakResult};
pub use observability::{EngineMetrics, Operation, StructuredLogger};
pub use ratelimit::{FixedWindowLimiter, RateDecision, RateLimiter};
pub use recommender::{recommend, Catalog, CatalogError, RecommendationResponse, Recommender, WorkloadIntentLite};
pub use schema::{parse_request, FieldViolation, SchemaError, Validate};
