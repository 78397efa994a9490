//! Pricing resolution and cost projection for fleet-wash reporting.
//!
//! Raw records flow one way through this crate: vehicle and tank/catalog rows
//! are folded into read-only index snapshots, scans are costed against those
//! snapshots, and parameter sets are projected forward or solved backward
//! from a budget. Nothing here performs I/O apart from [`EngineConfig::load`].
//!
//! ```
//! use chrono::Utc;
//! use fleetwash_core::types::{PricingSource, ScanEvent, ScanStatus, VehicleEntitlement};
//! use fleetwash_core::{CostCalculator, EngineConfig, EntitlementIndex, PricingIndex};
//!
//! let config = EngineConfig::default();
//! let entitlements = EntitlementIndex::build(&[VehicleEntitlement {
//!     vehicle_ref: "TRK-12".to_string(),
//!     vehicle_rfid: String::new(),
//!     primary_wash_time_seconds: Some(120.0),
//!     secondary_wash_time_seconds: None,
//! }]);
//! let pricing = PricingIndex::build(&[], &[], &config.pricing);
//! let calculator = CostCalculator::new(&config)?;
//!
//! let scan = ScanEvent {
//!     customer_ref: "CUST-1".to_string(),
//!     customer_name: "Acme Readymix".to_string(),
//!     site_ref: "SITE-1".to_string(),
//!     site_name: "Penrith Plant".to_string(),
//!     vehicle_ref: "TRK-12".to_string(),
//!     vehicle_rfid: String::new(),
//!     device_serial: String::new(),
//!     created_at: Utc::now(),
//!     status: ScanStatus::Success,
//!     wash_time_seconds: None,
//! };
//! let result = calculator.cost(&scan, Some(&entitlements), Some(&pricing));
//!
//! // Two minutes at the NSW fallback of 5 L/min and 3.85 per litre
//! assert_eq!(result.litres_used, 10.0);
//! assert_eq!(result.pricing_source, PricingSource::Fallback);
//! # Ok::<(), fleetwash_core::FleetwashError>(())
//! ```

/// Batch costing with memoization and grouped totals
pub mod aggregation;
/// Bounded LRU cache
pub mod cache;
/// Per-scan cost calculation
pub mod calculator;
/// Engine configuration tables
pub mod config;
/// Fixed billing constants
pub mod constants;
/// Vehicle wash-time entitlements
pub mod entitlement;
pub mod error;
/// Calibration and catalog price lookup
pub mod pricing;
/// Monthly and annual cost projection
pub mod projection;
/// Region and fallback pricing resolution
pub mod region;
/// Budget-constrained parameter search
pub mod solver;

pub use aggregation::{CostAggregator, CostSummary, CostTotals, ScanSignature};
pub use cache::{CacheStats, LruCache};
pub use calculator::CostCalculator;
pub use config::EngineConfig;
pub use entitlement::{EntitlementIndex, EntitlementLookup};
pub use error::{FleetwashError, Result};
pub use pricing::{CalibrationEntry, PricingIndex};
pub use projection::{CostOracle, ForwardProjector};
pub use region::{FallbackPricing, RegionResolver};
pub use solver::{ReverseSolver, SolverOption, SolverOutcome, SolverRequest, SolverStrategy};

pub use fleetwash_types as types;
