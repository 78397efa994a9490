//! Fleetwash Types
//!
//! This crate defines the records the reporting layer feeds into the pricing
//! engine (scans, vehicle entitlements, tank calibrations, catalog products)
//! and the result structs the engine hands back. It carries no logic beyond
//! small accessors so that `fleetwash-core` and `fleetwash-cli` can share one
//! vocabulary.

#![warn(missing_docs)]

mod types;
pub use types::{
    ChemicalProduct, CostResult, PricingSource, ProposedScenario, Region, ScanEvent, ScanStatus,
    ScenarioParameters, ScenarioProjection, TankConfiguration, VehicleEntitlement,
};
