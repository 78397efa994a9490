//! Fixed numeric constants shared by the calculator, projector and solver.
//!
//! Tunable tables (regional fallbacks, brand keywords, price band) live in
//! [`crate::config`]; the values here are part of the billing contract and
//! are not meant to be overridden per deployment.

/// Wash timing constants
pub mod wash {
    /// Wash time billed when neither an entitlement nor a usable scan value exists
    pub const DEFAULT_WASH_TIME_SECONDS: f64 = 60.0;

    /// Calibration rates are expressed per this many seconds
    pub const SECONDS_PER_MINUTE: f64 = 60.0;
}

/// Calendar conversions used for every monthly figure
pub mod calendar {
    /// Fixed weeks-per-month factor so monthly figures agree with each other
    pub const WEEKS_PER_MONTH: f64 = 52.0 / 12.0;

    pub const MONTHS_PER_YEAR: f64 = 12.0;
}

/// Product catalog defaults
pub mod pricing {
    /// Product type of the primary concrete-residue remover
    pub const PRIMARY_PRODUCT_TYPE: &str = "CONC";

    /// Lowest per-litre price considered a plausible chemical price
    pub const MIN_PLAUSIBLE_PRICE_PER_LITRE: f64 = 0.50;

    /// Highest per-litre price considered a plausible chemical price
    pub const MAX_PLAUSIBLE_PRICE_PER_LITRE: f64 = 20.00;
}

/// Reverse solver search bounds
pub mod solver {
    pub const MIN_WASH_TIME_SECONDS: f64 = 30.0;
    pub const MAX_WASH_TIME_SECONDS: f64 = 300.0;
    pub const WASH_TIME_STEP_SECONDS: f64 = 6.0;

    pub const MIN_WASHES_PER_WEEK: u32 = 2;
    pub const MAX_WASHES_PER_WEEK: u32 = 12;
    pub const WASHES_PER_WEEK_STEP: u32 = 1;

    /// Starting wash time for the combined option when no proposal exists
    pub const DEFAULT_COMBINED_WASH_TIME_SECONDS: f64 = 90.0;
}

/// Aggregation layer defaults
pub mod cache {
    /// Default number of memoized scan results kept by the aggregator
    pub const DEFAULT_COST_CACHE_CAPACITY: usize = 10_000;
}
