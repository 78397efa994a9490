use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns the value only when it is a finite, strictly positive number.
fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Outcome reported by the wash device for a single scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Wash completed within the configured time
    Success,
    /// Wash ran past the configured time
    Exceeded,
    /// Wash triggered automatically without an operator tag
    Auto,
    /// Any status string the engine does not know about
    #[default]
    #[serde(other)]
    Other,
}

impl ScanStatus {
    /// Lower-case label as it appears in source records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Success => "success",
            ScanStatus::Exceeded => "exceeded",
            ScanStatus::Auto => "auto",
            ScanStatus::Other => "other",
        }
    }
}

/// One wash event as captured by a site device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    /// Customer identifier
    pub customer_ref: String,
    /// Customer display name, used for region and brand heuristics
    #[serde(default)]
    pub customer_name: String,
    /// Site identifier
    pub site_ref: String,
    /// Site display name, used for region and calibration lookups
    #[serde(default)]
    pub site_name: String,
    /// Vehicle identifier, empty when the scan carried none
    #[serde(default)]
    pub vehicle_ref: String,
    /// RFID tag read at the bay, empty when absent
    #[serde(default)]
    pub vehicle_rfid: String,
    /// Serial of the dispensing device that recorded the scan
    #[serde(default)]
    pub device_serial: String,
    /// Time the scan was recorded
    pub created_at: DateTime<Utc>,
    /// Device-reported outcome
    #[serde(default)]
    pub status: ScanStatus,
    /// Wash time reported by the device itself, if any
    #[serde(default)]
    pub wash_time_seconds: Option<f64>,
}

impl ScanEvent {
    /// Device-reported wash time, only when it is a usable positive number.
    pub fn reported_wash_time(&self) -> Option<f64> {
        positive(self.wash_time_seconds)
    }
}

/// Configured wash allowance for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleEntitlement {
    /// Vehicle identifier
    pub vehicle_ref: String,
    /// RFID tag assigned to the vehicle
    #[serde(default)]
    pub vehicle_rfid: String,
    /// Primary configured wash time in seconds
    #[serde(default, alias = "washTimeSeconds")]
    pub primary_wash_time_seconds: Option<f64>,
    /// Secondary configured wash time, consulted when the primary is unusable
    #[serde(default)]
    pub secondary_wash_time_seconds: Option<f64>,
}

impl VehicleEntitlement {
    /// The configured wash time: primary if usable, else secondary, else none.
    pub fn configured_wash_time(&self) -> Option<f64> {
        positive(self.primary_wash_time_seconds)
            .or_else(|| positive(self.secondary_wash_time_seconds))
    }
}

/// Calibration row for one chemical tank on a site device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankConfiguration {
    /// Site identifier
    pub site_ref: String,
    /// Site display name
    #[serde(default)]
    pub site_name: String,
    /// Serial of the device the tank is plumbed into
    #[serde(default)]
    pub device_serial: String,
    /// Chemical product type held in the tank, e.g. `CONC`
    #[serde(default)]
    pub product_type: String,
    /// Measured litres dispensed per 60 seconds
    #[serde(default)]
    pub calibration_rate_per_minute: Option<f64>,
    /// Whether the tank is in service
    #[serde(default = "default_active")]
    pub active: bool,
}

impl TankConfiguration {
    /// Calibration rate, only when it is a usable positive number.
    pub fn calibration_rate(&self) -> Option<f64> {
        positive(self.calibration_rate_per_minute)
    }
}

/// Catalog row that may represent a wash chemical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChemicalProduct {
    /// Product name as listed in the catalog
    pub name: String,
    /// Price per litre in minor currency units (cents)
    #[serde(default, alias = "priceCents")]
    pub price_minor_units: i64,
    /// Whether the product is currently sold
    #[serde(default = "default_active")]
    pub active: bool,
}

impl ChemicalProduct {
    /// Price per litre in major currency units.
    pub fn price_per_litre(&self) -> f64 {
        self.price_minor_units as f64 / 100.0
    }
}

fn default_active() -> bool {
    true
}

/// Coarse geographic bucket used to pick fallback pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    /// New South Wales, the baseline region
    Nsw,
    /// Victoria
    Vic,
    /// Queensland
    Qld,
    /// Western Australia
    Wa,
    /// South Australia
    Sa,
    /// Tasmania
    Tas,
    /// New Zealand
    Nz,
}

impl Region {
    /// Every region, in declaration order.
    pub const ALL: [Region; 7] =
        [Region::Nsw, Region::Vic, Region::Qld, Region::Wa, Region::Sa, Region::Tas, Region::Nz];

    /// Upper-case region code.
    pub fn code(&self) -> &'static str {
        match self {
            Region::Nsw => "NSW",
            Region::Vic => "VIC",
            Region::Qld => "QLD",
            Region::Wa => "WA",
            Region::Sa => "SA",
            Region::Tas => "TAS",
            Region::Nz => "NZ",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Where the rate or price behind a cost figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingSource {
    /// Measured calibration or catalog price was used
    Catalog,
    /// Only the constant regional table was used
    Fallback,
}

/// Billed cost of a single scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostResult {
    /// Billed cost in major currency units
    pub cost: f64,
    /// Litres of chemical attributed to the wash
    pub litres_used: f64,
    /// Region the scan was priced under
    pub region: Region,
    /// Price per litre applied
    pub price_per_litre: f64,
    /// Litres per 60 seconds applied
    pub calibration_rate: f64,
    /// Billed wash time in seconds
    pub wash_time_seconds: f64,
    /// No entitlement exists for the vehicle; the scan is excluded from totals
    pub config_missing: bool,
    /// Whether catalog data contributed to the figure
    pub pricing_source: PricingSource,
}

/// Operating parameters for a what-if projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioParameters {
    /// Wash duration in seconds
    pub wash_time_seconds: f64,
    /// Washes per truck per day, carried for reporting
    #[serde(default)]
    pub washes_per_day: u32,
    /// Washes per truck per week
    pub washes_per_week: u32,
    /// Litres dispensed per 60 seconds
    pub dispensing_rate: f64,
    /// Price per litre in major currency units
    pub price_per_litre: f64,
    /// Trucks on the site
    #[serde(default)]
    pub truck_count: u32,
}

/// Monthly and annual extrapolation of a [`ScenarioParameters`] set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioProjection {
    /// Litres dispensed by one wash
    pub litres_per_wash: f64,
    /// Upper bound on litres per truck per week
    pub max_litres_per_week_per_truck: f64,
    /// Upper bound on litres per truck per month
    pub max_litres_per_month_per_truck: f64,
    /// Upper bound on cost per truck per month
    pub max_cost_per_month_per_truck: f64,
    /// Upper bound on cost for the whole site per month
    pub max_cost_per_month_site: f64,
    /// Upper bound on cost for the whole site per year
    pub max_cost_per_year_site: f64,
}

/// A proposed parameter set as persisted by the reporting layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedScenario {
    /// Customer the proposal belongs to
    pub customer_ref: String,
    /// Site the proposal belongs to
    pub site_ref: String,
    /// Reporting period label, e.g. `2026-10`
    pub period: String,
    /// Proposed operating parameters
    pub parameters: ScenarioParameters,
    /// When the proposal was last saved
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
