//! Forward projection of operating parameters to monthly and annual cost.

use crate::constants::{calendar, wash};
use fleetwash_types::{ScenarioParameters, ScenarioProjection};

/// Anything that can price a parameter set. The reverse solver searches
/// against this trait; [`ForwardProjector`] is the production implementation.
pub trait CostOracle: Send + Sync {
    fn project(&self, params: &ScenarioParameters) -> ScenarioProjection;
}

/// Round a currency amount to cents.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Stateless projector using the fixed weeks-per-month factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardProjector;

impl ForwardProjector {
    pub fn new() -> Self {
        Self
    }
}

impl CostOracle for ForwardProjector {
    fn project(&self, params: &ScenarioParameters) -> ScenarioProjection {
        let litres_per_wash =
            (params.wash_time_seconds / wash::SECONDS_PER_MINUTE) * params.dispensing_rate;
        let litres_per_week = litres_per_wash * params.washes_per_week as f64;
        let litres_per_month = litres_per_week * calendar::WEEKS_PER_MONTH;
        let cost_per_month_per_truck = litres_per_month * params.price_per_litre;
        let cost_per_month_site = cost_per_month_per_truck * params.truck_count.max(1) as f64;
        let cost_per_year_site = cost_per_month_site * calendar::MONTHS_PER_YEAR;

        ScenarioProjection {
            litres_per_wash,
            max_litres_per_week_per_truck: litres_per_week,
            max_litres_per_month_per_truck: litres_per_month,
            max_cost_per_month_per_truck: round_to_cents(cost_per_month_per_truck),
            max_cost_per_month_site: round_to_cents(cost_per_month_site),
            max_cost_per_year_site: round_to_cents(cost_per_year_site),
        }
    }
}
