//! Per-scan cost calculation.
//!
//! `CostCalculator::cost` is a pure function of the scan and the two optional
//! index snapshots. It never fails: missing data is reported through
//! `config_missing` and `pricing_source` on the result.

use crate::config::EngineConfig;
use crate::constants::wash::{DEFAULT_WASH_TIME_SECONDS, SECONDS_PER_MINUTE};
use crate::entitlement::EntitlementIndex;
use crate::error::Result;
use crate::pricing::PricingIndex;
use crate::region::RegionResolver;
use fleetwash_types::{CostResult, PricingSource, ScanEvent};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct CostCalculator {
    regions: RegionResolver,
}

impl CostCalculator {
    /// Build a calculator from `config`, which must pass [`EngineConfig::validate`].
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self { regions: RegionResolver::new(config)? })
    }

    pub fn regions(&self) -> &RegionResolver {
        &self.regions
    }

    /// Cost one scan.
    ///
    /// With an entitlement index the vehicle must be found there, otherwise the
    /// scan is returned as `config_missing` with zero cost. Without one
    /// (legacy mode) the scan's own wash time is billed.
    pub fn cost(
        &self,
        scan: &ScanEvent,
        entitlements: Option<&EntitlementIndex>,
        pricing: Option<&PricingIndex>,
    ) -> CostResult {
        let region = self.regions.resolve(&scan.site_name, &scan.customer_name);
        let fallback = self.regions.fallback(region, &scan.customer_name);

        let wash_time_seconds = match entitlements {
            Some(index) => {
                let lookup = index.resolve(scan);
                if !lookup.found {
                    trace!(
                        vehicle_ref = %scan.vehicle_ref,
                        vehicle_rfid = %scan.vehicle_rfid,
                        "No entitlement for vehicle; excluding scan"
                    );
                    return CostResult {
                        cost: 0.0,
                        litres_used: 0.0,
                        region,
                        price_per_litre: fallback.price_per_litre,
                        calibration_rate: fallback.calibration_rate,
                        wash_time_seconds: DEFAULT_WASH_TIME_SECONDS,
                        config_missing: true,
                        pricing_source: PricingSource::Fallback,
                    };
                }
                lookup.seconds
            }
            None => scan.reported_wash_time().unwrap_or(DEFAULT_WASH_TIME_SECONDS),
        };

        let measured_rate = pricing.and_then(|index| {
            index
                .by_device_serial(&scan.device_serial)
                .or_else(|| index.by_site_name(&scan.site_name))
                .map(|entry| entry.calibration_rate)
        });
        let catalog_price = pricing.and_then(|index| index.resolve_price(&scan.customer_name));

        let calibration_rate = measured_rate.unwrap_or(fallback.calibration_rate);
        let price_per_litre = catalog_price.unwrap_or(fallback.price_per_litre);
        let pricing_source = if measured_rate.is_some() || catalog_price.is_some() {
            PricingSource::Catalog
        } else {
            PricingSource::Fallback
        };

        let litres_used = (wash_time_seconds / SECONDS_PER_MINUTE) * calibration_rate;
        let cost = litres_used * price_per_litre;

        trace!(
            %region,
            wash_time_seconds,
            calibration_rate,
            price_per_litre,
            source = ?pricing_source,
            "Costed scan"
        );

        CostResult {
            cost,
            litres_used,
            region,
            price_per_litre,
            calibration_rate,
            wash_time_seconds,
            config_missing: false,
            pricing_source,
        }
    }
}
