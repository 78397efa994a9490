//! Batch costing with memoization and per-vehicle/site/customer totals.
//!
//! The calculator itself holds no state; memoization lives here so its bound
//! and statistics are explicit. Results are keyed by [`ScanSignature`], which
//! treats scans with the same identifiers and reported wash time as
//! interchangeable.

use crate::cache::{CacheStats, LruCache};
use crate::calculator::CostCalculator;
use crate::entitlement::EntitlementIndex;
use crate::pricing::PricingIndex;
use fleetwash_types::{CostResult, PricingSource, ScanEvent};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument};

const UNKNOWN_VEHICLE: &str = "(unknown)";

/// Composite memo key for a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanSignature {
    customer_ref: String,
    site_ref: String,
    vehicle_ref: String,
    vehicle_rfid: String,
    device_serial: String,
    /// Bit pattern of the reported wash time; it drives legacy-mode billing
    reported_wash_time: Option<u64>,
}

impl ScanSignature {
    pub fn of(scan: &ScanEvent) -> Self {
        Self {
            customer_ref: scan.customer_ref.clone(),
            site_ref: scan.site_ref.clone(),
            vehicle_ref: scan.vehicle_ref.clone(),
            vehicle_rfid: scan.vehicle_rfid.clone(),
            device_serial: scan.device_serial.clone(),
            reported_wash_time: scan.reported_wash_time().map(f64::to_bits),
        }
    }
}

/// Running totals for one grouping key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostTotals {
    /// Scans included in the totals
    pub scans: usize,
    /// Scans excluded for missing entitlement configuration
    pub excluded_scans: usize,
    pub catalog_priced_scans: usize,
    pub litres: f64,
    pub cost: f64,
}

impl CostTotals {
    fn record(&mut self, result: &CostResult) {
        if result.config_missing {
            self.excluded_scans += 1;
            return;
        }
        self.scans += 1;
        if result.pricing_source == PricingSource::Catalog {
            self.catalog_priced_scans += 1;
        }
        self.litres += result.litres_used;
        self.cost += result.cost;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub totals: CostTotals,
    pub by_vehicle: BTreeMap<String, CostTotals>,
    pub by_site: BTreeMap<String, CostTotals>,
    pub by_customer: BTreeMap<String, CostTotals>,
    /// Scan counts per device status, excluded scans included
    pub by_status: BTreeMap<String, usize>,
}

/// Costs batches of scans against one pair of index snapshots.
pub struct CostAggregator<'a> {
    calculator: &'a CostCalculator,
    entitlements: Option<&'a EntitlementIndex>,
    pricing: Option<&'a PricingIndex>,
    cache: LruCache<ScanSignature, CostResult>,
}

impl<'a> CostAggregator<'a> {
    pub fn new(
        calculator: &'a CostCalculator,
        entitlements: Option<&'a EntitlementIndex>,
        pricing: Option<&'a PricingIndex>,
        cache_capacity: usize,
    ) -> Self {
        Self { calculator, entitlements, pricing, cache: LruCache::new(cache_capacity) }
    }

    /// Cost one scan, serving repeats from the cache
    pub fn cost(&mut self, scan: &ScanEvent) -> CostResult {
        let signature = ScanSignature::of(scan);
        if let Some(cached) = self.cache.get(&signature) {
            return cached.clone();
        }
        let result = self.calculator.cost(scan, self.entitlements, self.pricing);
        self.cache.put(signature, result.clone());
        result
    }

    /// Cost every scan and roll the results up.
    #[instrument(skip_all, fields(scans = scans.len()))]
    pub fn aggregate(&mut self, scans: &[ScanEvent]) -> CostSummary {
        let mut summary = CostSummary::default();

        for scan in scans {
            let result = self.cost(scan);
            let vehicle = if !scan.vehicle_ref.is_empty() {
                scan.vehicle_ref.as_str()
            } else if !scan.vehicle_rfid.is_empty() {
                scan.vehicle_rfid.as_str()
            } else {
                UNKNOWN_VEHICLE
            };

            summary.totals.record(&result);
            summary.by_vehicle.entry(vehicle.to_string()).or_default().record(&result);
            summary.by_site.entry(scan.site_ref.clone()).or_default().record(&result);
            summary.by_customer.entry(scan.customer_ref.clone()).or_default().record(&result);
            *summary.by_status.entry(scan.status.as_str().to_string()).or_default() += 1;
        }

        let stats = self.cache.stats();
        info!(
            included = summary.totals.scans,
            excluded = summary.totals.excluded_scans,
            cost = summary.totals.cost,
            cache_hit_rate = stats.hit_rate(),
            "Aggregated scan costs"
        );
        summary
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
