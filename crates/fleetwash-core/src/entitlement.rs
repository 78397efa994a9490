//! Configured wash-time lookup per vehicle.
//!
//! The index is built once per batch of vehicle rows and read by every scan
//! in that batch. Keys are exact strings; a ref or RFID that repeats across
//! rows keeps the value of the last row seen.

use crate::constants::wash::DEFAULT_WASH_TIME_SECONDS;
use fleetwash_types::{ScanEvent, VehicleEntitlement};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Result of looking a scan's vehicle up in an [`EntitlementIndex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitlementLookup {
    /// Entitled seconds on a hit; the scan's own value or the default otherwise
    pub seconds: f64,
    pub found: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EntitlementIndex {
    by_ref: HashMap<String, f64>,
    by_rfid: HashMap<String, f64>,
}

impl EntitlementIndex {
    /// Index every vehicle with a usable primary or secondary wash time.
    #[instrument(skip_all, fields(vehicles = vehicles.len()))]
    pub fn build(vehicles: &[VehicleEntitlement]) -> Self {
        let mut index = Self::default();
        let mut skipped = 0usize;

        for vehicle in vehicles {
            let Some(seconds) = vehicle.configured_wash_time() else {
                skipped += 1;
                continue;
            };
            if !vehicle.vehicle_ref.is_empty() {
                index.by_ref.insert(vehicle.vehicle_ref.clone(), seconds);
            }
            if !vehicle.vehicle_rfid.is_empty() {
                index.by_rfid.insert(vehicle.vehicle_rfid.clone(), seconds);
            }
        }

        debug!(
            by_ref = index.by_ref.len(),
            by_rfid = index.by_rfid.len(),
            skipped,
            "Built entitlement index"
        );
        index
    }

    /// Look the scan's vehicle up by ref, then by RFID.
    ///
    /// A miss is an expected outcome: `found` is false and `seconds` carries
    /// the scan's reported wash time or the 60 second default.
    pub fn resolve(&self, scan: &ScanEvent) -> EntitlementLookup {
        let hit = lookup(&self.by_ref, &scan.vehicle_ref)
            .or_else(|| lookup(&self.by_rfid, &scan.vehicle_rfid));

        match hit {
            Some(seconds) => EntitlementLookup { seconds, found: true },
            None => EntitlementLookup {
                seconds: scan.reported_wash_time().unwrap_or(DEFAULT_WASH_TIME_SECONDS),
                found: false,
            },
        }
    }

    pub fn seconds_for_ref(&self, vehicle_ref: &str) -> Option<f64> {
        lookup(&self.by_ref, vehicle_ref)
    }

    pub fn seconds_for_rfid(&self, rfid: &str) -> Option<f64> {
        lookup(&self.by_rfid, rfid)
    }

    /// Number of distinct vehicle refs indexed
    pub fn len(&self) -> usize {
        self.by_ref.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ref.is_empty() && self.by_rfid.is_empty()
    }
}

fn lookup(map: &HashMap<String, f64>, key: &str) -> Option<f64> {
    if key.is_empty() {
        return None;
    }
    map.get(key).copied().filter(|seconds| *seconds > 0.0)
}
