use chrono::{TimeZone, Utc};
use fleetwash_core::types::{
    ChemicalProduct, PricingSource, Region, ScanEvent, ScanStatus, TankConfiguration,
    VehicleEntitlement,
};
use fleetwash_core::{CostCalculator, EngineConfig, EntitlementIndex, PricingIndex};
use proptest::prelude::*;

fn scan(customer_name: &str, site_name: &str, vehicle_ref: &str, device_serial: &str) -> ScanEvent {
    ScanEvent {
        customer_ref: "CUST-1".to_string(),
        customer_name: customer_name.to_string(),
        site_ref: "SITE-1".to_string(),
        site_name: site_name.to_string(),
        vehicle_ref: vehicle_ref.to_string(),
        vehicle_rfid: format!("RFID-{vehicle_ref}"),
        device_serial: device_serial.to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 5, 12, 9, 30, 0).unwrap(),
        status: ScanStatus::Success,
        wash_time_seconds: Some(75.0),
    }
}

fn vehicle(vehicle_ref: &str, seconds: f64) -> VehicleEntitlement {
    VehicleEntitlement {
        vehicle_ref: vehicle_ref.to_string(),
        vehicle_rfid: String::new(),
        primary_wash_time_seconds: Some(seconds),
        secondary_wash_time_seconds: None,
    }
}

fn tank(site_name: &str, serial: &str, product_type: &str, rate: f64) -> TankConfiguration {
    TankConfiguration {
        site_ref: "SITE-1".to_string(),
        site_name: site_name.to_string(),
        device_serial: serial.to_string(),
        product_type: product_type.to_string(),
        calibration_rate_per_minute: Some(rate),
        active: true,
    }
}

fn product(name: &str, cents: i64) -> ChemicalProduct {
    ChemicalProduct { name: name.to_string(), price_minor_units: cents, active: true }
}

#[test]
fn end_to_end_catalog_costing() {
    let config = EngineConfig::default();
    let entitlements = EntitlementIndex::build(&[vehicle("V1", 120.0)]);
    let pricing = PricingIndex::build(
        &[tank("Penrith Plant", "DEV-9", "CONC", 4.5)],
        &[product("Concrete Remover 200L", 410), product("Wash Bay Hose", 8_900)],
        &config.pricing,
    );
    let calculator = CostCalculator::new(&config).unwrap();

    let scan = scan("Acme Readymix", "Penrith Plant", "V1", "DEV-9");
    let result = calculator.cost(&scan, Some(&entitlements), Some(&pricing));

    assert_eq!(result.region, Region::Nsw);
    assert_eq!(result.wash_time_seconds, 120.0);
    assert_eq!(result.calibration_rate, 4.5);
    assert_eq!(result.price_per_litre, 4.10);
    assert!((result.litres_used - 9.0).abs() < 1e-9);
    assert!((result.cost - 36.9).abs() < 1e-9);
    assert_eq!(result.pricing_source, PricingSource::Catalog);
}

#[test]
fn device_serial_entry_wins_over_region_and_site() {
    let config = EngineConfig::default();
    let pricing = PricingIndex::build(
        &[tank("Perth Yard", "DEV-1", "CONC", 7.25), tank("Perth Yard", "DEV-2", "CONC", 3.0)],
        &[],
        &config.pricing,
    );
    let calculator = CostCalculator::new(&config).unwrap();

    let result = calculator.cost(&scan("Acme", "Perth Yard", "V1", "DEV-1"), None, Some(&pricing));

    assert_eq!(result.region, Region::Wa);
    assert_eq!(result.calibration_rate, 7.25);
    assert_eq!(result.pricing_source, PricingSource::Catalog);
}

#[test]
fn brand_override_applies_without_catalog() {
    let calculator = CostCalculator::new(&EngineConfig::default()).unwrap();
    let scan = scan("Keystone Quarries", "Hobart Depot", "V1", "DEV-1");
    let result = calculator.cost(&scan, None, None);

    assert_eq!(result.region, Region::Tas);
    assert_eq!(result.calibration_rate, 4.0);
    assert_eq!(result.price_per_litre, 3.60);
    assert_eq!(result.pricing_source, PricingSource::Fallback);
}

#[test]
fn out_of_band_products_never_price_a_scan() {
    let config = EngineConfig::default();
    let pricing = PricingIndex::build(
        &[],
        &[product("Summit Concrete Remover Drum", 2_500), product("Concrete Remover Sample", 10)],
        &config.pricing,
    );
    assert!(pricing.chemical_products().is_empty());
    assert_eq!(pricing.resolve_price("Summit Concrete"), None);

    let calculator = CostCalculator::new(&config).unwrap();
    let result =
        calculator.cost(&scan("Summit Concrete", "Penrith Plant", "V1", ""), None, Some(&pricing));
    // Brand override price, not the out-of-band catalog row
    assert_eq!(result.price_per_litre, 3.40);
    assert_eq!(result.pricing_source, PricingSource::Fallback);
}

#[test]
fn exact_site_region_ignores_customer_formatting() {
    let calculator = CostCalculator::new(&EngineConfig::default()).unwrap();
    for customer in ["acme", "  ACME  ", "Acme Perth", "\tAcme Auckland\n"] {
        let result = calculator.cost(&scan(customer, "Welshpool Depot", "V1", ""), None, None);
        assert_eq!(result.region, Region::Wa, "customer {customer:?}");
    }
}

#[test]
fn scans_in_a_batch_are_independent() {
    let config = EngineConfig::default();
    let entitlements = EntitlementIndex::build(&[vehicle("V1", 90.0), vehicle("V2", 150.0)]);
    let calculator = CostCalculator::new(&config).unwrap();

    let first = scan("Acme", "Penrith Plant", "V1", "");
    let second = scan("Acme", "Penrith Plant", "V2", "");

    let alone = calculator.cost(&first, Some(&entitlements), None);
    let _ = calculator.cost(&second, Some(&entitlements), None);
    let after = calculator.cost(&first, Some(&entitlements), None);
    assert_eq!(alone, after);
}

fn arb_scan() -> impl Strategy<Value = ScanEvent> {
    (
        prop::sample::select(vec!["Acme", "Summit Concrete", "Keystone", "Auckland Readymix", ""]),
        prop::sample::select(vec!["Penrith Plant", "Brisbane North", "Geelong", "", "Depot 7"]),
        prop::sample::select(vec!["V1", "V2", "V3", ""]),
        prop::sample::select(vec!["DEV-1", "DEV-2", ""]),
        prop::option::of(-100.0f64..600.0),
    )
        .prop_map(|(customer, site, vehicle_ref, serial, reported)| ScanEvent {
            wash_time_seconds: reported,
            ..scan(customer, site, vehicle_ref, serial)
        })
}

proptest! {
    #[test]
    fn cost_is_deterministic(scan in arb_scan()) {
        let config = EngineConfig::default();
        let entitlements = EntitlementIndex::build(&[vehicle("V1", 90.0), vehicle("V3", 45.0)]);
        let pricing = PricingIndex::build(
            &[tank("Geelong", "DEV-1", "CONC", 6.0)],
            &[product("Concrete Remover", 395)],
            &config.pricing,
        );
        let calculator = CostCalculator::new(&config).unwrap();

        for entitlements in [None, Some(&entitlements)] {
            let a = calculator.cost(&scan, entitlements, Some(&pricing));
            let b = calculator.cost(&scan, entitlements, Some(&pricing));
            prop_assert_eq!(a.cost.to_bits(), b.cost.to_bits());
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn excluded_scans_cost_nothing(scan in arb_scan()) {
        let entitlements = EntitlementIndex::build(&[vehicle("V2", 60.0)]);
        let calculator = CostCalculator::new(&EngineConfig::default()).unwrap();
        let result = calculator.cost(&scan, Some(&entitlements), None);
        if result.config_missing {
            prop_assert_eq!(result.cost, 0.0);
            prop_assert_eq!(result.litres_used, 0.0);
        }
        prop_assert!(result.calibration_rate > 0.0);
        prop_assert!(result.price_per_litre > 0.0);
    }

    #[test]
    fn device_entry_always_attributed_to_catalog(scan in arb_scan(), rate in 0.1f64..30.0) {
        let config = EngineConfig::default();
        let tanks = [tank("Anywhere", "DEV-1", "CONC", rate)];
        let pricing = PricingIndex::build(&tanks, &[], &config.pricing);
        let scan = ScanEvent { device_serial: "DEV-1".to_string(), ..scan };
        let result = CostCalculator::new(&config).unwrap().cost(&scan, None, Some(&pricing));
        prop_assert_eq!(result.pricing_source, PricingSource::Catalog);
        prop_assert_eq!(result.calibration_rate, rate);
    }
}
