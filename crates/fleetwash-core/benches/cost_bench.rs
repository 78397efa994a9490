use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fleetwash_core::types::{
    ChemicalProduct, ScanEvent, ScanStatus, ScenarioParameters, TankConfiguration,
    VehicleEntitlement,
};
use fleetwash_core::{
    CostAggregator, CostCalculator, EngineConfig, EntitlementIndex, PricingIndex, ReverseSolver,
    SolverRequest,
};
use std::time::Duration;

const SITES: [&str; 5] = [
    "Penrith Plant",
    "Laverton North",
    "Pinkenba Wharf",
    "Welshpool Depot",
    "Depot 7",
];

fn generate_vehicles(count: usize) -> Vec<VehicleEntitlement> {
    (0..count)
        .map(|i| VehicleEntitlement {
            vehicle_ref: format!("V{i}"),
            vehicle_rfid: format!("R{i}"),
            primary_wash_time_seconds: if i % 7 == 0 {
                None
            } else {
                Some(60.0 + (i % 5) as f64 * 12.0)
            },
            secondary_wash_time_seconds: Some(90.0),
        })
        .collect()
}

fn generate_tanks() -> Vec<TankConfiguration> {
    SITES
        .iter()
        .enumerate()
        .flat_map(|(i, site)| {
            ["CONC", "FOAM"].into_iter().map(move |product_type| TankConfiguration {
                site_ref: format!("S{i}"),
                site_name: site.to_string(),
                device_serial: format!("DEV-{i}"),
                product_type: product_type.to_string(),
                calibration_rate_per_minute: Some(4.0 + i as f64 * 0.25),
                active: true,
            })
        })
        .collect()
}

fn generate_scans(count: usize, vehicles: usize) -> Vec<ScanEvent> {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| ScanEvent {
            customer_ref: format!("C{}", i % 12),
            customer_name: if i % 3 == 0 { "Summit Concrete" } else { "Acme Readymix" }.to_string(),
            site_ref: format!("S{}", i % SITES.len()),
            site_name: SITES[i % SITES.len()].to_string(),
            vehicle_ref: format!("V{}", i % (vehicles + vehicles / 10 + 1)),
            vehicle_rfid: String::new(),
            device_serial: format!("DEV-{}", i % (SITES.len() + 2)),
            created_at: start + ChronoDuration::minutes(i as i64),
            status: ScanStatus::Success,
            wash_time_seconds: Some(75.0),
        })
        .collect()
}

fn bench_batch_costing(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_costing");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let config = EngineConfig::default();
    let products: Vec<ChemicalProduct> = [("Concrete Remover", 395), ("Summit Conc", 340)]
        .into_iter()
        .map(|(name, cents)| ChemicalProduct {
            name: name.to_string(),
            price_minor_units: cents,
            active: true,
        })
        .collect();
    let vehicles = generate_vehicles(500);
    let entitlements = EntitlementIndex::build(&vehicles);
    let pricing = PricingIndex::build(&generate_tanks(), &products, &config.pricing);
    let calculator = CostCalculator::new(&config).unwrap();

    for size in [1_000, 10_000, 100_000].iter() {
        let scans = generate_scans(*size, vehicles.len());
        group.bench_with_input(BenchmarkId::new("uncached", size), &scans, |b, scans| {
            b.iter(|| {
                for scan in scans {
                    black_box(calculator.cost(scan, Some(&entitlements), Some(&pricing)));
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("aggregated", size), &scans, |b, scans| {
            b.iter(|| {
                let mut aggregator = CostAggregator::new(
                    &calculator,
                    Some(&entitlements),
                    Some(&pricing),
                    config.aggregation.cache_capacity,
                );
                black_box(aggregator.aggregate(scans))
            });
        });
    }
    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let vehicles = generate_vehicles(50_000);
    c.bench_function("entitlement_index_build_50k", |b| {
        b.iter(|| black_box(EntitlementIndex::build(&vehicles)));
    });
}

fn bench_solver(c: &mut Criterion) {
    let solver = ReverseSolver::new();
    let request = SolverRequest {
        target_budget: 2000.0,
        current: ScenarioParameters {
            wash_time_seconds: 120.0,
            washes_per_day: 1,
            washes_per_week: 3,
            dispensing_rate: 5.0,
            price_per_litre: 3.85,
            truck_count: 10,
        },
        truck_count: 10,
        previous_proposal: None,
    };
    c.bench_function("reverse_solver", |b| b.iter(|| black_box(solver.solve(&request))));
}

criterion_group!(benches, bench_batch_costing, bench_index_build, bench_solver);
criterion_main!(benches);
