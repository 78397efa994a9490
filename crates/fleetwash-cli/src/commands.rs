use anyhow::{Context, bail};
use clap::{Args, ValueEnum};
use fleetwash_core::types::{
    ChemicalProduct, ProposedScenario, ScanEvent, ScenarioParameters, ScenarioProjection,
    TankConfiguration, VehicleEntitlement,
};
use fleetwash_core::{
    CostAggregator, CostCalculator, CostOracle, CostSummary, EngineConfig, EntitlementIndex,
    ForwardProjector, PricingIndex, ReverseSolver, SolverOutcome, SolverRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Args, Debug)]
pub struct CostArgs {
    /// Scan events (JSON array)
    #[arg(long)]
    pub scans: PathBuf,

    /// Vehicle entitlements (JSON array); omit to bill reported wash times
    #[arg(long)]
    pub vehicles: Option<PathBuf>,

    /// Tank configurations (JSON array)
    #[arg(long)]
    pub tanks: Option<PathBuf>,

    /// Chemical product catalog (JSON array)
    #[arg(long)]
    pub products: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Wash time in seconds
    #[arg(long)]
    pub wash_time: f64,

    #[arg(long)]
    pub washes_per_week: u32,

    /// Dispensing rate in litres per minute
    #[arg(long)]
    pub rate: f64,

    /// Price per litre
    #[arg(long)]
    pub price: f64,

    #[arg(long, default_value_t = 1)]
    pub trucks: u32,
}

impl ScenarioArgs {
    pub fn parameters(&self) -> ScenarioParameters {
        ScenarioParameters {
            wash_time_seconds: self.wash_time,
            washes_per_day: 1,
            washes_per_week: self.washes_per_week,
            dispensing_rate: self.rate,
            price_per_litre: self.price,
            truck_count: self.trucks,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Decode a JSON array one row at a time, skipping rows that do not decode.
fn read_records<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let rows: Vec<serde_json::Value> = read_json(path)?;
    let total = rows.len();
    let mut records = Vec::with_capacity(total);

    for (row, value) in rows.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(path = %path.display(), row, error = %err, "Skipping malformed record");
            }
        }
    }

    info!(
        path = %path.display(),
        records = records.len(),
        skipped = total - records.len(),
        "Loaded records"
    );
    Ok(records)
}

fn read_optional<T: DeserializeOwned>(path: Option<&PathBuf>) -> anyhow::Result<Vec<T>> {
    path.map(|path| read_records(path)).transpose().map(Option::unwrap_or_default)
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn cost(config: &EngineConfig, args: &CostArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let calculator = CostCalculator::new(config).context("invalid engine configuration")?;
    let scans: Vec<ScanEvent> = read_records(&args.scans)?;
    let tanks: Vec<TankConfiguration> = read_optional(args.tanks.as_ref())?;
    let products: Vec<ChemicalProduct> = read_optional(args.products.as_ref())?;

    let entitlements = match &args.vehicles {
        Some(path) => {
            let vehicles: Vec<VehicleEntitlement> = read_records(path)?;
            Some(EntitlementIndex::build(&vehicles))
        }
        None => {
            warn!("No vehicle file supplied; billing reported wash times");
            None
        }
    };
    let pricing = PricingIndex::build(&tanks, &products, &config.pricing);
    let mut aggregator = CostAggregator::new(
        &calculator,
        entitlements.as_ref(),
        Some(&pricing),
        config.aggregation.cache_capacity,
    );

    let summary = aggregator.aggregate(&scans);
    match args.format {
        OutputFormat::Json => write_json(out, &summary),
        OutputFormat::Text => write_summary(out, &summary),
    }
}

pub fn project(
    scenario: &ScenarioArgs,
    format: OutputFormat,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let projection = ForwardProjector.project(&scenario.parameters());
    match format {
        OutputFormat::Json => write_json(out, &projection),
        OutputFormat::Text => write_projection(out, &projection, ""),
    }
}

pub fn solve(
    budget: f64,
    scenario: &ScenarioArgs,
    proposal: Option<&Path>,
    format: OutputFormat,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let previous_proposal = match proposal {
        Some(path) => Some(read_json::<ProposedScenario>(path)?.parameters),
        None => None,
    };

    let request = SolverRequest {
        target_budget: budget,
        current: scenario.parameters(),
        truck_count: scenario.trucks,
        previous_proposal,
    };
    let Some(outcome) = ReverseSolver::new().solve(&request) else {
        bail!("no solution: budget, wash time, dispensing rate and price must all be positive");
    };

    match format {
        OutputFormat::Json => write_json(out, &outcome),
        OutputFormat::Text => write_outcome(out, &outcome),
    }
}

fn write_summary(out: &mut impl Write, summary: &CostSummary) -> anyhow::Result<()> {
    let totals = &summary.totals;
    writeln!(out, "Scans costed:   {}", totals.scans)?;
    writeln!(out, "Scans excluded: {}", totals.excluded_scans)?;
    writeln!(out, "Catalog priced: {}", totals.catalog_priced_scans)?;
    writeln!(out, "Litres:         {:.2}", totals.litres)?;
    writeln!(out, "Cost:           {:.2}", totals.cost)?;
    writeln!(out)?;
    writeln!(out, "{:<24} {:>8} {:>10} {:>12}", "site", "scans", "litres", "cost")?;
    for (site, site_totals) in &summary.by_site {
        writeln!(
            out,
            "{:<24} {:>8} {:>10.2} {:>12.2}",
            site, site_totals.scans, site_totals.litres, site_totals.cost
        )?;
    }
    Ok(())
}

fn write_projection(
    out: &mut impl Write,
    projection: &ScenarioProjection,
    indent: &str,
) -> anyhow::Result<()> {
    let rows = [
        ("Litres per wash", projection.litres_per_wash),
        ("Litres per week per truck", projection.max_litres_per_week_per_truck),
        ("Litres per month per truck", projection.max_litres_per_month_per_truck),
        ("Cost per month per truck", projection.max_cost_per_month_per_truck),
        ("Cost per month (site)", projection.max_cost_per_month_site),
        ("Cost per year (site)", projection.max_cost_per_year_site),
    ];
    for (label, value) in rows {
        writeln!(out, "{indent}{:<29}{value:.2}", format!("{label}:"))?;
    }
    Ok(())
}

fn write_outcome(out: &mut impl Write, outcome: &SolverOutcome) -> anyhow::Result<()> {
    writeln!(out, "Target budget: {:.2} per month", outcome.target_budget)?;
    for option in &outcome.options {
        let params = &option.parameters;
        let status = if option.within_budget {
            "within budget"
        } else if option.is_infeasible() {
            "over budget at limit"
        } else {
            "over budget"
        };
        writeln!(out)?;
        writeln!(
            out,
            "Option {}: {} ({status})",
            option.strategy.label(),
            option.strategy.description()
        )?;
        writeln!(
            out,
            "  {:.0} s x {} washes/week, {} trucks",
            params.wash_time_seconds, params.washes_per_week, params.truck_count
        )?;
        write_projection(out, &option.projection, "  ")?;
    }
    Ok(())
}
