//! Budget-constrained search for operating parameters.
//!
//! Given a monthly site budget, the solver proposes three options: shorter
//! washes, fewer washes per week, and a combination of both. Each is a greedy
//! descent over bounded integer grids, so it always terminates. When a bound
//! is reached while still over budget the bound value is returned and the
//! option is flagged rather than rejected.

use crate::constants::calendar::WEEKS_PER_MONTH;
use crate::constants::solver::{
    DEFAULT_COMBINED_WASH_TIME_SECONDS, MAX_WASH_TIME_SECONDS, MAX_WASHES_PER_WEEK,
    MIN_WASH_TIME_SECONDS, MIN_WASHES_PER_WEEK, WASH_TIME_STEP_SECONDS, WASHES_PER_WEEK_STEP,
};
use crate::constants::wash::SECONDS_PER_MINUTE;
use crate::projection::{CostOracle, ForwardProjector};
use fleetwash_types::{ScenarioParameters, ScenarioProjection};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Tolerance for treating two projected costs as the same figure
const COST_EPSILON: f64 = 0.005;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverRequest {
    /// Monthly budget for the whole site
    pub target_budget: f64,
    pub current: ScenarioParameters,
    pub truck_count: u32,
    /// Previously saved proposal, used to seed the combined option
    #[serde(default)]
    pub previous_proposal: Option<ScenarioParameters>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStrategy {
    /// Option A: keep washes per week, shorten the wash
    ReduceWashTime,
    /// Option B: keep the wash time, wash less often
    ReduceWashesPerWeek,
    /// Option C: adjust both
    Combined,
}

impl SolverStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            SolverStrategy::ReduceWashTime => "A",
            SolverStrategy::ReduceWashesPerWeek => "B",
            SolverStrategy::Combined => "C",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SolverStrategy::ReduceWashTime => "Reduce wash time",
            SolverStrategy::ReduceWashesPerWeek => "Reduce washes per week",
            SolverStrategy::Combined => "Reduce wash time and washes per week",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverOption {
    pub strategy: SolverStrategy,
    pub parameters: ScenarioParameters,
    pub projection: ScenarioProjection,
    /// Projected monthly site cost is at or below the budget
    pub within_budget: bool,
    /// The varied parameters sit on their lower search bound
    pub at_bound: bool,
}

impl SolverOption {
    /// Bounds were exhausted without reaching the budget.
    pub fn is_infeasible(&self) -> bool {
        self.at_bound && !self.within_budget
    }

    fn same_plan(&self, other: &SolverOption) -> bool {
        self.parameters.wash_time_seconds == other.parameters.wash_time_seconds
            && self.parameters.washes_per_week == other.parameters.washes_per_week
            && (self.projection.max_cost_per_month_site
                - other.projection.max_cost_per_month_site)
                .abs()
                < COST_EPSILON
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverOutcome {
    pub target_budget: f64,
    /// Options A, B and C in that order
    pub options: [SolverOption; 3],
}

/// Step `start` down by `step` until `cost(value)` fits `budget` or `lower` is reached.
fn descend(start: f64, step: f64, lower: f64, budget: f64, cost: impl Fn(f64) -> f64) -> f64 {
    let mut value = start;
    while value > lower && cost(value) > budget {
        value = (value - step).max(lower);
    }
    value
}

fn round_to_step(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[derive(Debug, Clone, Default)]
pub struct ReverseSolver<O = ForwardProjector> {
    oracle: O,
}

impl ReverseSolver<ForwardProjector> {
    pub fn new() -> Self {
        Self { oracle: ForwardProjector }
    }
}

impl<O: CostOracle> ReverseSolver<O> {
    pub fn with_oracle(oracle: O) -> Self {
        Self { oracle }
    }

    /// Produce options A, B and C for the request.
    ///
    /// Returns `None` when the budget is not a positive number or the current
    /// wash time, dispensing rate or price cannot be projected.
    #[instrument(skip_all, fields(budget = request.target_budget))]
    pub fn solve(&self, request: &SolverRequest) -> Option<SolverOutcome> {
        let current = &request.current;
        if !positive(request.target_budget)
            || !positive(current.wash_time_seconds)
            || !positive(current.dispensing_rate)
            || !positive(current.price_per_litre)
        {
            debug!("Solver request has no usable budget or parameters");
            return None;
        }

        let search = Search::new(&self.oracle, request);
        let a = search.reduce_wash_time();
        let b = search.reduce_washes_per_week();
        let c = search.combined(request.previous_proposal.as_ref());

        let b = search.make_distinct(b, &[&a]);
        let c = search.make_distinct(c, &[&a, &b]);

        for option in [&a, &b, &c] {
            if option.is_infeasible() {
                warn!(
                    option = option.strategy.label(),
                    projected = option.projection.max_cost_per_month_site,
                    "Budget not reachable within search bounds"
                );
            } else {
                debug!(
                    option = option.strategy.label(),
                    wash_time_seconds = option.parameters.wash_time_seconds,
                    washes_per_week = option.parameters.washes_per_week,
                    projected = option.projection.max_cost_per_month_site,
                    "Solver option"
                );
            }
        }

        Some(SolverOutcome { target_budget: request.target_budget, options: [a, b, c] })
    }
}

/// Search state for one request.
struct Search<'a, O> {
    oracle: &'a O,
    base: ScenarioParameters,
    budget: f64,
    /// Litres per truck per week the budget pays for
    weekly_litres_target: f64,
}

impl<'a, O: CostOracle> Search<'a, O> {
    fn new(oracle: &'a O, request: &SolverRequest) -> Self {
        let trucks = request.truck_count.max(1);
        let base = ScenarioParameters { truck_count: trucks, ..request.current.clone() };
        let weekly_litres_target =
            request.target_budget / trucks as f64 / base.price_per_litre / WEEKS_PER_MONTH;
        Self { oracle, base, budget: request.target_budget, weekly_litres_target }
    }

    fn params(&self, wash_time_seconds: f64, washes_per_week: u32) -> ScenarioParameters {
        ScenarioParameters { wash_time_seconds, washes_per_week, ..self.base.clone() }
    }

    fn cost(&self, wash_time_seconds: f64, washes_per_week: u32) -> f64 {
        let params = self.params(wash_time_seconds, washes_per_week);
        self.oracle.project(&params).max_cost_per_month_site
    }

    /// Wash time hitting the litre target at `washes_per_week`, on the 6 s grid.
    fn wash_time_for(&self, washes_per_week: u32) -> f64 {
        let litres_per_wash = self.weekly_litres_target / washes_per_week.max(1) as f64;
        let seconds = litres_per_wash / self.base.dispensing_rate * SECONDS_PER_MINUTE;
        round_to_step(seconds, WASH_TIME_STEP_SECONDS)
            .clamp(MIN_WASH_TIME_SECONDS, MAX_WASH_TIME_SECONDS)
    }

    /// Washes per week hitting the litre target at `wash_time_seconds`.
    fn washes_for(&self, wash_time_seconds: f64) -> u32 {
        let litres_per_wash = wash_time_seconds / SECONDS_PER_MINUTE * self.base.dispensing_rate;
        let washes = (self.weekly_litres_target / litres_per_wash).round();
        washes.clamp(MIN_WASHES_PER_WEEK as f64, MAX_WASHES_PER_WEEK as f64) as u32
    }

    fn descend_washes(&self, wash_time_seconds: f64, start: u32) -> u32 {
        descend(
            start as f64,
            WASHES_PER_WEEK_STEP as f64,
            MIN_WASHES_PER_WEEK as f64,
            self.budget,
            |washes| self.cost(wash_time_seconds, washes as u32),
        ) as u32
    }

    fn option(
        &self,
        strategy: SolverStrategy,
        wash_time_seconds: f64,
        washes_per_week: u32,
    ) -> SolverOption {
        let parameters = self.params(wash_time_seconds, washes_per_week);
        let projection = self.oracle.project(&parameters);
        let within_budget = projection.max_cost_per_month_site <= self.budget;
        let at_bound = match strategy {
            SolverStrategy::ReduceWashTime => wash_time_seconds <= MIN_WASH_TIME_SECONDS,
            SolverStrategy::ReduceWashesPerWeek => washes_per_week <= MIN_WASHES_PER_WEEK,
            SolverStrategy::Combined => {
                wash_time_seconds <= MIN_WASH_TIME_SECONDS && washes_per_week <= MIN_WASHES_PER_WEEK
            }
        };
        SolverOption { strategy, parameters, projection, within_budget, at_bound }
    }

    fn reduce_wash_time(&self) -> SolverOption {
        let washes = self.base.washes_per_week;
        let start = self.wash_time_for(washes);
        let wash_time = descend(
            start,
            WASH_TIME_STEP_SECONDS,
            MIN_WASH_TIME_SECONDS,
            self.budget,
            |seconds| self.cost(seconds, washes),
        );
        self.option(SolverStrategy::ReduceWashTime, wash_time, washes)
    }

    fn reduce_washes_per_week(&self) -> SolverOption {
        let wash_time = self.base.wash_time_seconds;
        let washes = self.descend_washes(wash_time, self.washes_for(wash_time));
        self.option(SolverStrategy::ReduceWashesPerWeek, wash_time, washes)
    }

    fn combined(&self, previous: Option<&ScenarioParameters>) -> SolverOption {
        let mut wash_time = match previous.map(|p| p.wash_time_seconds).filter(|s| positive(*s)) {
            Some(proposed) => {
                let midpoint = (self.base.wash_time_seconds + proposed) / 2.0;
                round_to_step(midpoint, WASH_TIME_STEP_SECONDS)
                    .clamp(MIN_WASH_TIME_SECONDS, MAX_WASH_TIME_SECONDS)
            }
            None => DEFAULT_COMBINED_WASH_TIME_SECONDS,
        };

        loop {
            let washes = self.descend_washes(wash_time, self.washes_for(wash_time));
            if self.cost(wash_time, washes) <= self.budget || wash_time <= MIN_WASH_TIME_SECONDS {
                return self.option(SolverStrategy::Combined, wash_time, washes);
            }
            wash_time = (wash_time - WASH_TIME_STEP_SECONDS).max(MIN_WASH_TIME_SECONDS);
        }
    }

    /// Nudge `option` away from any plan in `taken`: fewer washes first, then
    /// shorter washes, keeping the first candidate that is still within budget.
    /// Left unchanged when no such candidate exists.
    fn make_distinct(&self, option: SolverOption, taken: &[&SolverOption]) -> SolverOption {
        if !taken.iter().any(|t| option.same_plan(t)) {
            return option;
        }

        let wash_time = option.parameters.wash_time_seconds;
        let washes = option.parameters.washes_per_week;
        let accept = |candidate: &SolverOption| {
            candidate.within_budget && !taken.iter().any(|t| candidate.same_plan(t))
        };

        for fewer in (MIN_WASHES_PER_WEEK..washes).rev() {
            let candidate = self.option(option.strategy, wash_time, fewer);
            if accept(&candidate) {
                return candidate;
            }
        }

        let mut shorter = wash_time - WASH_TIME_STEP_SECONDS;
        while shorter >= MIN_WASH_TIME_SECONDS {
            let candidate = self.option(option.strategy, shorter, washes);
            if accept(&candidate) {
                return candidate;
            }
            shorter -= WASH_TIME_STEP_SECONDS;
        }

        debug!(option = option.strategy.label(), "No distinct feasible alternative");
        option
    }
}
