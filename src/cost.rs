//! Cost engine: per-model breakdowns, severity tiers, and recurring-cost
//! projections.
//!
//! Every function here is pure. Breakdowns are recomputed from the catalog
//! on each call, so a catalog change reprices saved history retroactively.

use serde::Serialize;

use crate::pricing::{CostThresholds, ModelPricing};

/// Fixed days-per-month used for projections (not calendar-aware).
pub const DAYS_PER_MONTH: f64 = 30.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Cost of one request against one catalog entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub model_name: String,
    pub input_cost: f64,
    pub output_cost: f64,
    /// Always exactly `input_cost + output_cost`.
    pub total_cost: f64,
    pub color: String,
    pub provider: String,
}

/// Severity tier of a dollar amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostSeverity {
    Cheap,
    Moderate,
    Expensive,
}

impl CostSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cheap => "cheap",
            Self::Moderate => "moderate",
            Self::Expensive => "expensive",
        }
    }
}

/// Recurring cost of one model at a fixed request rate.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageProjection {
    pub model_name: String,
    pub provider: String,
    /// Requests per day.
    pub frequency: u64,
    pub cost_per_request: f64,
    pub monthly_cost: f64,
    pub yearly_cost: f64,
}

// ---------------------------------------------------------------------------
// Breakdown
// ---------------------------------------------------------------------------

/// Cost of a single request against `model`.
pub fn calculate_cost(input_tokens: usize, output_tokens: usize, model: &ModelPricing) -> f64 {
    let (input, output) = split_cost(input_tokens, output_tokens, model);
    input + output
}

fn split_cost(input_tokens: usize, output_tokens: usize, model: &ModelPricing) -> (f64, f64) {
    let input = input_tokens as f64 / 1000.0 * model.input_cost_per_1k;
    let output = output_tokens as f64 / 1000.0 * model.output_cost_per_1k;
    (input, output)
}

/// One breakdown per catalog entry, in catalog order.
pub fn get_cost_breakdown(
    catalog: &[ModelPricing],
    input_tokens: usize,
    output_tokens: usize,
) -> Vec<CostBreakdown> {
    catalog
        .iter()
        .map(|model| {
            let (input_cost, output_cost) = split_cost(input_tokens, output_tokens, model);
            CostBreakdown {
                model_name: model.name.clone(),
                input_cost,
                output_cost,
                total_cost: input_cost + output_cost,
                color: model.color.clone(),
                provider: model.provider.clone(),
            }
        })
        .collect()
}

/// Classify a cost against the ascending thresholds.
pub fn cost_severity(cost: f64, thresholds: &CostThresholds) -> CostSeverity {
    if cost <= thresholds.cheap {
        CostSeverity::Cheap
    } else if cost <= thresholds.moderate {
        CostSeverity::Moderate
    } else {
        CostSeverity::Expensive
    }
}

/// Mean total cost across breakdowns; 0 for an empty list.
pub fn average_cost(breakdowns: &[CostBreakdown]) -> f64 {
    if breakdowns.is_empty() {
        return 0.0;
    }
    breakdowns.iter().map(|b| b.total_cost).sum::<f64>() / breakdowns.len() as f64
}

/// Lowest total cost. Ties keep the earliest entry.
pub fn cheapest(breakdowns: &[CostBreakdown]) -> Option<&CostBreakdown> {
    breakdowns.iter().reduce(|best, b| {
        if b.total_cost < best.total_cost {
            b
        } else {
            best
        }
    })
}

/// Highest total cost. Ties keep the earliest entry.
pub fn most_expensive(breakdowns: &[CostBreakdown]) -> Option<&CostBreakdown> {
    breakdowns.iter().reduce(|best, b| {
        if b.total_cost > best.total_cost {
            b
        } else {
            best
        }
    })
}

/// Keep breakdowns from `provider` (case-insensitive). `None` or `"all"`
/// keeps everything.
pub fn filter_by_provider(breakdowns: &[CostBreakdown], provider: Option<&str>) -> Vec<CostBreakdown> {
    match provider {
        None => breakdowns.to_vec(),
        Some(p) if p.eq_ignore_ascii_case("all") => breakdowns.to_vec(),
        Some(p) => breakdowns
            .iter()
            .filter(|b| b.provider.eq_ignore_ascii_case(p))
            .cloned()
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// `cost_per_request * requests_per_day * 30`.
pub fn calculate_monthly_projection(cost_per_request: f64, requests_per_day: u64) -> f64 {
    cost_per_request * requests_per_day as f64 * DAYS_PER_MONTH
}

/// Monthly projection times 12.
pub fn calculate_yearly_projection(cost_per_request: f64, requests_per_day: u64) -> f64 {
    calculate_monthly_projection(cost_per_request, requests_per_day) * MONTHS_PER_YEAR
}

/// Project every breakdown at `requests_per_day`.
pub fn project_usage(breakdowns: &[CostBreakdown], requests_per_day: u64) -> Vec<UsageProjection> {
    breakdowns
        .iter()
        .map(|b| {
            let monthly_cost = calculate_monthly_projection(b.total_cost, requests_per_day);
            UsageProjection {
                model_name: b.model_name.clone(),
                provider: b.provider.clone(),
                frequency: requests_per_day,
                cost_per_request: b.total_cost,
                monthly_cost,
                yearly_cost: monthly_cost * MONTHS_PER_YEAR,
            }
        })
        .collect()
}

/// Monthly cost per model for each frequency in `ladder`.
///
/// Returns one row per frequency; each row holds projections in breakdown
/// order.
pub fn projection_table(breakdowns: &[CostBreakdown], ladder: &[u64]) -> Vec<(u64, Vec<UsageProjection>)> {
    ladder
        .iter()
        .map(|&freq| (freq, project_usage(breakdowns, freq)))
        .collect()
}

/// Monthly savings of the cheapest model over the most expensive one.
pub fn potential_savings(projections: &[UsageProjection]) -> f64 {
    let monthly = projections.iter().map(|p| p.monthly_cost);
    let max = monthly.clone().fold(f64::NEG_INFINITY, f64::max);
    let min = monthly.fold(f64::INFINITY, f64::min);
    if projections.is_empty() {
        0.0
    } else {
        max - min
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
