//! The two entry points a presentation layer needs:
//!
//! - `on_calculate`: contract in, full snapshot (headline result + curve) out
//! - `on_select_metric`: pick one series out of an existing curve
//!
//! Switching metrics never reprices. The only coupling between the two is the
//! `Curve` value the caller holds on to.

use crate::curve::{self, Curve, Metric, StrikeGrid};
use crate::errors::PricerResult;
use crate::models::{OptionContract, PricingModel, PricingResult};

/// Everything produced by one calculation request. Immutable once built.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CalculationSnapshot {
    pub request_id: String,
    /// Arrival order of the request; 0 until a publisher assigns one
    pub sequence: u64,
    pub computed_at: String,
    pub model: &'static str,
    pub contract: OptionContract,
    pub grid: StrikeGrid,
    /// Price and Greeks at the requested strike
    pub result: PricingResult,
    pub curve: Curve,
}

/// One metric's values against strike, ready to plot.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetricSeries {
    pub metric: Metric,
    pub strikes: Vec<f64>,
    pub values: Vec<f64>,
}

pub fn on_calculate(
    model: &dyn PricingModel,
    contract: &OptionContract,
    grid: &StrikeGrid,
    parallel_threshold: usize,
) -> PricerResult<CalculationSnapshot> {
    let curve = curve::generate_curve_with(model, contract, grid, parallel_threshold)?;
    let result = model.price_and_greeks(contract);

    if result.is_zero() {
        tracing::debug!(contract = ?contract, "degenerate contract, zero result");
    }

    Ok(CalculationSnapshot {
        request_id: uuid::Uuid::new_v4().to_string(),
        sequence: 0,
        computed_at: chrono::Utc::now().to_rfc3339(),
        model: model.name(),
        contract: *contract,
        grid: *grid,
        result,
        curve,
    })
}

pub fn on_select_metric(curve: &Curve, name: &str) -> PricerResult<MetricSeries> {
    let metric: Metric = name.parse()?;
    Ok(MetricSeries {
        metric,
        strikes: curve.strikes.clone(),
        values: curve.series(metric).to_vec(),
    })
}
