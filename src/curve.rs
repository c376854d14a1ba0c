//! Sensitivity curves: price and Greeks across a ladder of strikes.
//!
//! Every point is an independent closed-form evaluation, so large ladders can be
//! fanned out across the rayon pool. `collect()` on an indexed parallel iterator
//! keeps strike order.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;

use crate::errors::{PricerError, PricerResult};
use crate::models::{OptionContract, PricingModel, PricingResult};

/// Strike ladder relative to a base strike.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrikeGrid {
    pub point_count: usize,
    pub low_factor: f64,
    pub high_factor: f64,
}

impl Default for StrikeGrid {
    fn default() -> Self {
        Self {
            point_count: 50,
            low_factor: 0.8,
            high_factor: 1.2,
        }
    }
}

impl StrikeGrid {
    pub fn validate(&self) -> PricerResult<()> {
        if self.point_count < 2 {
            return Err(PricerError::InvalidGrid(format!(
                "point_count must be at least 2, got {}",
                self.point_count
            )));
        }
        if !self.low_factor.is_finite() || !self.high_factor.is_finite() {
            return Err(PricerError::InvalidGrid("factors must be finite".into()));
        }
        if self.low_factor >= self.high_factor {
            return Err(PricerError::InvalidGrid(format!(
                "low_factor {} must be below high_factor {}",
                self.low_factor, self.high_factor
            )));
        }
        Ok(())
    }

    /// Multiplier applied to the base strike at index `i`.
    /// Exactly `low_factor` at 0 and exactly `high_factor` at the last index.
    #[inline]
    fn factor(&self, i: usize) -> f64 {
        let t = i as f64 / (self.point_count - 1) as f64;
        self.low_factor * (1.0 - t) + self.high_factor * t
    }

    /// The strike ladder. Call `validate()` first.
    pub fn strikes(&self, base_strike: f64) -> Vec<f64> {
        (0..self.point_count)
            .map(|i| base_strike * self.factor(i))
            .collect()
    }
}

/// A named series on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Metric {
    Price,
    Delta,
    Gamma,
    Vega,
    Theta,
    Rho,
}

impl Metric {
    /// Display order.
    pub const ALL: [Metric; 6] = [
        Metric::Price,
        Metric::Delta,
        Metric::Gamma,
        Metric::Vega,
        Metric::Theta,
        Metric::Rho,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "Price",
            Self::Delta => "Delta",
            Self::Gamma => "Gamma",
            Self::Vega => "Vega",
            Self::Theta => "Theta",
            Self::Rho => "Rho",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = PricerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "price" | "option price" => Ok(Self::Price),
            "delta" => Ok(Self::Delta),
            "gamma" => Ok(Self::Gamma),
            "vega" => Ok(Self::Vega),
            "theta" => Ok(Self::Theta),
            "rho" => Ok(Self::Rho),
            _ => Err(PricerError::UnknownMetric(s.to_string())),
        }
    }
}

/// Parallel value series, one per metric, serialised keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurveSeries {
    #[serde(rename = "Price")]
    pub price: Vec<f64>,
    #[serde(rename = "Delta")]
    pub delta: Vec<f64>,
    #[serde(rename = "Gamma")]
    pub gamma: Vec<f64>,
    #[serde(rename = "Vega")]
    pub vega: Vec<f64>,
    #[serde(rename = "Theta")]
    pub theta: Vec<f64>,
    #[serde(rename = "Rho")]
    pub rho: Vec<f64>,
}

impl CurveSeries {
    fn with_capacity(n: usize) -> Self {
        Self {
            price: Vec::with_capacity(n),
            delta: Vec::with_capacity(n),
            gamma: Vec::with_capacity(n),
            vega: Vec::with_capacity(n),
            theta: Vec::with_capacity(n),
            rho: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, r: &PricingResult) {
        self.price.push(r.price);
        self.delta.push(r.delta);
        self.gamma.push(r.gamma);
        self.vega.push(r.vega);
        self.theta.push(r.theta);
        self.rho.push(r.rho);
    }
}

/// Strikes plus one aligned series per metric.
/// Invariant: every series has `strikes.len()` entries.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Curve {
    pub strikes: Vec<f64>,
    pub series: CurveSeries,
}

impl Curve {
    fn from_points(strikes: Vec<f64>, points: &[PricingResult]) -> Self {
        let mut series = CurveSeries::with_capacity(points.len());
        for p in points {
            series.push(p);
        }
        Self { strikes, series }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strikes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }

    pub fn series(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Price => &self.series.price,
            Metric::Delta => &self.series.delta,
            Metric::Gamma => &self.series.gamma,
            Metric::Vega => &self.series.vega,
            Metric::Theta => &self.series.theta,
            Metric::Rho => &self.series.rho,
        }
    }

    /// Strike and full result at index `i`.
    pub fn point(&self, i: usize) -> Option<(f64, PricingResult)> {
        let strike = *self.strikes.get(i)?;
        let s = &self.series;
        Some((
            strike,
            PricingResult {
                price: *s.price.get(i)?,
                delta: *s.delta.get(i)?,
                gamma: *s.gamma.get(i)?,
                vega: *s.vega.get(i)?,
                theta: *s.theta.get(i)?,
                rho: *s.rho.get(i)?,
            },
        ))
    }
}

/// Price `base` across the grid's strikes, holding every other field fixed.
/// Sequential evaluation.
pub fn generate_curve(
    model: &dyn PricingModel,
    base: &OptionContract,
    grid: &StrikeGrid,
) -> PricerResult<Curve> {
    generate_curve_with(model, base, grid, usize::MAX)
}

/// Like `generate_curve`, but ladders with at least `parallel_threshold`
/// points are evaluated on the rayon pool.
pub fn generate_curve_with(
    model: &dyn PricingModel,
    base: &OptionContract,
    grid: &StrikeGrid,
    parallel_threshold: usize,
) -> PricerResult<Curve> {
    grid.validate()?;

    let strikes = grid.strikes(base.strike);
    let parallel = grid.point_count >= parallel_threshold;

    let points: Vec<PricingResult> = if parallel {
        strikes
            .par_iter()
            .map(|&k| model.price_and_greeks(&base.with_strike(k)))
            .collect()
    } else {
        strikes
            .iter()
            .map(|&k| model.price_and_greeks(&base.with_strike(k)))
            .collect()
    };

    tracing::debug!(
        model = model.name(),
        points = points.len(),
        parallel,
        low = strikes.first().copied().unwrap_or_default(),
        high = strikes.last().copied().unwrap_or_default(),
        "curve generated"
    );

    Ok(Curve::from_points(strikes, &points))
}
