//! Conversion from user-facing units into the pricing core's units.
//!
//! Users enter time to expiry in days and rate/volatility in percent. The core
//! only ever sees years and decimals. Everything rejected here never reaches
//! the model.

use crate::curve::StrikeGrid;
use crate::errors::{PricerError, PricerResult};
use crate::models::{OptionContract, OptionType};

/// Simple days to years convention.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Largest strike ladder a client may request.
pub const MAX_REQUEST_POINTS: usize = 100_000;

/// A calculation request as submitted by a client.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CalculationRequest {
    pub futures_price: f64,
    pub strike: f64,
    pub days_to_expiry: f64,
    /// Percent, e.g. 3.5 for 3.5%
    pub rate_pct: f64,
    /// Percent, e.g. 20 for 20%
    pub volatility_pct: f64,
    pub option_type: OptionType,
    #[serde(default)]
    pub point_count: Option<usize>,
    #[serde(default)]
    pub low_factor: Option<f64>,
    #[serde(default)]
    pub high_factor: Option<f64>,
}

impl CalculationRequest {
    /// Reject non-finite numbers, then convert units.
    /// Zero or negative values pass through; the model maps them to zeros.
    pub fn to_contract(&self) -> PricerResult<OptionContract> {
        let fields = [
            ("futures_price", self.futures_price),
            ("strike", self.strike),
            ("days_to_expiry", self.days_to_expiry),
            ("rate_pct", self.rate_pct),
            ("volatility_pct", self.volatility_pct),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(PricerError::InvalidInput(format!("{name} must be finite")));
            }
        }

        Ok(OptionContract::new(
            self.futures_price,
            self.strike,
            self.days_to_expiry / DAYS_PER_YEAR,
            self.rate_pct / 100.0,
            self.volatility_pct / 100.0,
            self.option_type,
        ))
    }

    /// Overlay any per-request grid overrides on the configured default.
    pub fn grid(&self, defaults: &StrikeGrid) -> PricerResult<StrikeGrid> {
        let grid = StrikeGrid {
            point_count: self.point_count.unwrap_or(defaults.point_count),
            low_factor: self.low_factor.unwrap_or(defaults.low_factor),
            high_factor: self.high_factor.unwrap_or(defaults.high_factor),
        };
        if grid.point_count > MAX_REQUEST_POINTS {
            return Err(PricerError::InvalidInput(format!(
                "point_count must be at most {MAX_REQUEST_POINTS}, got {}",
                grid.point_count
            )));
        }
        grid.validate()?;
        Ok(grid)
    }
}

/// The same request as raw text fields, the way a form submits it.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TextCalculationRequest {
    pub futures_price: String,
    pub strike: String,
    pub days_to_expiry: String,
    pub rate_pct: String,
    pub volatility_pct: String,
    pub option_type: String,
}

impl TextCalculationRequest {
    pub fn parse(&self) -> PricerResult<CalculationRequest> {
        Ok(CalculationRequest {
            futures_price: parse_field("futures_price", &self.futures_price)?,
            strike: parse_field("strike", &self.strike)?,
            days_to_expiry: parse_field("days_to_expiry", &self.days_to_expiry)?,
            rate_pct: parse_field("rate_pct", &self.rate_pct)?,
            volatility_pct: parse_field("volatility_pct", &self.volatility_pct)?,
            option_type: self.option_type.parse()?,
            point_count: None,
            low_factor: None,
            high_factor: None,
        })
    }
}

/// Parse a raw text field, naming it in the error.
pub fn parse_field(name: &str, text: &str) -> PricerResult<f64> {
    let value = text
        .trim()
        .parse::<f64>()
        .map_err(|e| PricerError::InvalidInput(format!("{name}: {e}")))?;
    if !value.is_finite() {
        return Err(PricerError::InvalidInput(format!("{name} must be finite")));
    }
    Ok(value)
}
