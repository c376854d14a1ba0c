pub mod black76;

use std::fmt;
use std::str::FromStr;

use crate::errors::PricerError;

/// Pricing models implement this trait.
/// price_and_greeks() must be a pure function: deterministic output from inputs only.
/// Send + Sync required for use across tokio tasks and rayon workers.
pub trait PricingModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Price and Greeks for a European option. Never panics, never returns NaN/Inf.
    fn price_and_greeks(&self, contract: &OptionContract) -> PricingResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = PricerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(Self::Call),
            "put" | "p" => Ok(Self::Put),
            other => Err(PricerError::InvalidInput(format!("option type: {other}"))),
        }
    }
}

/// A European option on a forward/futures price. All fields are already
/// annualised and in decimal form (see `boundary` for the unit conversions).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[repr(C)]
pub struct OptionContract {
    pub forward: f64,
    pub strike: f64,
    /// Years
    pub time_to_expiry: f64,
    pub rate: f64,
    pub volatility: f64,
    pub option_type: OptionType,
}

impl OptionContract {
    #[inline]
    pub fn new(
        forward: f64,
        strike: f64,
        time_to_expiry: f64,
        rate: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            forward,
            strike,
            time_to_expiry,
            rate,
            volatility,
            option_type,
        }
    }

    /// Same contract at a different strike.
    #[inline]
    pub fn with_strike(&self, strike: f64) -> Self {
        Self { strike, ..*self }
    }

    /// True when the closed form is undefined (T, sigma, F or K not strictly positive).
    /// NaN in any of those fields also counts as degenerate.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.time_to_expiry > 0.0
            && self.volatility > 0.0
            && self.forward > 0.0
            && self.strike > 0.0)
    }
}

/// Price and first/second order sensitivities. Stack-allocated.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[repr(C)]
pub struct PricingResult {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
}

impl PricingResult {
    /// Returned for degenerate contracts.
    pub const ZERO: Self = Self {
        price: 0.0,
        delta: 0.0,
        gamma: 0.0,
        vega: 0.0,
        theta: 0.0,
        rho: 0.0,
    };

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.price.is_finite()
            && self.delta.is_finite()
            && self.gamma.is_finite()
            && self.vega.is_finite()
            && self.theta.is_finite()
            && self.rho.is_finite()
    }
}

impl fmt::Display for PricingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Option Price: {:.4}", self.price)?;
        writeln!(f, "Delta: {:.4}", self.delta)?;
        writeln!(f, "Gamma: {:.6}", self.gamma)?;
        writeln!(f, "Vega: {:.4}", self.vega)?;
        writeln!(f, "Theta: {:.4}", self.theta)?;
        write!(f, "Rho: {:.4}", self.rho)
    }
}
