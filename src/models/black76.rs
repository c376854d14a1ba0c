use crate::models::{OptionContract, OptionType, PricingModel, PricingResult};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Black-76 pricing for European options on futures/forwards.
///
/// d1 = (ln(F/K) + sigma^2*T/2) / (sigma * sqrt(T))
/// d2 = d1 - sigma * sqrt(T)
/// DF = exp(-r*T)
///
/// call = DF * (F*N(d1) - K*N(d2))
/// put  = DF * (K*N(-d2) - F*N(-d1))
///
/// Gamma and vega are computed once, before the call/put branch, so both
/// sides share the exact same value.
///
/// No allocations per call.
pub struct Black76 {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl Black76 {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }
}

impl Default for Black76 {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingModel for Black76 {
    #[inline]
    fn name(&self) -> &'static str {
        "Black-76"
    }

    #[inline]
    fn price_and_greeks(&self, contract: &OptionContract) -> PricingResult {
        // Guard: T, sigma, F, K must be strictly positive. Zeros keep the chart
        // flat while a user is half way through editing a field.
        if contract.is_degenerate() {
            return PricingResult::ZERO;
        }

        let OptionContract {
            forward: f,
            strike: k,
            time_to_expiry: t,
            rate: r,
            volatility: sigma,
            option_type,
        } = *contract;

        let sqrt_t = t.sqrt();
        let sigma_sqrt_t = sigma * sqrt_t;
        let d1 = ((f / k).ln() + 0.5 * sigma * sigma * t) / sigma_sqrt_t;
        let d2 = d1 - sigma_sqrt_t;
        let df = (-r * t).exp();
        let pdf_d1 = self.normal.pdf(d1);

        let gamma = df * pdf_d1 / (f * sigma_sqrt_t);
        let vega = f * df * pdf_d1 * sqrt_t;
        let time_decay = -f * sigma * df * pdf_d1 / (2.0 * sqrt_t);

        let result = match option_type {
            OptionType::Call => {
                let nd1 = self.normal.cdf(d1);
                let nd2 = self.normal.cdf(d2);
                PricingResult {
                    price: df * (f * nd1 - k * nd2),
                    delta: df * nd1,
                    gamma,
                    vega,
                    theta: time_decay - r * k * df * nd2,
                    rho: -t * k * df * nd2,
                }
            }
            OptionType::Put => {
                let n_minus_d1 = self.normal.cdf(-d1);
                let n_minus_d2 = self.normal.cdf(-d2);
                PricingResult {
                    price: df * (k * n_minus_d2 - f * n_minus_d1),
                    delta: -df * n_minus_d1,
                    gamma,
                    vega,
                    theta: time_decay + r * k * df * n_minus_d2,
                    rho: t * k * df * n_minus_d2,
                }
            }
        };

        // exp(-rT) can overflow and sigma*sqrt(T) can underflow for absurd but
        // finite inputs. Never hand NaN/Inf to a renderer.
        if !result.is_finite() {
            tracing::debug!(
                forward = f,
                strike = k,
                t = t,
                rate = r,
                sigma = sigma,
                "non-finite Black-76 result, returning zero"
            );
            return PricingResult::ZERO;
        }

        result
    }
}

/// Convenience wrapper for callers that do not hold a model instance.
#[inline]
pub fn price_and_greeks(
    forward: f64,
    strike: f64,
    time_to_expiry: f64,
    rate: f64,
    volatility: f64,
    option_type: OptionType,
) -> PricingResult {
    Black76::new().price_and_greeks(&OptionContract::new(
        forward,
        strike,
        time_to_expiry,
        rate,
        volatility,
        option_type,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TOL: f64 = 1e-3;

    fn atm(option_type: OptionType) -> OptionContract {
        OptionContract::new(100.0, 100.0, 1.0, 0.0, 0.2, option_type)
    }

    fn assert_close(actual: f64, expected: f64, what: &str) {
        assert!(
            (actual - expected).abs() < TOL,
            "{what}: got {actual}, expected {expected}"
        );
    }

    #[test]
    fn test_reference_call() {
        let r = Black76::new().price_and_greeks(&atm(OptionType::Call));
        assert_close(r.price, 7.9656, "price");
        assert_close(r.delta, 0.53983, "delta");
        assert_close(r.gamma, 0.019848, "gamma");
        assert_close(r.vega, 39.6953, "vega");
        assert_close(r.theta, -3.9695, "theta");
        assert_close(r.rho, -46.0172, "rho");
    }

    #[test]
    fn test_reference_put() {
        let r = Black76::new().price_and_greeks(&atm(OptionType::Put));
        assert_close(r.price, 7.9656, "price");
        assert_close(r.delta, -0.46017, "delta");
        assert_close(r.gamma, 0.019848, "gamma");
        assert_close(r.vega, 39.6953, "vega");
        assert_close(r.theta, -3.9695, "theta");
        assert_close(r.rho, 53.9828, "rho");
    }

    #[test]
    fn test_degenerate_inputs_are_exactly_zero() {
        let model = Black76::new();
        let base = OptionContract::new(100.0, 100.0, 1.0, 0.03, 0.2, OptionType::Call);
        let cases = [
            OptionContract { time_to_expiry: 0.0, ..base },
            OptionContract { volatility: 0.0, ..base },
            OptionContract { forward: 0.0, ..base },
            OptionContract { strike: 0.0, ..base },
            OptionContract { time_to_expiry: -1.0, ..base },
            OptionContract { volatility: f64::NAN, ..base },
        ];
        for c in cases {
            for option_type in [OptionType::Call, OptionType::Put] {
                let r = model.price_and_greeks(&OptionContract { option_type, ..c });
                assert_eq!(r, PricingResult::ZERO, "degenerate {c:?} gave {r:?}");
            }
        }
    }

    #[test]
    fn test_discount_overflow_returns_zero() {
        // exp(1e6) overflows
        let r = price_and_greeks(100.0, 100.0, 10.0, -1e5, 0.2, OptionType::Call);
        assert!(r.is_zero(), "overflowing discount factor should give zero: {r:?}");
    }

    #[test]
    fn test_put_call_parity_with_rates() {
        let model = Black76::new();
        let call = OptionContract::new(2_350.0, 2_400.0, 90.0 / 365.0, 0.035, 0.28, OptionType::Call);
        let put = OptionContract { option_type: OptionType::Put, ..call };
        let c = model.price_and_greeks(&call);
        let p = model.price_and_greeks(&put);
        let df = (-call.rate * call.time_to_expiry).exp();
        let parity = df * (call.forward - call.strike);
        assert!((c.price - p.price - parity).abs() < 1e-6, "parity broken: {} vs {parity}", c.price - p.price);
    }

    #[test]
    fn test_deep_itm_call_delta_near_discount() {
        let r = price_and_greeks(150.0, 100.0, 0.25, 0.05, 0.2, OptionType::Call);
        let df = (-0.05_f64 * 0.25).exp();
        assert!((r.delta - df).abs() < 1e-3, "deep ITM call delta={} should approach DF={df}", r.delta);
        assert!(r.gamma < 1e-3, "deep ITM gamma should vanish: {}", r.gamma);
    }

    #[test]
    fn test_free_function_matches_model() {
        let c = OptionContract::new(80.0, 95.0, 0.5, 0.02, 0.35, OptionType::Put);
        let via_model = Black76::new().price_and_greeks(&c);
        let via_fn = price_and_greeks(80.0, 95.0, 0.5, 0.02, 0.35, OptionType::Put);
        assert_eq!(via_model, via_fn);
    }

    proptest! {
        #[test]
        fn prop_total_over_finite_inputs(
            f in -1e6f64..1e6,
            k in -1e6f64..1e6,
            t in -5.0f64..50.0,
            r in -5.0f64..5.0,
            sigma in -1.0f64..5.0,
            is_call in any::<bool>(),
        ) {
            let option_type = if is_call { OptionType::Call } else { OptionType::Put };
            let res = price_and_greeks(f, k, t, r, sigma, option_type);
            prop_assert!(res.is_finite(), "non-finite result {:?}", res);
        }

        #[test]
        fn prop_shared_greeks_and_parity(
            f in 1.0f64..10_000.0,
            k in 1.0f64..10_000.0,
            t in 0.01f64..10.0,
            r in -0.05f64..0.2,
            sigma in 0.01f64..2.0,
        ) {
            let model = Black76::new();
            let call = OptionContract::new(f, k, t, r, sigma, OptionType::Call);
            let put = OptionContract { option_type: OptionType::Put, ..call };
            let c = model.price_and_greeks(&call);
            let p = model.price_and_greeks(&put);

            prop_assert!((c.gamma - p.gamma).abs() < 1e-9);
            prop_assert!((c.vega - p.vega).abs() < 1e-9);

            let df = (-r * t).exp();
            prop_assert!((c.price - p.price - df * (f - k)).abs() < 1e-6);
        }
    }
}
