use crate::curve::StrikeGrid;
use crate::errors::{PricerError, PricerResult};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    /// Default strike ladder used when a request does not override it
    pub default_grid: StrikeGrid,
    /// Curves with at least this many points are priced on the rayon pool
    pub parallel_threshold: usize,
}

impl AppConfig {
    pub fn from_env() -> PricerResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_or("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| PricerError::Config(format!("SERVER_PORT: {e}")))?;

        let point_count = env_var_or("CURVE_POINTS", "50")
            .parse::<usize>()
            .map_err(|e| PricerError::Config(format!("CURVE_POINTS: {e}")))?;

        let low_factor = env_var_or("CURVE_LOW_FACTOR", "0.8")
            .parse::<f64>()
            .map_err(|e| PricerError::Config(format!("CURVE_LOW_FACTOR: {e}")))?;

        let high_factor = env_var_or("CURVE_HIGH_FACTOR", "1.2")
            .parse::<f64>()
            .map_err(|e| PricerError::Config(format!("CURVE_HIGH_FACTOR: {e}")))?;

        let parallel_threshold = env_var_or("PARALLEL_THRESHOLD", "256")
            .parse::<usize>()
            .map_err(|e| PricerError::Config(format!("PARALLEL_THRESHOLD: {e}")))?;

        let default_grid = StrikeGrid {
            point_count,
            low_factor,
            high_factor,
        };
        default_grid
            .validate()
            .map_err(|e| PricerError::Config(format!("default curve grid: {e}")))?;

        Ok(Self {
            server_port,
            default_grid,
            parallel_threshold,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 3001,
            default_grid: StrikeGrid::default(),
            parallel_threshold: 256,
        }
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
