/// Error types for the pricer.
///
/// The pricing function itself is total and never fails. Errors come from:
/// - the boundary (bad input, unknown metric, nothing calculated yet)
/// - curve grid validation
/// - process setup (config, socket bind, task join)
#[derive(Debug, thiserror::Error)]
pub enum PricerError {
    #[error("invalid strike grid: {0}")]
    InvalidGrid(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    #[error("no curve has been calculated yet")]
    NoCurve,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("task failed: {0}")]
    Task(String),
}

impl PricerError {
    /// Whether the error was caused by the caller's request (as opposed to the service).
    #[inline]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PricerError::InvalidGrid(_)
                | PricerError::InvalidInput(_)
                | PricerError::UnknownMetric(_)
                | PricerError::NoCurve
        )
    }
}

impl From<std::io::Error> for PricerError {
    fn from(e: std::io::Error) -> Self {
        PricerError::Io(e.to_string())
    }
}

impl From<tokio::task::JoinError> for PricerError {
    fn from(e: tokio::task::JoinError) -> Self {
        PricerError::Task(e.to_string())
    }
}

pub type PricerResult<T> = Result<T, PricerError>;
