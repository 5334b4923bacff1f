//! Error taxonomy for the comparison engine
//!
//! Numerical failures (root finding), configuration failures (unknown test
//! type, mismatched paired samples) and identity failures are explicit.
//! Small groups, malformed display names and ordering failures are not
//! errors at all; they degrade locally and never reach this type.

use thiserror::Error;

/// Errors raised by the statistical core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Root is not bracketed: f({lower}) = {f_lower} and f({upper}) = {f_upper} have the same sign")]
    RootNotBracketed {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },

    #[error("Function evaluation at x = {x} produced a non-finite value ({value})")]
    FunctionNotFinite { x: f64, value: f64 },

    #[error("Root search exceeded {0} iterations")]
    MaxIterationsReached(usize),

    #[error("Search bounds must be finite: [{lower}, {upper}]")]
    NonFiniteBound { lower: f64, upper: f64 },

    #[error("Tolerance must be non-negative, got {0}")]
    NegativeTolerance(f64),

    #[error("Paired samples must have equal length: {before} vs {after}")]
    DimensionMismatch { before: usize, after: usize },

    #[error("Exact p-value is unavailable when the samples contain zero differences")]
    ExactWithZeros,

    #[error("Unsupported test type: {0}")]
    UnsupportedTestType(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot order an absent test case identity")]
    MissingTestCaseId,

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),
}

impl From<std::io::Error> for StatsError {
    fn from(err: std::io::Error) -> Self {
        StatsError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for StatsError {
    fn from(err: toml::de::Error) -> Self {
        StatsError::ConfigParse(err.to_string())
    }
}

/// Result type for the statistical core
pub type Result<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_diagnostic() {
        let err = StatsError::RootNotBracketed {
            lower: 0.0,
            upper: 10.0,
            f_lower: 1.0,
            f_upper: 101.0,
        };
        assert!(err.to_string().contains("not bracketed"));

        let err = StatsError::DimensionMismatch {
            before: 3,
            after: 4,
        };
        assert!(err.to_string().contains("3 vs 4"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
        let err: StatsError = io.into();
        assert!(matches!(err, StatsError::Io(ref msg) if msg.contains("missing.toml")));
    }
}
