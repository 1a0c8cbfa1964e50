// vsense_core/src/error.rs

use thiserror::Error;

/// Rejected engine configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("period `{name}` must be positive and fit the microsecond counter, got {value}")]
    InvalidPeriod { name: &'static str, value: f64 },

    #[error("smoothing constant `{name}` must lie in [0, 1), got {value}")]
    InvalidSmoothing { name: &'static str, value: f64 },

    #[error("`{name}` must be finite and non-negative, got {value}")]
    InvalidMagnitude { name: &'static str, value: f64 },
}

/// Failure reported by a stage of the estimation filter chain.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("filter stage `{stage}` was run before init")]
    NotInitialized { stage: &'static str },

    #[error("filter stage `{stage}` produced a non-finite value")]
    NonFinite { stage: &'static str },

    #[error("filter stage `{stage}` must run before `{ahead}`, which is ahead of it in the chain")]
    StageOrder {
        stage: &'static str,
        ahead: &'static str,
    },
}
