use thiserror::Error;

/// Validation failures detected before a simulation run begins.
///
/// These are always fatal: the core never attempts to repair an invalid
/// configuration, it rejects it with the offending field named.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("asset weights sum to {actual}, expected 1.0 +/- 1e-9")]
    WeightsDoNotSumToOne { actual: f64 },

    #[error("asset '{asset_id}' has only {len} historical returns, need at least 5")]
    HistoryTooShort { asset_id: String, len: usize },

    #[error("correlation matrix is {rows}x{cols}, expected {expected}x{expected}")]
    CorrelationMatrixWrongShape {
        rows: usize,
        cols: usize,
        expected: usize,
    },

    #[error("correlation matrix is not symmetric at ({i}, {j}): {a} != {b}")]
    CorrelationMatrixNotSymmetric { i: usize, j: usize, a: f64, b: f64 },

    #[error("correlation matrix diagonal entry at {i} is {value}, expected 1.0")]
    CorrelationMatrixBadDiagonal { i: usize, value: f64 },

    #[error("correlation entry at ({i}, {j}) is {value}, outside [-1, 1]")]
    CorrelationEntryOutOfRange { i: usize, j: usize, value: f64 },

    #[error("SBLOC maintenance margin {maintenance} must be > 0 and <= max LTV {max_ltv}")]
    InvalidMarginThresholds { maintenance: f64, max_ltv: f64 },

    #[error("SBLOC haircut {haircut} must be in [0, 1)")]
    InvalidHaircut { haircut: f64 },

    #[error("SBLOC annual rate {rate} must be >= 0")]
    NegativeRate { rate: f64 },

    #[error("time horizon must be a positive integer number of years, got {0}")]
    NonPositiveHorizon(i64),

    #[error("iteration count must be positive, got {0}")]
    NonPositiveIterations(i64),

    #[error("initial portfolio value must be > 0, got {0}")]
    NonPositiveInitialValue(f64),

    #[error("inflation rate must be >= 0, got {0}")]
    NegativeInflation(f64),

    #[error("portfolio has no assets")]
    EmptyPortfolio,
}

/// Cooperative-cancellation outcome distinct from `ConfigurationError`: the
/// configuration was valid but the run was stopped before any iteration
/// completed, so there is no partial aggregate to return.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("simulation cancelled before any iteration completed")]
pub struct CancelledBeforeStart;

/// Top-level error returned by a simulation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    CancelledBeforeStart(#[from] CancelledBeforeStart),
}
