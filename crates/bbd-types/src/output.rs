use serde::{Deserialize, Serialize};

/// Percentile ranks reported for every year.
pub const PERCENTILE_RANKS: [u8; 5] = [10, 25, 50, 75, 90];

/// Percentile values of the portfolio-value path for a single year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyPercentiles {
    pub year: u32,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl YearlyPercentiles {
    /// Year-0 row: every percentile equals `v0`, so downstream growth-rate
    /// calculations have a valid base.
    pub fn seed(v0: f64) -> Self {
        Self {
            year: 0,
            p10: v0,
            p25: v0,
            p50: v0,
            p75: v0,
            p90: v0,
        }
    }
}

/// Terminal-value summary statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminalStatistics {
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
    /// Fraction (0-100) of iterations with terminal value > initial value.
    pub success_rate: f64,
}

/// Per-year loan-balance percentiles plus median cumulative interest and
/// withdrawals-by-year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SblocTrajectory {
    pub years: Vec<u32>,
    pub loan_balance_p10: Vec<f64>,
    pub loan_balance_p25: Vec<f64>,
    pub loan_balance_p50: Vec<f64>,
    pub loan_balance_p75: Vec<f64>,
    pub loan_balance_p90: Vec<f64>,
    pub cumulative_withdrawals: Vec<f64>,
    pub median_cumulative_interest: Vec<f64>,
}

/// Per-year probability of a *first* margin call, and its running-maximum
/// cumulative probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginCallYearStat {
    pub year: u32,
    pub probability: f64,
    pub cumulative_probability: f64,
}

/// BBD-vs-Sell net estate comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstateAnalysis {
    pub bbd_net_estate: f64,
    pub sell_net_estate: f64,
    pub bbd_advantage: f64,
    pub embedded_capital_gains: f64,
    pub stepped_up_basis_savings: f64,
}

/// Run status: whether the simulation ran to completion or was cancelled
/// mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    Cancelled,
}

/// Advisory flags surfaced alongside an otherwise-valid result. These are
/// never errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Advisories {
    /// At least one iteration's correlation matrix was not positive
    /// definite; the generator fell back to independent draws for it.
    pub cholesky_fallback_used: bool,
    /// At least one aggregate computation would have produced NaN and was
    /// substituted with 0.
    pub nan_substituted: bool,
}

/// The full result bundle a simulation run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub terminal_values: Vec<f64>,
    pub yearly_percentiles: Vec<YearlyPercentiles>,
    pub statistics: TerminalStatistics,
    pub sbloc_trajectory: Option<SblocTrajectory>,
    pub margin_call_stats: Option<Vec<MarginCallYearStat>>,
    pub estate_analysis: Option<EstateAnalysis>,
    pub status: RunStatus,
    pub advisories: Advisories,
}
