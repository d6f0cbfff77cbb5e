use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// How compounding is applied within the SBLOC step function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundingFrequency {
    Annual,
    Monthly,
}

/// Tagged-variant return-generation method. The driver pattern-matches
/// once; `bbd-returns`'s inner loops are monomorphic per arm rather than
/// dispatching on a method name at every iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ResamplingMethod {
    /// Correlated single-index bootstrap.
    Simple,
    /// Correlated block (stationary) bootstrap. `block_size` of `None` means
    /// the generator picks an auto-length from the history size.
    Block { block_size: Option<usize> },
    /// 4-regime Markov-switching model with fat-tailed innovations.
    Regime { calibration: RegimeCalibrationMode },
}

impl Default for ResamplingMethod {
    fn default() -> Self {
        ResamplingMethod::Simple
    }
}

/// Regime calibration mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeCalibrationMode {
    Historical,
    Conservative,
}

/// Configuration for the SBLOC subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SblocConfig {
    pub annual_rate: f64,
    pub max_ltv: f64,
    pub maintenance_margin: f64,
    pub liquidation_haircut: f64,
    pub annual_withdrawal: f64,
    pub compounding: CompoundingFrequency,
    /// Year offset (relative to the simulation start) at which SBLOC
    /// borrowing begins.
    pub start_year_offset: u32,
    /// Percentage-point buffer below `maintenance_margin` at which the
    /// position is flagged `in_warning_zone`. Default 0.10 (10 percentage
    /// points).
    #[serde(default = "default_warning_buffer")]
    pub warning_buffer: f64,
}

fn default_warning_buffer() -> f64 {
    0.10
}

impl SblocConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.maintenance_margin > 0.0 && self.maintenance_margin <= self.max_ltv)
            || self.max_ltv >= 1.0
        {
            return Err(ConfigurationError::InvalidMarginThresholds {
                maintenance: self.maintenance_margin,
                max_ltv: self.max_ltv,
            });
        }
        if !(0.0..1.0).contains(&self.liquidation_haircut) {
            return Err(ConfigurationError::InvalidHaircut {
                haircut: self.liquidation_haircut,
            });
        }
        if self.annual_rate < 0.0 {
            return Err(ConfigurationError::NegativeRate {
                rate: self.annual_rate,
            });
        }
        Ok(())
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub iterations: u32,
    /// Time horizon in integer years.
    pub horizon_years: u32,
    pub initial_value: f64,
    pub inflation_rate: f64,
    pub inflation_adjusted: bool,
    pub resampling: ResamplingMethod,
    /// Deterministic seed. `None` seeds from system entropy once, at the
    /// start of `run()`; within that process the run is still reproducible
    /// given the derived master seed.
    pub seed: Option<String>,
    pub sbloc: Option<SblocConfig>,
    #[serde(default)]
    pub monthly_withdrawal: bool,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.horizon_years == 0 {
            return Err(ConfigurationError::NonPositiveHorizon(0));
        }
        if self.iterations == 0 {
            return Err(ConfigurationError::NonPositiveIterations(0));
        }
        if self.initial_value <= 0.0 {
            return Err(ConfigurationError::NonPositiveInitialValue(self.initial_value));
        }
        if self.inflation_rate < 0.0 {
            return Err(ConfigurationError::NegativeInflation(self.inflation_rate));
        }
        if let Some(sbloc) = &self.sbloc {
            sbloc.validate()?;
        }
        Ok(())
    }
}

/// Inputs to the Sell-strategy counterfactual.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SellCalculationConfig {
    #[serde(default = "default_cost_basis_ratio")]
    pub cost_basis_ratio: f64,
    #[serde(default = "default_dividend_yield")]
    pub dividend_yield: f64,
    #[serde(default = "default_dividend_tax_rate")]
    pub dividend_tax_rate: f64,
    #[serde(default = "default_capital_gains_rate")]
    pub capital_gains_rate: f64,
}

fn default_cost_basis_ratio() -> f64 {
    0.4
}
fn default_dividend_yield() -> f64 {
    0.02
}
fn default_dividend_tax_rate() -> f64 {
    0.238
}
fn default_capital_gains_rate() -> f64 {
    0.238
}

impl Default for SellCalculationConfig {
    fn default() -> Self {
        Self {
            cost_basis_ratio: default_cost_basis_ratio(),
            dividend_yield: default_dividend_yield(),
            dividend_tax_rate: default_dividend_tax_rate(),
            capital_gains_rate: default_capital_gains_rate(),
        }
    }
}

/// 2025 federal estate-tax exemption, used by estate analysis when the
/// caller does not override it.
pub const DEFAULT_ESTATE_TAX_EXEMPTION: f64 = 13_990_000.0;
