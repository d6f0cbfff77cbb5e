use serde::{Deserialize, Serialize};

/// SBLOC state at a single year (or sub-year) boundary.
///
/// `ltv` is `+inf` when `portfolio_value` is zero: IEEE-754 infinity serves
/// as the sentinel rather than an `Option`, so `ltv >= max_ltv` stays
/// trivially true without a special case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SblocState {
    pub portfolio_value: f64,
    pub loan_balance: f64,
    pub years_since_start: u32,
    pub cumulative_interest: f64,
    pub cumulative_withdrawals: f64,
    pub in_warning_zone: bool,
    pub portfolio_failed: bool,
}

impl SblocState {
    pub fn initial(portfolio_value: f64) -> Self {
        Self {
            portfolio_value,
            loan_balance: 0.0,
            years_since_start: 0,
            cumulative_interest: 0.0,
            cumulative_withdrawals: 0.0,
            in_warning_zone: false,
            portfolio_failed: false,
        }
    }

    /// Loan-to-value ratio. `+inf` when the portfolio value is zero.
    pub fn ltv(&self) -> f64 {
        if self.portfolio_value > 0.0 {
            self.loan_balance / self.portfolio_value
        } else {
            f64::INFINITY
        }
    }

    /// Net worth is the failure criterion, not gross portfolio value alone.
    pub fn net_worth(&self) -> f64 {
        self.portfolio_value - self.loan_balance
    }
}

/// Emitted when LTV crosses `max_ltv` and forced liquidation is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginCallEvent {
    pub year: u32,
    pub portfolio_value_at_detection: f64,
    pub loan_balance: f64,
    pub ltv: f64,
    pub required_reduction: f64,
}

/// Emitted alongside every `MarginCallEvent`: the forced sale itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidationEvent {
    pub year: u32,
    pub assets_sold_gross: f64,
    pub haircut_loss: f64,
    pub capital_gains_tax: Option<f64>,
}

/// Result of stepping the SBLOC engine forward one year (or sub-year).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearResult {
    pub margin_call: Option<MarginCallEvent>,
    pub liquidation: Option<LiquidationEvent>,
    pub portfolio_failed: bool,
}

impl YearResult {
    pub fn none() -> Self {
        Self {
            margin_call: None,
            liquidation: None,
            portfolio_failed: false,
        }
    }
}
