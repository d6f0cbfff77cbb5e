use bbd_types::SellCalculationConfig;

/// Outcome of replaying one market-return path under the Sell-strategy
/// counterfactual: sell assets each year to fund the withdrawal instead of
/// borrowing against them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SellPathResult {
    pub terminal_value: f64,
    pub total_dividend_tax: f64,
    pub total_capital_gains_tax: f64,
    pub total_withdrawals: f64,
}

/// Replays a representative market-return path (the same per-year returns
/// the BBD side saw, so the comparison is apples-to-apples) under the Sell
/// strategy: pay dividend tax, sell enough to net the withdrawal after
/// capital-gains tax, then apply that year's market return to what remains.
///
/// Order matters (spec 4.E): growth is applied to the *reduced* balance,
/// after the withdrawal leaves the account, not before. Applying it before
/// would overstate outcomes.
///
/// The capital-gains gross-up uses the withdrawal amount (not the
/// self-consistent sale amount) as the base for the embedded-gain
/// calculation: `tax = withdrawal * (1 - cost_basis_ratio) * capital_gains_rate`,
/// `gross_sale = withdrawal + tax`. This matches the reference
/// implementation's worked example exactly rather than solving the
/// slightly-different implicit equation a fully self-consistent gross-up
/// would require.
pub fn sell_counterfactual(
    market_returns: &[f64],
    v0: f64,
    annual_withdrawal: f64,
    cfg: &SellCalculationConfig,
) -> SellPathResult {
    let mut value = v0;
    let mut total_dividend_tax = 0.0;
    let mut total_capital_gains_tax = 0.0;
    let mut total_withdrawals = 0.0;

    for &r in market_returns {
        if value <= 0.0 {
            break;
        }

        let div_tax = value * cfg.dividend_yield * cfg.dividend_tax_rate;
        value -= div_tax;
        total_dividend_tax += div_tax;

        let tax = annual_withdrawal * (1.0 - cfg.cost_basis_ratio) * cfg.capital_gains_rate;
        let gross_sale = (annual_withdrawal + tax).min(value.max(0.0));
        value -= gross_sale;
        total_capital_gains_tax += tax;
        total_withdrawals += (gross_sale - tax).max(0.0);

        value *= 1.0 + r;
        if value < 0.0 {
            value = 0.0;
        }
    }

    SellPathResult {
        terminal_value: value,
        total_dividend_tax,
        total_capital_gains_tax,
        total_withdrawals,
    }
}
