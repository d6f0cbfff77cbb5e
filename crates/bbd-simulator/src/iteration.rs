use bbd_sbloc::{step_year, step_year_monthly};
use bbd_types::{Portfolio, SblocState, SimulationConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::seed::sub_seed;

/// Everything one Monte Carlo iteration produces: the full yearly
/// trajectories the aggregator needs to build path-coherent percentiles,
/// the SBLOC trajectory (all zero when SBLOC is not configured), and the
/// raw per-year market returns -- kept separately from the SBLOC-adjusted
/// portfolio values so the Sell counterfactual can replay identical market
/// conditions without inheriting BBD's borrowing effects.
#[derive(Debug, Clone)]
pub struct IterationRecord {
    /// Length `horizon_years + 1`, index 0 is `v0`.
    pub year_portfolio_values: Vec<f64>,
    /// Length `horizon_years`, the portfolio-weighted (inflation-adjusted
    /// if configured) simple return applied in year `index + 1`.
    pub year_returns: Vec<f64>,
    /// Length `horizon_years + 1`, all zero when SBLOC is not configured.
    pub year_loan_balances: Vec<f64>,
    pub year_cumulative_interest: Vec<f64>,
    pub year_cumulative_withdrawals: Vec<f64>,
    pub first_margin_call_year: Option<u32>,
    pub cholesky_fallback_used: bool,
    pub terminal_value: f64,
}

fn weighted_return(weights: &[f64], row: &[f64]) -> f64 {
    bbd_numerics::kahan_sum(weights.iter().zip(row).map(|(w, r)| w * r))
}

fn adjust_for_inflation(r: f64, cfg: &SimulationConfig) -> f64 {
    if cfg.inflation_adjusted {
        (1.0 + r) / (1.0 + cfg.inflation_rate) - 1.0
    } else {
        r
    }
}

/// Runs one full iteration: generates this iteration's return matrix from
/// its own seeded sub-RNG, derives the portfolio-weighted yearly return
/// sequence, then threads it through the SBLOC engine (or, absent an SBLOC
/// config, plain compounding) year by year.
pub fn run_iteration(
    master_seed: u64,
    k: u64,
    sim_cfg: &SimulationConfig,
    portfolio: &Portfolio,
) -> IterationRecord {
    let mut rng = StdRng::seed_from_u64(sub_seed(master_seed, k));
    let horizon = sim_cfg.horizon_years as usize;
    let generated = bbd_returns::generate(&mut rng, portfolio, &sim_cfg.resampling, horizon);
    let weights = portfolio.weights();

    let year_returns: Vec<f64> = generated
        .matrix
        .iter()
        .map(|row| adjust_for_inflation(weighted_return(&weights, row), sim_cfg))
        .collect();

    let mut year_portfolio_values = Vec::with_capacity(horizon + 1);
    let mut year_loan_balances = Vec::with_capacity(horizon + 1);
    let mut year_cumulative_interest = Vec::with_capacity(horizon + 1);
    let mut year_cumulative_withdrawals = Vec::with_capacity(horizon + 1);
    year_portfolio_values.push(sim_cfg.initial_value);
    year_loan_balances.push(0.0);
    year_cumulative_interest.push(0.0);
    year_cumulative_withdrawals.push(0.0);

    let mut first_margin_call_year = None;

    match &sim_cfg.sbloc {
        Some(sbloc_cfg) => {
            let mut state = SblocState::initial(sim_cfg.initial_value);
            for (i, &r_y) in year_returns.iter().enumerate() {
                let year_index = (i + 1) as u32;
                let (next_state, year_result) = if sim_cfg.monthly_withdrawal {
                    step_year_monthly(&state, sbloc_cfg, r_y, year_index)
                } else {
                    step_year(&state, sbloc_cfg, r_y, year_index)
                };

                if first_margin_call_year.is_none() {
                    if let Some(mc) = year_result.margin_call {
                        first_margin_call_year = Some(mc.year);
                    }
                }

                state = next_state;
                year_portfolio_values.push(state.portfolio_value);
                year_loan_balances.push(state.loan_balance);
                year_cumulative_interest.push(state.cumulative_interest);
                year_cumulative_withdrawals.push(state.cumulative_withdrawals);
            }
        }
        None => {
            let mut value = sim_cfg.initial_value;
            for &r_y in &year_returns {
                value *= 1.0 + r_y;
                year_portfolio_values.push(value);
                year_loan_balances.push(0.0);
                year_cumulative_interest.push(0.0);
                year_cumulative_withdrawals.push(0.0);
            }
        }
    }

    let terminal_value = *year_portfolio_values.last().unwrap();

    IterationRecord {
        year_portfolio_values,
        year_returns,
        year_loan_balances,
        year_cumulative_interest,
        year_cumulative_withdrawals,
        first_margin_call_year,
        cholesky_fallback_used: generated.cholesky_fallback_used,
        terminal_value,
    }
}
