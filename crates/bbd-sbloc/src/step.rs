use bbd_types::{LiquidationEvent, MarginCallEvent, SblocConfig, SblocState, YearResult};

/// Safety multiplier applied to the maintenance margin to pick the
/// post-liquidation target LTV: selling down to exactly the maintenance
/// threshold would re-trigger on the next adverse tick, so the engine
/// sells further, to 80% of maintenance.
const LIQUIDATION_TARGET_MULTIPLIER: f64 = 0.8;

/// Advances SBLOC state by one year given the portfolio-weighted simple
/// return `r` for that year. Pure: takes state and config by value/reference
/// and returns a new state plus the year's event record. Fixed step order:
/// apply return, withdraw, accrue interest on the post-withdrawal balance,
/// check LTV, force-liquidate if over `max_ltv`, then check net-worth
/// failure.
pub fn step_year(state: &SblocState, cfg: &SblocConfig, r: f64, year_index: u32) -> (SblocState, YearResult) {
    step_period(state, cfg, r, cfg.annual_rate, cfg.annual_withdrawal, year_index, true)
}

/// Advances SBLOC state by one year in 12 monthly sub-steps. Applies the
/// annual return as 12 equal geometric monthly returns and withdraws
/// `annual_withdrawal / 12` each month at `annual_rate / 12`. At most one
/// `MarginCallEvent` (the first) is reported for the year;
/// `years_since_start` increments exactly once, at the twelfth sub-step.
pub fn step_year_monthly(
    state: &SblocState,
    cfg: &SblocConfig,
    annual_return: f64,
    year_index: u32,
) -> (SblocState, YearResult) {
    let monthly_rate = cfg.annual_rate / 12.0;
    let monthly_withdrawal = cfg.annual_withdrawal / 12.0;
    let monthly_return = (1.0 + annual_return).powf(1.0 / 12.0) - 1.0;

    let mut current = *state;
    let mut first_margin_call = None;
    let mut first_liquidation = None;

    for month in 0..12u32 {
        let (next, month_result) =
            step_period(&current, cfg, monthly_return, monthly_rate, monthly_withdrawal, year_index, false);
        current = next;
        if first_margin_call.is_none() {
            first_margin_call = month_result.margin_call;
        }
        if first_liquidation.is_none() {
            first_liquidation = month_result.liquidation;
        }
        if month_result.portfolio_failed {
            current.portfolio_failed = true;
            break;
        }
        if month == 11 {
            current.years_since_start += 1;
        }
    }

    let result = YearResult {
        margin_call: first_margin_call,
        liquidation: first_liquidation,
        portfolio_failed: current.portfolio_failed,
    };
    (current, result)
}

/// Shared single-period step used by both the annual and monthly paths.
/// `advance_year_counter` is true for the annual path (which always
/// increments `years_since_start` once) and false for monthly sub-steps
/// (which increment it only on the twelfth call, handled by the caller).
fn step_period(
    state: &SblocState,
    cfg: &SblocConfig,
    r: f64,
    period_rate: f64,
    period_withdrawal: f64,
    year_index: u32,
    advance_year_counter: bool,
) -> (SblocState, YearResult) {
    if state.portfolio_failed {
        return (*state, YearResult::none());
    }

    let value_after_return = state.portfolio_value * (1.0 + r);
    let loan_after_withdrawal = state.loan_balance + period_withdrawal;
    let loan_after_interest = loan_after_withdrawal * (1.0 + period_rate);

    let ltv = if value_after_return > 0.0 {
        loan_after_interest / value_after_return
    } else {
        f64::INFINITY
    };

    let warning_zone = ltv >= cfg.maintenance_margin - cfg.warning_buffer && ltv < cfg.max_ltv;

    let mut value_final = value_after_return;
    let mut loan_final = loan_after_interest;
    let mut margin_call = None;
    let mut liquidation = None;

    if ltv >= cfg.max_ltv {
        let target = cfg.maintenance_margin * LIQUIDATION_TARGET_MULTIPLIER;
        let denom = 1.0 - cfg.liquidation_haircut - target;
        let gross_sale = if denom > 0.0 {
            ((loan_after_interest - target * value_after_return) / denom).clamp(0.0, value_after_return)
        } else {
            value_after_return
        };

        value_final = value_after_return - gross_sale;
        loan_final = loan_after_interest - gross_sale * (1.0 - cfg.liquidation_haircut);
        let haircut_loss = gross_sale * cfg.liquidation_haircut;

        margin_call = Some(MarginCallEvent {
            year: year_index,
            portfolio_value_at_detection: value_after_return,
            loan_balance: loan_after_interest,
            ltv,
            required_reduction: gross_sale,
        });
        liquidation = Some(LiquidationEvent {
            year: year_index,
            assets_sold_gross: gross_sale,
            haircut_loss,
            capital_gains_tax: None,
        });
        tracing::debug!(year = year_index, ltv, gross_sale, "margin call triggered forced liquidation");
    }

    let net_worth = value_final - loan_final;
    let portfolio_failed = net_worth <= 0.0;
    if portfolio_failed {
        tracing::warn!(year = year_index, net_worth, "portfolio failed: net worth reached zero");
    }

    let years_since_start = if advance_year_counter {
        state.years_since_start + 1
    } else {
        state.years_since_start
    };

    let next_state = SblocState {
        portfolio_value: if portfolio_failed { 0.0 } else { value_final },
        loan_balance: if portfolio_failed { 0.0 } else { loan_final },
        years_since_start,
        cumulative_interest: state.cumulative_interest + (loan_after_interest - loan_after_withdrawal),
        cumulative_withdrawals: state.cumulative_withdrawals + period_withdrawal,
        in_warning_zone: warning_zone,
        portfolio_failed,
    };

    let year_result = YearResult {
        margin_call,
        liquidation,
        portfolio_failed,
    };

    (next_state, year_result)
}

/// "Effective annual rate" a nominal monthly-compounded rate implies, e.g.
/// 7.4% nominal compounds to roughly 7.66% effective. Informational only:
/// `step_year_monthly` always uses `annual_rate / 12` as the nominal
/// monthly rate and never calls this helper.
pub fn effective_annual_rate_under_monthly_compounding(annual_rate: f64) -> f64 {
    (1.0 + annual_rate / 12.0).powi(12) - 1.0
}

/// Recovery check: the maximum proceeds a full liquidation could raise is
/// `portfolio_value * (1 - haircut)`. If that is still less than
/// `loan_balance`, the position is terminally underwater and forced
/// liquidation cannot recover it.
pub fn is_terminally_underwater(portfolio_value: f64, loan_balance: f64, haircut: f64) -> bool {
    portfolio_value * (1.0 - haircut) < loan_balance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bbd_types::CompoundingFrequency;

    fn sbloc_config() -> SblocConfig {
        SblocConfig {
            annual_rate: 0.074,
            max_ltv: 0.65,
            maintenance_margin: 0.50,
            liquidation_haircut: 0.05,
            annual_withdrawal: 50_000.0,
            compounding: CompoundingFrequency::Annual,
            start_year_offset: 0,
            warning_buffer: 0.10,
        }
    }

    #[test]
    fn scenario_s2_loan_plus_withdrawal() {
        let state = SblocState::initial(100_000.0);
        let cfg = sbloc_config();
        let (next, _) = step_year(&state, &cfg, 0.0, 1);
        assert_relative_eq!(next.loan_balance, 53_700.0, epsilon = 1e-6);
        assert_relative_eq!(next.portfolio_value, 100_000.0, epsilon = 1e-6);
    }

    #[test]
    fn scenario_s4_margin_call_liquidation() {
        let state = SblocState {
            portfolio_value: 700_000.0,
            loan_balance: 500_000.0,
            ..SblocState::initial(700_000.0)
        };
        let cfg = SblocConfig {
            annual_rate: 0.0,
            max_ltv: 0.65,
            maintenance_margin: 0.50,
            liquidation_haircut: 0.05,
            annual_withdrawal: 0.0,
            compounding: CompoundingFrequency::Annual,
            start_year_offset: 0,
            warning_buffer: 0.10,
        };
        let (next, result) = step_year(&state, &cfg, 0.0, 1);
        let margin_call = result.margin_call.expect("expected a margin call");
        assert_relative_eq!(margin_call.required_reduction, 400_000.0, epsilon = 1.0);
        assert_relative_eq!(next.portfolio_value, 300_000.0, epsilon = 1.0);
        assert_relative_eq!(next.loan_balance, 120_000.0, epsilon = 1.0);
        assert_relative_eq!(next.loan_balance / next.portfolio_value, 0.40, epsilon = 1e-6);
    }

    #[test]
    fn portfolio_failure_is_net_worth_not_gross_value() {
        let state = SblocState {
            portfolio_value: 50_000.0,
            loan_balance: 60_000.0,
            ..SblocState::initial(50_000.0)
        };
        let cfg = sbloc_config();
        let (next, result) = step_year(&state, &cfg, 0.0, 5);
        assert!(result.portfolio_failed);
        assert_eq!(next.portfolio_value, 0.0);
        assert_eq!(next.loan_balance, 0.0);
    }

    #[test]
    fn failed_state_is_idempotent() {
        let mut state = SblocState::initial(50_000.0);
        state.portfolio_failed = true;
        let cfg = sbloc_config();
        let (next, result) = step_year(&state, &cfg, 0.3, 6);
        assert!(result.portfolio_failed);
        assert_eq!(next, state);
    }

    #[test]
    fn years_since_start_increments_once_for_monthly_mode() {
        let state = SblocState::initial(1_000_000.0);
        let cfg = sbloc_config();
        let (next, _) = step_year_monthly(&state, &cfg, 0.10, 1);
        assert_eq!(next.years_since_start, 1);
    }

    #[test]
    fn monthly_mode_reports_only_first_margin_call() {
        let state = SblocState {
            portfolio_value: 700_000.0,
            loan_balance: 500_000.0,
            ..SblocState::initial(700_000.0)
        };
        let cfg = SblocConfig {
            annual_rate: 0.074,
            max_ltv: 0.65,
            maintenance_margin: 0.50,
            liquidation_haircut: 0.05,
            annual_withdrawal: 0.0,
            compounding: CompoundingFrequency::Monthly,
            start_year_offset: 0,
            warning_buffer: 0.10,
        };
        let (_, result) = step_year_monthly(&state, &cfg, -0.30, 1);
        assert!(result.margin_call.is_some());
    }

    #[test]
    fn effective_rate_exceeds_nominal_rate() {
        let effective = effective_annual_rate_under_monthly_compounding(0.074);
        assert!(effective > 0.074);
        assert_relative_eq!(effective, 0.0765696, epsilon = 1e-4);
    }

    #[test]
    fn terminally_underwater_detects_insufficient_haircut_proceeds() {
        assert!(is_terminally_underwater(100_000.0, 96_000.0, 0.05));
        assert!(!is_terminally_underwater(100_000.0, 90_000.0, 0.05));
    }
}
