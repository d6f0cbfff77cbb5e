use bbd_analytics::{estate_analysis, margin_call_stats, sell_counterfactual, EstateInputs};
use bbd_numerics::{mean, percentile, round_significant, std_dev, VarianceMode};
use bbd_types::{
    Advisories, CancelledBeforeStart, ConfigurationError, Portfolio, RunStatus, SblocTrajectory,
    SellCalculationConfig, SimulationConfig, SimulationError, SimulationOutput, TerminalStatistics,
};
use rayon::prelude::*;

use crate::iteration::{run_iteration, IterationRecord};
use crate::percentile::{path_coherent_yearly_percentiles, representative_iteration_index};
use crate::progress::{Progress, ProgressStatus, RunCallbacks};
use crate::seed::resolve_master_seed;

/// Iterations are dispatched to rayon in batches so progress and
/// cancellation can be checked on the calling thread between batches
/// without serializing the whole run (spec 4.D/5: cooperative cancellation
/// "between iterations", progress "at a throttled cadence decoupled from
/// the iteration rate").
const BATCH_SIZE: usize = 256;

/// Significant figures applied to every numeric field at the output
/// boundary (spec 4.A).
const OUTPUT_SIG_FIGS: u32 = 6;

/// Runs a full Monte Carlo simulation: validates the configuration and
/// portfolio, then iterates `sim_cfg.iterations` independent paths (each
/// seeded deterministically from `(master_seed, iteration_index)` so the
/// result does not depend on how rayon schedules the work), and aggregates
/// the result into a `SimulationOutput`.
///
/// `sell_cfg` parameterizes the Sell-strategy counterfactual used to build
/// `estate_analysis`; when `None`, `SellCalculationConfig::default()` is
/// used. `callbacks` is entirely optional and never required for a correct
/// result.
pub fn run(
    sim_cfg: &SimulationConfig,
    portfolio: &Portfolio,
    sell_cfg: Option<&SellCalculationConfig>,
    mut callbacks: RunCallbacks,
) -> Result<SimulationOutput, SimulationError> {
    sim_cfg.validate().map_err(SimulationError::from)?;
    portfolio.validate().map_err(SimulationError::from)?;

    let n = sim_cfg.iterations as usize;
    let master_seed = resolve_master_seed(sim_cfg.seed.as_deref());

    let span = tracing::info_span!(
        "simulation_run",
        iterations = n,
        horizon_years = sim_cfg.horizon_years
    );
    let _enter = span.enter();

    let mut records: Vec<IterationRecord> = Vec::with_capacity(n);
    let mut cancelled = false;

    for batch_start in (0..n).step_by(BATCH_SIZE) {
        let batch_end = (batch_start + BATCH_SIZE).min(n);
        let mut batch: Vec<IterationRecord> = (batch_start..batch_end)
            .into_par_iter()
            .map(|k| run_iteration(master_seed, k as u64, sim_cfg, portfolio))
            .collect();
        records.append(&mut batch);

        callbacks.report(Progress {
            percent: records.len() as f64 / n as f64 * 100.0,
            iteration: records.len() as u32,
            status: ProgressStatus::Running,
        });

        if callbacks.is_cancelled() {
            cancelled = true;
            tracing::warn!(completed = records.len(), "simulation run cancelled");
            break;
        }
    }

    if records.is_empty() {
        return Err(SimulationError::CancelledBeforeStart(CancelledBeforeStart));
    }

    let output = aggregate(sim_cfg, sell_cfg.cloned_or_default(), &records, cancelled);

    callbacks.report(Progress {
        percent: 100.0,
        iteration: records.len() as u32,
        status: if cancelled {
            ProgressStatus::Cancelled
        } else {
            ProgressStatus::Complete
        },
    });

    Ok(output)
}

/// Small local extension so `run()` reads naturally without a stray
/// `.cloned().unwrap_or_default()` at the call site.
trait OrDefault {
    fn cloned_or_default(self) -> SellCalculationConfig;
}
impl OrDefault for Option<&SellCalculationConfig> {
    fn cloned_or_default(self) -> SellCalculationConfig {
        self.copied().unwrap_or_default()
    }
}

fn aggregate(
    sim_cfg: &SimulationConfig,
    sell_cfg: SellCalculationConfig,
    records: &[IterationRecord],
    cancelled: bool,
) -> SimulationOutput {
    let mut advisories = Advisories::default();
    advisories.cholesky_fallback_used = records.iter().any(|r| r.cholesky_fallback_used);

    let terminal_values: Vec<f64> = records.iter().map(|r| r.terminal_value).collect();
    let v0 = sim_cfg.initial_value;

    let statistics = terminal_statistics(&terminal_values, v0, &mut advisories);
    let yearly_percentiles =
        path_coherent_yearly_percentiles(records, sim_cfg.horizon_years, v0);

    let sbloc_trajectory = sim_cfg
        .sbloc
        .as_ref()
        .map(|_| sbloc_trajectory(records, sim_cfg.horizon_years, &mut advisories));

    let margin_call_stats_out = sim_cfg.sbloc.as_ref().map(|_| {
        let first_calls: Vec<Option<u32>> = records.iter().map(|r| r.first_margin_call_year).collect();
        margin_call_stats(&first_calls, sim_cfg.horizon_years)
    });

    let estate = sim_cfg.sbloc.as_ref().map(|sbloc_cfg| {
        let rep_idx = representative_iteration_index(&terminal_values, 50.0);
        let rep = &records[rep_idx];
        let sell = sell_counterfactual(&rep.year_returns, v0, sbloc_cfg.annual_withdrawal, &sell_cfg);
        estate_analysis(EstateInputs {
            bbd_median_terminal_value: rep.terminal_value,
            bbd_median_loan_balance: *rep.year_loan_balances.last().unwrap(),
            sell_terminal_value: sell.terminal_value,
            cost_basis_ratio: sell_cfg.cost_basis_ratio,
            capital_gains_tax_rate: sell_cfg.capital_gains_rate,
        })
    });

    let output = SimulationOutput {
        terminal_values: terminal_values
            .iter()
            .map(|&v| round_significant(v, OUTPUT_SIG_FIGS))
            .collect(),
        yearly_percentiles: yearly_percentiles
            .into_iter()
            .map(|p| round_yearly_percentiles(p, &mut advisories))
            .collect(),
        statistics,
        sbloc_trajectory,
        margin_call_stats: margin_call_stats_out.map(|stats| {
            stats
                .into_iter()
                .map(|s| round_margin_call_stat(s, &mut advisories))
                .collect()
        }),
        estate_analysis: estate.map(|e| round_estate(e, &mut advisories)),
        status: if cancelled {
            RunStatus::Cancelled
        } else {
            RunStatus::Complete
        },
        advisories,
    };

    output
}

fn terminal_statistics(terminal_values: &[f64], v0: f64, advisories: &mut Advisories) -> TerminalStatistics {
    let mean_v = polish(mean(terminal_values), advisories);
    let median_v = polish(percentile(terminal_values, 50.0), advisories);
    let stddev_v = polish(std_dev(terminal_values, VarianceMode::Sample), advisories);
    let success_count = terminal_values.iter().filter(|&&v| v > v0).count();
    let success_rate = polish(
        success_count as f64 / terminal_values.len() as f64 * 100.0,
        advisories,
    );
    TerminalStatistics {
        mean: round_significant(mean_v, OUTPUT_SIG_FIGS),
        median: round_significant(median_v, OUTPUT_SIG_FIGS),
        stddev: round_significant(stddev_v, OUTPUT_SIG_FIGS),
        success_rate: round_significant(success_rate, OUTPUT_SIG_FIGS),
    }
}

fn sbloc_trajectory(
    records: &[IterationRecord],
    horizon_years: u32,
    advisories: &mut Advisories,
) -> SblocTrajectory {
    let years: Vec<u32> = (0..=horizon_years).collect();
    let mut loan_p10 = Vec::with_capacity(years.len());
    let mut loan_p25 = Vec::with_capacity(years.len());
    let mut loan_p50 = Vec::with_capacity(years.len());
    let mut loan_p75 = Vec::with_capacity(years.len());
    let mut loan_p90 = Vec::with_capacity(years.len());
    let mut median_interest = Vec::with_capacity(years.len());
    let mut cumulative_withdrawals = Vec::with_capacity(years.len());

    for year in 0..=horizon_years as usize {
        let loans: Vec<f64> = records.iter().map(|r| r.year_loan_balances[year]).collect();
        let interest: Vec<f64> = records.iter().map(|r| r.year_cumulative_interest[year]).collect();
        let withdrawals: Vec<f64> = records.iter().map(|r| r.year_cumulative_withdrawals[year]).collect();

        loan_p10.push(polish(percentile(&loans, 10.0), advisories));
        loan_p25.push(polish(percentile(&loans, 25.0), advisories));
        loan_p50.push(polish(percentile(&loans, 50.0), advisories));
        loan_p75.push(polish(percentile(&loans, 75.0), advisories));
        loan_p90.push(polish(percentile(&loans, 90.0), advisories));
        median_interest.push(polish(percentile(&interest, 50.0), advisories));
        cumulative_withdrawals.push(polish(percentile(&withdrawals, 50.0), advisories));
    }

    SblocTrajectory {
        years,
        loan_balance_p10: round_all(loan_p10),
        loan_balance_p25: round_all(loan_p25),
        loan_balance_p50: round_all(loan_p50),
        loan_balance_p75: round_all(loan_p75),
        loan_balance_p90: round_all(loan_p90),
        cumulative_withdrawals: round_all(cumulative_withdrawals),
        median_cumulative_interest: round_all(median_interest),
    }
}

fn round_all(values: Vec<f64>) -> Vec<f64> {
    values
        .into_iter()
        .map(|v| round_significant(v, OUTPUT_SIG_FIGS))
        .collect()
}

fn round_yearly_percentiles(
    p: bbd_types::YearlyPercentiles,
    advisories: &mut Advisories,
) -> bbd_types::YearlyPercentiles {
    bbd_types::YearlyPercentiles {
        year: p.year,
        p10: round_significant(polish(p.p10, advisories), OUTPUT_SIG_FIGS),
        p25: round_significant(polish(p.p25, advisories), OUTPUT_SIG_FIGS),
        p50: round_significant(polish(p.p50, advisories), OUTPUT_SIG_FIGS),
        p75: round_significant(polish(p.p75, advisories), OUTPUT_SIG_FIGS),
        p90: round_significant(polish(p.p90, advisories), OUTPUT_SIG_FIGS),
    }
}

fn round_margin_call_stat(
    s: bbd_types::MarginCallYearStat,
    advisories: &mut Advisories,
) -> bbd_types::MarginCallYearStat {
    bbd_types::MarginCallYearStat {
        year: s.year,
        probability: round_significant(polish(s.probability, advisories), OUTPUT_SIG_FIGS),
        cumulative_probability: round_significant(polish(s.cumulative_probability, advisories), OUTPUT_SIG_FIGS),
    }
}

fn round_estate(e: bbd_types::EstateAnalysis, advisories: &mut Advisories) -> bbd_types::EstateAnalysis {
    bbd_types::EstateAnalysis {
        bbd_net_estate: round_significant(polish(e.bbd_net_estate, advisories), OUTPUT_SIG_FIGS),
        sell_net_estate: round_significant(polish(e.sell_net_estate, advisories), OUTPUT_SIG_FIGS),
        bbd_advantage: round_significant(polish(e.bbd_advantage, advisories), OUTPUT_SIG_FIGS),
        embedded_capital_gains: round_significant(polish(e.embedded_capital_gains, advisories), OUTPUT_SIG_FIGS),
        stepped_up_basis_savings: round_significant(
            polish(e.stepped_up_basis_savings, advisories),
            OUTPUT_SIG_FIGS,
        ),
    }
}

/// Substitutes `NaN` with `0.0` and raises the advisory flag (spec 7:
/// UnexpectedNaN is a protective last line, never propagated to consumers).
/// Infinities are left untouched: they are a meaningful sentinel elsewhere
/// in the core (e.g. LTV) and none of the aggregate statistics here are
/// expected to produce one from finite, validated inputs.
fn polish(value: f64, advisories: &mut Advisories) -> f64 {
    if value.is_nan() {
        advisories.nan_substituted = true;
        0.0
    } else {
        value
    }
}
