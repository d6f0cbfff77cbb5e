use bbd_types::{YearlyPercentiles, PERCENTILE_RANKS};

use crate::iteration::IterationRecord;

/// Terminal-rank permutation: `perm[0]` is the index of the iteration with
/// the smallest terminal value, `perm[n-1]` the largest.
pub fn terminal_rank_permutation(terminal_values: &[f64]) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..terminal_values.len()).collect();
    perm.sort_by(|&a, &b| {
        terminal_values[a]
            .partial_cmp(&terminal_values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    perm
}

/// Index into a rank-`n` permutation whose rank sits at percentile `p`.
pub fn rank_index_for_percentile(n: usize, p: f64) -> usize {
    if n == 0 {
        return 0;
    }
    let idx = ((p / 100.0) * (n - 1) as f64).round();
    (idx.max(0.0) as usize).min(n - 1)
}

/// Path-coherent yearly percentiles (spec 4.D): for each target percentile
/// rank, replay the *single* iteration whose terminal value sits at that
/// rank for every year, rather than sorting each year's values
/// independently. This preserves the temporal coherence of one
/// representative scenario per percentile. Year 0 is seeded with `v0` for
/// every percentile so downstream growth-rate calculations have a valid
/// base.
pub fn path_coherent_yearly_percentiles(
    records: &[IterationRecord],
    horizon_years: u32,
    v0: f64,
) -> Vec<YearlyPercentiles> {
    let terminal_values: Vec<f64> = records.iter().map(|r| r.terminal_value).collect();
    let perm = terminal_rank_permutation(&terminal_values);
    let n = perm.len();

    let mut out = Vec::with_capacity(horizon_years as usize + 1);
    out.push(YearlyPercentiles::seed(v0));

    for year in 1..=horizon_years {
        let mut values = [0.0; 5];
        for (slot, &p) in values.iter_mut().zip(PERCENTILE_RANKS.iter()) {
            let iter_idx = perm[rank_index_for_percentile(n, p as f64)];
            *slot = records[iter_idx].year_portfolio_values[year as usize];
        }
        out.push(YearlyPercentiles {
            year,
            p10: values[0],
            p25: values[1],
            p50: values[2],
            p75: values[3],
            p90: values[4],
        });
    }
    out
}

/// The rank-selected iteration index for a single percentile, used to pull
/// a representative path's raw market returns (for the Sell counterfactual)
/// or loan trajectory out of the same terminal-ranked selection used above.
pub fn representative_iteration_index(terminal_values: &[f64], p: f64) -> usize {
    let perm = terminal_rank_permutation(terminal_values);
    perm[rank_index_for_percentile(perm.len(), p)]
}
