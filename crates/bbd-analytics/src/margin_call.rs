use bbd_types::MarginCallYearStat;

/// Builds the per-year margin-call probability distribution from the first
/// margin-call year observed in each iteration (`None` for iterations that
/// never triggered one).
///
/// `probability[y]` is the fraction of iterations whose *first* margin call
/// landed in year `y`. The cumulative column is a running maximum of the
/// partial sum rather than a plain running sum, so it stays monotonic
/// non-decreasing even if floating-point summation noise would otherwise let
/// it dip between years.
pub fn margin_call_stats(first_call_year: &[Option<u32>], horizon_years: u32) -> Vec<MarginCallYearStat> {
    let n = first_call_year.len();
    if n == 0 || horizon_years == 0 {
        return Vec::new();
    }

    let mut per_year_count = vec![0u32; horizon_years as usize + 1];
    for year in first_call_year.iter().flatten() {
        if let Some(slot) = per_year_count.get_mut(*year as usize) {
            *slot += 1;
        }
    }

    let mut running_sum = 0.0;
    let mut running_max = 0.0;
    let mut out = Vec::with_capacity(horizon_years as usize);
    for year in 1..=horizon_years {
        let probability = per_year_count[year as usize] as f64 / n as f64 * 100.0;
        running_sum += probability;
        running_max = running_max.max(running_sum);
        out.push(MarginCallYearStat {
            year,
            probability,
            cumulative_probability: running_max,
        });
    }
    out
}
