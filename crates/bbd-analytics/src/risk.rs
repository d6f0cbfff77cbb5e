use rand::Rng;
use rayon::prelude::*;

/// Per-step drawdown (percentage points below the running peak) along a
/// yearly value path.
fn drawdown_series(path: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    path.iter()
        .map(|&v| {
            peak = peak.max(v);
            if peak > 0.0 {
                (peak - v) / peak * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Conditional Drawdown at Risk: the average of the worst `alpha` fraction
/// of drawdowns along a yearly value path. More robust than max drawdown
/// alone since it reflects the shape of the tail rather than a single point.
pub fn conditional_drawdown_at_risk(path: &[f64], alpha: f64) -> Option<f64> {
    if path.len() < 10 {
        tracing::warn!(len = path.len(), "conditional_drawdown_at_risk: path too short, returning None");
        return None;
    }
    let mut drawdowns = drawdown_series(path);
    drawdowns.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let cutoff = ((alpha * drawdowns.len() as f64).ceil() as usize).max(1).min(drawdowns.len());
    let worst = &drawdowns[..cutoff];
    Some(worst.iter().sum::<f64>() / worst.len() as f64)
}

/// Ulcer Index: `sqrt(mean(drawdown_i^2))` along a yearly value path.
/// Penalizes prolonged drawdowns more heavily than max drawdown, which only
/// sees the single worst point.
pub fn ulcer_index(path: &[f64]) -> Option<f64> {
    if path.len() < 3 {
        tracing::warn!(len = path.len(), "ulcer_index: path too short, returning None");
        return None;
    }
    let drawdowns = drawdown_series(path);
    let mean_sq = drawdowns.iter().map(|d| d.powi(2)).sum::<f64>() / drawdowns.len() as f64;
    Some(mean_sq.sqrt())
}

/// A bootstrap confidence interval around a point estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub point_estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Bootstrap confidence interval for an arbitrary statistic of
/// `terminal_values` (e.g. success rate, median CAGR), by resampling with
/// replacement `num_samples` times and taking the `(1-confidence)/2` and
/// `1-(1-confidence)/2` percentiles of the resampled statistic.
///
/// Resamples run in parallel via rayon, matching the teacher's
/// `bootstrap_confidence_intervals`; each resample draws its own indices so
/// parallelism does not affect the resulting distribution's shape, only the
/// wall-clock time to compute it.
pub fn bootstrap_confidence_interval(
    values: &[f64],
    num_samples: usize,
    confidence: f64,
    statistic: impl Fn(&[f64]) -> f64 + Sync,
) -> Option<ConfidenceInterval> {
    if values.len() < 5 || num_samples == 0 {
        tracing::warn!(
            n = values.len(),
            num_samples,
            "bootstrap_confidence_interval: insufficient input, returning None"
        );
        return None;
    }
    let n = values.len();
    let point_estimate = statistic(values);

    let mut resampled: Vec<f64> = (0..num_samples)
        .into_par_iter()
        .map_init(rand::thread_rng, |rng, _| {
            let sample: Vec<f64> = (0..n).map(|_| values[rng.gen_range(0..n)]).collect();
            statistic(&sample)
        })
        .collect();
    resampled.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let half_tail = (1.0 - confidence) / 2.0;
    let lower = bbd_numerics::percentile_sorted(&resampled, half_tail * 100.0);
    let upper = bbd_numerics::percentile_sorted(&resampled, (1.0 - half_tail) * 100.0);

    Some(ConfidenceInterval {
        point_estimate,
        lower,
        upper,
    })
}
