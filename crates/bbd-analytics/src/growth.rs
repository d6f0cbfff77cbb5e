use bbd_numerics::{std_dev, VarianceMode};

/// Compound Annual Growth Rate between `v0` and `v_t` over `horizon_years`.
/// Returns `-1.0` when `v_t <= 0.0`, matching total loss.
pub fn cagr(v0: f64, v_t: f64, horizon_years: u32) -> f64 {
    if v_t <= 0.0 {
        return -1.0;
    }
    (v_t / v0).powf(1.0 / horizon_years as f64) - 1.0
}

/// Annualized volatility: the sample standard deviation of each
/// iteration's own annualized return, `(terminal / v0)^(1/T) - 1`.
pub fn annualized_volatility(terminal_values: &[f64], v0: f64, horizon_years: u32) -> f64 {
    let annualized: Vec<f64> = terminal_values
        .iter()
        .map(|&t| cagr(v0, t, horizon_years))
        .collect();
    std_dev(&annualized, VarianceMode::Sample)
}

/// Time-Weighted Rate of Return over a single yearly path (year-0 through
/// year-T inclusive). Chains per-period simple returns geometrically and
/// annualizes. Returns `NaN` if the path is degenerate: fewer than two
/// points, or any starting value non-positive.
pub fn twrr(path: &[f64]) -> f64 {
    let periods = path.len().saturating_sub(1);
    if periods == 0 {
        tracing::warn!(len = path.len(), "twrr: path has no periods, returning NaN");
        return f64::NAN;
    }
    let mut growth = 1.0;
    for window in path.windows(2) {
        let (prev, next) = (window[0], window[1]);
        if prev <= 0.0 {
            tracing::warn!(prev, "twrr: non-positive starting value, returning NaN");
            return f64::NAN;
        }
        growth *= 1.0 + (next - prev) / prev;
    }
    growth.powf(1.0 / periods as f64) - 1.0
}

/// Pre-tax salary an after-tax withdrawal `w` is equivalent to at marginal
/// rate `t`. `t == 1.0` yields `+inf`.
pub fn salary_equivalent(withdrawal: f64, marginal_tax_rate: f64) -> f64 {
    if marginal_tax_rate >= 1.0 {
        return f64::INFINITY;
    }
    withdrawal / (1.0 - marginal_tax_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cagr_total_loss_is_negative_one() {
        assert_eq!(cagr(100_000.0, 0.0, 10), -1.0);
        assert_eq!(cagr(100_000.0, -5.0, 10), -1.0);
    }

    #[test]
    fn cagr_doubling_over_ten_years() {
        let rate = cagr(100_000.0, 200_000.0, 10);
        assert_relative_eq!(rate, 2f64.powf(0.1) - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn twrr_matches_constant_growth_rate() {
        let path = vec![100.0, 110.0, 121.0, 133.1];
        assert_relative_eq!(twrr(&path), 0.10, epsilon = 1e-9);
    }

    #[test]
    fn twrr_degenerate_path_is_nan() {
        assert!(twrr(&[100.0]).is_nan());
        assert!(twrr(&[0.0, 10.0]).is_nan());
    }

    #[test]
    fn salary_equivalent_zero_tax_is_identity() {
        assert_eq!(salary_equivalent(50_000.0, 0.0), 50_000.0);
    }

    #[test]
    fn salary_equivalent_zero_withdrawal_is_zero_for_any_rate_below_one() {
        assert_eq!(salary_equivalent(0.0, 0.37), 0.0);
    }

    #[test]
    fn salary_equivalent_full_tax_is_infinite() {
        assert_eq!(salary_equivalent(10_000.0, 1.0), f64::INFINITY);
    }
}
