/// Kahan-compensated running sum.
///
/// Plain `f64` accumulation drifts over the 10^4-10^6 terms a multi-decade,
/// multi-path simulation accumulates; Kahan summation keeps a running
/// compensation term to cancel that drift.
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) -> &mut Self {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
        self
    }

    pub fn total(&self) -> f64 {
        self.sum
    }
}

/// Sum a sequence with Kahan compensation.
pub fn kahan_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut acc = KahanSum::new();
    for v in values {
        acc.add(v);
    }
    acc.total()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_naive_sum_for_well_conditioned_input() {
        let values: Vec<f64> = (0..1000).map(|i| i as f64 * 0.01).collect();
        let naive: f64 = values.iter().sum();
        let kahan = kahan_sum(values.iter().copied());
        assert!((naive - kahan).abs() < 1e-6);
    }

    #[test]
    fn reduces_error_versus_naive_sum_on_adversarial_input() {
        // A classic Kahan-summation torture test: one large value followed
        // by many small values that naive summation would swallow.
        let mut values = vec![1e16, 1.0, -1e16];
        values.extend(std::iter::repeat(1.0).take(1000));
        let naive: f64 = values.iter().sum();
        let kahan = kahan_sum(values.iter().copied());
        assert_eq!(kahan, 1001.0);
        assert_ne!(naive, kahan);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(kahan_sum(std::iter::empty()), 0.0);
    }
}
