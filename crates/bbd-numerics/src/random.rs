use rand::Rng;
use rand_distr::{ChiSquared, Distribution};
use std::f64::consts::PI;

/// Standard-normal sampler using the Box-Muller transform.
///
/// Box-Muller is used (rather than `rand_distr::StandardNormal`) so the
/// transform is explicit and independently auditable against the
/// reference formula; it consumes two uniform draws per call and caches
/// nothing, favoring reproducibility over throughput.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Normal draw with the given mean and standard deviation.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    mean + std_dev * standard_normal(rng)
}

/// Lognormal draw: `exp(normal(mean, std_dev))`.
pub fn lognormal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    normal(rng, mean, std_dev).exp()
}

/// Student-t draw with `degrees_of_freedom` fat tails: `Z / sqrt(V / nu)`
/// where `Z` is standard normal and `V` is chi-squared with `nu` degrees
/// of freedom, giving heavier tails than a pure normal draw for the same
/// variance target.
pub fn student_t<R: Rng + ?Sized>(rng: &mut R, degrees_of_freedom: f64) -> f64 {
    let z = standard_normal(rng);
    let chi_sq = ChiSquared::new(degrees_of_freedom)
        .expect("degrees_of_freedom must be positive")
        .sample(rng);
    z / (chi_sq / degrees_of_freedom).sqrt()
}

/// Student-t draw scaled to a target mean and standard deviation. The raw
/// `student_t` draw has variance `nu / (nu - 2)` for `nu > 2`; this
/// rescales so the asset-level mean/std_dev calibration still holds while
/// keeping the fat-tailed shape.
pub fn student_t_scaled<R: Rng + ?Sized>(
    rng: &mut R,
    mean: f64,
    std_dev: f64,
    degrees_of_freedom: f64,
) -> f64 {
    let raw = student_t(rng, degrees_of_freedom);
    let raw_std_dev = if degrees_of_freedom > 2.0 {
        (degrees_of_freedom / (degrees_of_freedom - 2.0)).sqrt()
    } else {
        1.0
    };
    mean + std_dev * (raw / raw_std_dev)
}
