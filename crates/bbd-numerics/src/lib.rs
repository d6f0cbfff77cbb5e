pub mod cholesky;
pub mod correlation;
pub mod kahan;
pub mod precision;
pub mod random;
pub mod stats;

pub use cholesky::{apply_factor, cholesky_lower};
pub use correlation::{correlation_matrix, pearson};
pub use kahan::{kahan_sum, KahanSum};
pub use precision::round_significant;
pub use random::{lognormal, normal, standard_normal, student_t, student_t_scaled};
pub use stats::{mean, percentile, percentile_sorted, std_dev, variance, VarianceMode};
