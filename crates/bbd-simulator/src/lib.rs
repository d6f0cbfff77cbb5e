//! Seeded Monte Carlo driver for the Buy-Borrow-Die simulation core.
//!
//! This crate owns the one thing the other `bbd-*` crates deliberately
//! don't: orchestration. `bbd-returns` generates a return matrix,
//! `bbd-sbloc` steps a single year, `bbd-analytics` reduces a finished
//! trajectory to statistics -- none of them know how many iterations to
//! run, how to seed them, or how to stitch per-iteration trajectories back
//! into a path-coherent percentile band. That's all here.

mod driver;
mod iteration;
mod percentile;
mod progress;
mod seed;

#[cfg(test)]
mod tests;

pub use driver::run;
pub use progress::{Progress, ProgressStatus, RunCallbacks};
pub use seed::{resolve_master_seed, sub_seed};
