pub mod bootstrap;
pub mod generator;
pub mod regime;

pub use generator::{generate, GeneratedReturns};
pub use regime::RegimeKind;
