pub mod estate;
pub mod growth;
pub mod margin_call;
pub mod risk;
pub mod sell;

pub use estate::{estate_analysis, EstateInputs};
pub use growth::{annualized_volatility, cagr, salary_equivalent, twrr};
pub use margin_call::margin_call_stats;
pub use risk::{bootstrap_confidence_interval, conditional_drawdown_at_risk, ulcer_index, ConfidenceInterval};
pub use sell::{sell_counterfactual, SellPathResult};
