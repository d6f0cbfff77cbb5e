pub mod step;

pub use step::{
    effective_annual_rate_under_monthly_compounding, is_terminally_underwater, step_year,
    step_year_monthly,
};
