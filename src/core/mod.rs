mod engine;
mod types;

pub use engine::{classify_income, income_axis_max, run_projection};
pub use types::{
    CONTRACT_SIZE, ForecastInputs, IncomeStatus, JobType, ProjectionPoint, Strategy, Thresholds,
};
