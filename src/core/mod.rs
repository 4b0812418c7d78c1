mod engine;
mod types;

pub use engine::{
    DEFAULT_HORIZON_MONTHS, MORTGAGE_TERM_MONTHS, ProjectionSteps, monthly_mortgage_payment,
    project, steps,
};
pub use types::{
    CONTROLS, ControlSpec, DerivedRates, MonthPoint, ParameterKey, Params, Projection,
    ProjectionError, ProjectionSummary,
};
