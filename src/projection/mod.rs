//! Multi-year scenario projection

mod prepared;
mod state;
mod engine;
mod results;

pub use prepared::{CalibrationSummary, PreparedInputs};
pub use state::{ProjectionState, YearFlows};
pub use engine::{run_scenario, ProjectionEngine};
pub use results::{PopulationPyramid, PyramidBand, ScenarioResult, ScenarioSummary, YearPoint};
