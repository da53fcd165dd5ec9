//! PAYG Projection - cohort-component population projection and pay-as-you-go
//! pension balance engine
//!
//! This library provides:
//! - Life tables and mortality calibration to a target life expectancy
//! - A one-year cohort-component step (mortality, ageing, migration, births)
//! - PAYG accounting (wage bill, contributions, benefits, balance)
//! - Two-component pension indexation with a cumulative real-wage gap
//! - Equilibrium solves for retirement age, pension ratio and contribution rate
//! - Multi-year scenario runs with population pyramids

pub mod error;
pub mod dataset;
pub mod params;
pub mod solver;
pub mod demography;
pub mod pension;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{ProjectionError, Result};
pub use dataset::{Dataset, Population, Sex, SexPair};
pub use params::{RetirementAgeBounds, ScenarioParams};
pub use projection::{run_scenario, ProjectionEngine, ScenarioResult, YearPoint, PopulationPyramid};
pub use scenario::ScenarioRunner;
