//! Demographic kernels: life tables, mortality calibration and the
//! cohort-component step

mod life_table;
mod calibration;
mod cohort;

pub use life_table::{
    death_probabilities, death_probability, life_expectancy, LifeTable, LIFE_TABLE_RADIX,
};
pub use calibration::{
    calibrate_mortality, CalibratedMortality, CalibrationBound, CalibrationConfig,
    MAX_SCALING_FACTOR, MIN_SCALING_FACTOR,
};
pub use cohort::{
    age_cohorts, apply_migration, calculate_births, calculate_survivors, step, CohortRates,
    StepOutcome,
};
