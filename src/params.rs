//! User-adjustable scenario parameters and their declared ranges

use crate::dataset::Dataset;
use crate::error::{ProjectionError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Inclusive range a parameter must lie in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn check(&self, name: &'static str, value: f64) -> Result<()> {
        if value.is_finite() && value >= self.min && value <= self.max {
            Ok(())
        } else {
            Err(ProjectionError::ParameterOutOfRange {
                name,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

pub const HORIZON_RANGE: ParamRange = ParamRange::new(1.0, 100.0);
pub const TFR_RANGE: ParamRange = ParamRange::new(0.0, 4.0);
pub const LIFE_EXPECTANCY_RANGE: ParamRange = ParamRange::new(50.0, 100.0);
pub const NET_MIGRATION_RANGE: ParamRange = ParamRange::new(-20.0, 20.0);
pub const WAGE_GROWTH_RANGE: ParamRange = ParamRange::new(-0.10, 0.10);
pub const UNEMPLOYMENT_RANGE: ParamRange = ParamRange::new(0.0, 0.5);
pub const CONTRIBUTION_RATE_RANGE: ParamRange = ParamRange::new(0.0, 0.6);
pub const RETIREMENT_AGE_RANGE: ParamRange = ParamRange::new(50.0, 80.0);
pub const BASIC_RATIO_RANGE: ParamRange = ParamRange::new(0.0, 0.5);
pub const PERCENTAGE_RATIO_RANGE: ParamRange = ParamRange::new(0.0, 1.0);
pub const INDEX_SHARE_RANGE: ParamRange = ParamRange::new(0.0, 1.0);
pub const MINIMUM_RATIO_RANGE: ParamRange = ParamRange::new(0.0, 0.5);

/// Bounds for the equilibrium retirement-age search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementAgeBounds {
    pub min_age: u32,
    pub max_age: u32,
}

impl Default for RetirementAgeBounds {
    fn default() -> Self {
        Self { min_age: 55, max_age: 80 }
    }
}

/// Parameters for one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    /// Number of projected years after the base year
    pub horizon_years: u32,

    /// Total fertility rate
    pub tfr: f64,

    /// Target life expectancy at birth, males
    pub e0_male: f64,

    /// Target life expectancy at birth, females
    pub e0_female: f64,

    /// Net migration per 1000 of current population per year
    pub net_migration_per_1000: f64,

    /// Annual real wage growth
    pub real_wage_growth: f64,

    /// Optional year-by-year real wage growth; entry `t - 1` drives year `t`
    pub real_wage_growth_path: Option<Vec<f64>>,

    /// Target unemployment rate
    pub unemployment_rate: f64,

    pub contribution_rate: f64,

    /// Statutory retirement age (pensioners are everyone at or above it)
    pub retirement_age: u32,

    pub basic_amount_ratio: f64,
    pub percentage_amount_ratio: f64,
    pub real_wage_index_share: f64,
    pub minimum_pension_ratio: f64,

    /// Attach equilibrium solves to every year point
    pub compute_equilibrium: bool,

    pub equilibrium_age_bounds: RetirementAgeBounds,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            horizon_years: 50,
            tfr: 1.6,
            e0_male: 76.5,
            e0_female: 82.3,
            net_migration_per_1000: 2.0,
            real_wage_growth: 0.015,
            real_wage_growth_path: None,
            unemployment_rate: 0.03,
            contribution_rate: 0.28,
            retirement_age: 65,
            basic_amount_ratio: 0.10,
            percentage_amount_ratio: 0.36,
            real_wage_index_share: 0.5,
            minimum_pension_ratio: 0.20,
            compute_equilibrium: false,
            equilibrium_age_bounds: RetirementAgeBounds::default(),
        }
    }
}

impl ScenarioParams {
    /// Defaults with the dataset's PAYG baseline and pension ratios
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            contribution_rate: dataset.payg.contribution_rate,
            unemployment_rate: dataset.payg.unemployment_rate,
            basic_amount_ratio: dataset.pension.basic_amount_ratio,
            percentage_amount_ratio: dataset.pension.percentage_amount_ratio,
            real_wage_index_share: dataset.pension.real_wage_index_share,
            minimum_pension_ratio: dataset.pension.minimum_pension_ratio,
            ..Self::default()
        }
    }

    /// Load parameters from a JSON file; missing fields take defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Real wage growth applied in projection year `year` (1-based)
    pub fn wage_growth_for_year(&self, year: u32) -> f64 {
        if year == 0 {
            return 0.0;
        }
        self.real_wage_growth_path
            .as_ref()
            .and_then(|path| path.get(year as usize - 1).copied())
            .unwrap_or(self.real_wage_growth)
    }

    /// Check every field against its declared range and the dataset's ages
    pub fn validate(&self, dataset: &Dataset) -> Result<()> {
        HORIZON_RANGE.check("horizon_years", self.horizon_years as f64)?;
        TFR_RANGE.check("tfr", self.tfr)?;
        LIFE_EXPECTANCY_RANGE.check("e0_male", self.e0_male)?;
        LIFE_EXPECTANCY_RANGE.check("e0_female", self.e0_female)?;
        NET_MIGRATION_RANGE.check("net_migration_per_1000", self.net_migration_per_1000)?;
        WAGE_GROWTH_RANGE.check("real_wage_growth", self.real_wage_growth)?;
        if let Some(path) = &self.real_wage_growth_path {
            for &growth in path {
                WAGE_GROWTH_RANGE.check("real_wage_growth_path", growth)?;
            }
        }
        UNEMPLOYMENT_RANGE.check("unemployment_rate", self.unemployment_rate)?;
        CONTRIBUTION_RATE_RANGE.check("contribution_rate", self.contribution_rate)?;
        RETIREMENT_AGE_RANGE.check("retirement_age", self.retirement_age as f64)?;
        BASIC_RATIO_RANGE.check("basic_amount_ratio", self.basic_amount_ratio)?;
        PERCENTAGE_RATIO_RANGE.check("percentage_amount_ratio", self.percentage_amount_ratio)?;
        INDEX_SHARE_RANGE.check("real_wage_index_share", self.real_wage_index_share)?;
        MINIMUM_RATIO_RANGE.check("minimum_pension_ratio", self.minimum_pension_ratio)?;

        let max_age = dataset.max_age();
        if self.retirement_age as usize > max_age {
            return Err(ProjectionError::AgeOutOfBounds {
                field: "retirement_age".to_string(),
                age: self.retirement_age as usize,
                max_age,
            });
        }
        let bounds = self.equilibrium_age_bounds;
        if bounds.min_age > bounds.max_age {
            return Err(ProjectionError::invalid(
                "equilibrium_age_bounds",
                format!("min_age {} exceeds max_age {}", bounds.min_age, bounds.max_age),
            ));
        }
        if bounds.max_age as usize > max_age {
            return Err(ProjectionError::AgeOutOfBounds {
                field: "equilibrium_age_bounds.max_age".to_string(),
                age: bounds.max_age as usize,
                max_age,
            });
        }
        Ok(())
    }
}
