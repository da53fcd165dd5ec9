//! Input dataset: base population and structural curves
//!
//! A dataset is read-only for the engine. It carries the base-year age/sex
//! structure, the pre-shaped demographic and labour curves, and the PAYG and
//! pension-formula baselines that seed [`crate::ScenarioParams`].

mod sex;
mod reference;
pub mod loader;

pub use sex::{Sex, SexPair, AgeSexCurve, Population};
pub use loader::{default_dataset_path, load_dataset, load_population_csv, DEFAULT_DATASET_PATH};

use crate::error::{ProjectionError, Result};
use serde::{Deserialize, Serialize};

/// Structural metadata of the dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Human-readable label
    #[serde(default)]
    pub name: String,

    /// Terminal open age interval (arrays hold `max_age + 1` entries)
    pub max_age: usize,

    /// Calendar year of the base population
    pub base_year: i32,

    /// Male births per female birth
    pub sex_ratio_at_birth: f64,

    pub fertile_age_min: usize,
    pub fertile_age_max: usize,
    pub working_age_min: usize,
    pub working_age_max: usize,
}

/// Age-specific fertility shape over the fertile ages
///
/// The shape is scaled by the total fertility rate; it is not required to sum
/// to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FertilitySchedule {
    /// Ages the shape values refer to
    pub ages: Vec<usize>,
    /// One shape value per entry of `ages`
    pub shape: Vec<f64>,
}

impl FertilitySchedule {
    /// Full-length birth rates per woman, zero outside the fertile ages
    pub fn rates_by_age(&self, tfr: f64, max_age: usize) -> Vec<f64> {
        let mut rates = vec![0.0; max_age + 1];
        for (&age, &shape) in self.ages.iter().zip(&self.shape) {
            if age <= max_age {
                rates[age] = tfr * shape;
            }
        }
        rates
    }

    /// Sum of the shape values
    pub fn shape_total(&self) -> f64 {
        self.shape.iter().sum()
    }
}

/// Baseline PAYG system levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaygBaseline {
    pub contribution_rate: f64,
    /// Annual average wage in the base year
    pub average_wage: f64,
    /// Annual average old-age pension reported for the base year
    pub average_pension: f64,
    /// Assumed general price inflation
    pub cpi: f64,
    /// Price inflation of the pensioner consumption basket
    pub pensioner_cpi: f64,
    /// Unemployment rate the employment curves were observed at
    pub unemployment_rate: f64,
}

/// Two-component pension formula ratios (relative to the average wage)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PensionRatios {
    pub basic_amount_ratio: f64,
    pub percentage_amount_ratio: f64,
    /// Share of effective real wage growth passed into indexation
    pub real_wage_index_share: f64,
    pub minimum_pension_ratio: f64,
}

/// Complete input dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: DatasetMetadata,
    pub population: Population,
    pub fertility: FertilitySchedule,
    /// Central death rates (hazards) by age
    pub mortality: AgeSexCurve,
    pub employment: AgeSexCurve,
    /// Wage relative to the average wage, by age
    pub relative_wage: AgeSexCurve,
    /// Shares of total net migration by age and sex
    pub migration_shape: AgeSexCurve,
    pub payg: PaygBaseline,
    pub pension: PensionRatios,
}

impl Dataset {
    pub fn max_age(&self) -> usize {
        self.metadata.max_age
    }

    pub fn base_year(&self) -> i32 {
        self.metadata.base_year
    }

    /// Probability that a birth is male: `srb / (1 + srb)`
    pub fn male_birth_share(&self) -> f64 {
        let srb = self.metadata.sex_ratio_at_birth;
        srb / (1.0 + srb)
    }

    /// Check structural consistency; fails on the first problem found
    pub fn validate(&self) -> Result<()> {
        let meta = &self.metadata;
        let max_age = meta.max_age;
        if max_age < 2 {
            return Err(ProjectionError::invalid("metadata.max_age", "must be at least 2"));
        }
        if !(meta.sex_ratio_at_birth.is_finite() && meta.sex_ratio_at_birth > 0.0) {
            return Err(ProjectionError::invalid(
                "metadata.sex_ratio_at_birth",
                "must be positive",
            ));
        }
        check_age("metadata.fertile_age_max", meta.fertile_age_max, max_age)?;
        check_age("metadata.working_age_max", meta.working_age_max, max_age)?;
        if meta.fertile_age_min > meta.fertile_age_max {
            return Err(ProjectionError::invalid(
                "metadata.fertile_age_min",
                "exceeds fertile_age_max",
            ));
        }
        if meta.working_age_min > meta.working_age_max {
            return Err(ProjectionError::invalid(
                "metadata.working_age_min",
                "exceeds working_age_max",
            ));
        }

        check_curve("population", &self.population, max_age, None)?;
        check_curve("mortality", &self.mortality, max_age, None)?;
        check_curve("employment", &self.employment, max_age, Some(1.0))?;
        check_curve("relative_wage", &self.relative_wage, max_age, None)?;
        check_curve("migration_shape", &self.migration_shape, max_age, None)?;

        let fert = &self.fertility;
        if fert.ages.len() != fert.shape.len() {
            return Err(ProjectionError::LengthMismatch {
                field: "fertility.shape".to_string(),
                expected: fert.ages.len(),
                actual: fert.shape.len(),
            });
        }
        for &age in &fert.ages {
            check_age("fertility.ages", age, max_age)?;
            if age < meta.fertile_age_min || age > meta.fertile_age_max {
                return Err(ProjectionError::invalid(
                    "fertility.ages",
                    format!(
                        "age {} is outside the fertile range {}..={}",
                        age, meta.fertile_age_min, meta.fertile_age_max
                    ),
                ));
            }
        }
        check_values("fertility.shape", &fert.shape, None)?;

        let payg = &self.payg;
        if !(payg.average_wage.is_finite() && payg.average_wage > 0.0) {
            return Err(ProjectionError::invalid("payg.average_wage", "must be positive"));
        }
        check_unit("payg.contribution_rate", payg.contribution_rate)?;
        check_unit("payg.unemployment_rate", payg.unemployment_rate)?;
        if payg.unemployment_rate >= 1.0 {
            return Err(ProjectionError::invalid(
                "payg.unemployment_rate",
                "must be below 1",
            ));
        }
        for (field, value) in [
            ("payg.average_pension", payg.average_pension),
            ("payg.cpi", payg.cpi),
            ("payg.pensioner_cpi", payg.pensioner_cpi),
        ] {
            if !value.is_finite() {
                return Err(ProjectionError::invalid(field, "must be finite"));
            }
        }

        let ratios = &self.pension;
        for (field, value) in [
            ("pension.basic_amount_ratio", ratios.basic_amount_ratio),
            ("pension.percentage_amount_ratio", ratios.percentage_amount_ratio),
            ("pension.real_wage_index_share", ratios.real_wage_index_share),
            ("pension.minimum_pension_ratio", ratios.minimum_pension_ratio),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ProjectionError::invalid(field, "must be finite and non-negative"));
            }
        }

        Ok(())
    }
}

fn check_age(field: &str, age: usize, max_age: usize) -> Result<()> {
    if age > max_age {
        return Err(ProjectionError::AgeOutOfBounds {
            field: field.to_string(),
            age,
            max_age,
        });
    }
    Ok(())
}

fn check_unit(field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ProjectionError::invalid(field, "must lie in [0, 1]"));
    }
    Ok(())
}

fn check_values(field: &str, values: &[f64], upper: Option<f64>) -> Result<()> {
    for (age, &value) in values.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ProjectionError::invalid(
                format!("{}[{}]", field, age),
                format!("{} is not a finite non-negative number", value),
            ));
        }
        if let Some(limit) = upper {
            if value > limit {
                return Err(ProjectionError::invalid(
                    format!("{}[{}]", field, age),
                    format!("{} exceeds {}", value, limit),
                ));
            }
        }
    }
    Ok(())
}

fn check_curve(field: &str, curve: &AgeSexCurve, max_age: usize, upper: Option<f64>) -> Result<()> {
    curve.check_ages(field, max_age)?;
    for (sex, values) in curve.iter() {
        check_values(&format!("{}.{}", field, sex.label()), values, upper)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_dataset_is_valid() {
        let dataset = Dataset::reference();
        assert!(dataset.validate().is_ok());
        assert_eq!(dataset.population.male.len(), dataset.max_age() + 1);
    }

    #[test]
    fn test_male_birth_share() {
        let mut dataset = Dataset::reference();
        dataset.metadata.sex_ratio_at_birth = 1.05;
        assert!((dataset.male_birth_share() - 1.05 / 2.05).abs() < 1e-12);
    }

    #[test]
    fn test_short_curve_is_rejected() {
        let mut dataset = Dataset::reference();
        dataset.mortality.female.pop();
        match dataset.validate() {
            Err(ProjectionError::LengthMismatch { field, expected, actual }) => {
                assert_eq!(field, "mortality.female");
                assert_eq!(expected, dataset.max_age() + 1);
                assert_eq!(actual, dataset.max_age());
            }
            other => panic!("expected length mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_fertile_age_out_of_bounds() {
        let mut dataset = Dataset::reference();
        dataset.fertility.ages.push(150);
        dataset.fertility.shape.push(0.0);
        assert!(matches!(
            dataset.validate(),
            Err(ProjectionError::AgeOutOfBounds { age: 150, .. })
        ));
    }

    #[test]
    fn test_negative_population_is_rejected() {
        let mut dataset = Dataset::reference();
        dataset.population.male[30] = -1.0;
        assert!(matches!(dataset.validate(), Err(ProjectionError::InvalidValue { .. })));
    }

    #[test]
    fn test_employment_above_one_is_rejected() {
        let mut dataset = Dataset::reference();
        dataset.employment.female[40] = 1.2;
        assert!(dataset.validate().is_err());
    }

    #[test]
    fn test_fertility_rates_by_age() {
        let schedule = FertilitySchedule {
            ages: vec![20, 30],
            shape: vec![0.4, 0.6],
        };
        let rates = schedule.rates_by_age(1.5, 40);
        assert_eq!(rates.len(), 41);
        assert!((rates[20] - 0.6).abs() < 1e-12);
        assert!((rates[30] - 0.9).abs() < 1e-12);
        assert_eq!(rates[25], 0.0);
    }
}
