//! Cohort-component projection step
//!
//! One call advances an age/sex population by a single year. The order is
//! fixed: mortality, ageing, migration from the post-ageing total, then births
//! from the post-migration female population.

use crate::dataset::{AgeSexCurve, Population, Sex};
use crate::error::{ProjectionError, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// Per-year demographic rates applied by [`step`]
#[derive(Debug, Clone, Copy)]
pub struct CohortRates<'a> {
    /// Annual death probabilities by age and sex
    pub qx: &'a AgeSexCurve,
    /// Births per woman by age, full length
    pub fertility: &'a [f64],
    /// Shares of total net migration by age and sex
    pub migration_shape: &'a AgeSexCurve,
    pub net_migration_per_1000: f64,
    /// Probability that a birth is male
    pub male_birth_share: f64,
}

/// Result of one projection step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub population: Population,
    pub births: f64,
    pub deaths: f64,
    /// Net migration actually applied after per-cell clamping
    pub net_migration: f64,
}

fn check_length(field: &str, values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(ProjectionError::LengthMismatch {
            field: field.to_string(),
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

/// Apply one year of mortality to a single-sex age vector
///
/// Returns survivors by age and total deaths. `qx` must cover every age of
/// `population`.
pub fn calculate_survivors(population: &[f64], qx: &[f64]) -> Result<(Vec<f64>, f64)> {
    check_length("qx", qx, population.len())?;
    let mut deaths = 0.0;
    let survivors = population
        .iter()
        .zip(qx)
        .map(|(&pop, &q)| {
            let q = q.clamp(0.0, 1.0);
            deaths += pop * q;
            pop * (1.0 - q)
        })
        .collect();
    Ok((survivors, deaths))
}

/// Shift every cohort up one year; the open interval keeps its residents
pub fn age_cohorts(survivors: &[f64]) -> Vec<f64> {
    let n = survivors.len();
    let mut aged = vec![0.0; n];
    if n == 0 {
        return aged;
    }
    for age in 1..n {
        aged[age] = survivors[age - 1];
    }
    aged[n - 1] += survivors[n - 1];
    aged
}

/// Add net migration proportional to the current total population
///
/// Each cell is clamped at zero, so the applied total can be smaller in
/// magnitude than the target when emigration exceeds residents. Returns the
/// applied total.
pub fn apply_migration(population: &mut Population, shape: &AgeSexCurve, net_migration_per_1000: f64) -> Result<f64> {
    let max_age = population.max_age();
    population.check_ages("population", max_age)?;
    shape.check_ages("migration_shape", max_age)?;

    let total_migrants = net_migration_per_1000 / 1000.0 * population.total();
    if total_migrants == 0.0 {
        return Ok(0.0);
    }

    let mut applied = 0.0;
    let mut removed = 0.0;
    for sex in Sex::ALL {
        for (cell, &share) in population[sex].iter_mut().zip(&shape[sex]) {
            let target = *cell + total_migrants * share;
            if target < 0.0 {
                removed -= target;
            }
            let updated = target.max(0.0);
            applied += updated - *cell;
            *cell = updated;
        }
    }
    if removed > 0.0 {
        warn!(
            "Emigration exceeds residents in some cells; {:.1} migrants not applied",
            removed
        );
    }
    Ok(applied)
}

/// Births to the female population under age-specific fertility rates
pub fn calculate_births(females: &[f64], fertility: &[f64]) -> Result<f64> {
    check_length("fertility", fertility, females.len())?;
    Ok(females.iter().zip(fertility).map(|(w, f)| w * f).sum())
}

/// Advance the population by one year
///
/// Every rate array must cover the same ages as the population.
pub fn step(population: &Population, rates: &CohortRates<'_>) -> Result<StepOutcome> {
    let max_age = population.max_age();
    population.check_ages("population", max_age)?;
    rates.qx.check_ages("qx", max_age)?;
    rates.migration_shape.check_ages("migration_shape", max_age)?;
    check_length("fertility", rates.fertility, max_age + 1)?;

    let mut deaths = 0.0;
    let mut next = Population::zeros(max_age);

    for sex in Sex::ALL {
        let (survivors, sex_deaths) = calculate_survivors(&population[sex], &rates.qx[sex])?;
        deaths += sex_deaths;
        next[sex] = age_cohorts(&survivors);
    }

    let net_migration = apply_migration(&mut next, rates.migration_shape, rates.net_migration_per_1000)?;

    let births = calculate_births(&next.female, rates.fertility)?;
    let male_births = births * rates.male_birth_share;
    next.male[0] += male_births;
    next.female[0] += births - male_births;

    Ok(StepOutcome {
        population: next,
        births,
        deaths,
        net_migration,
    })
}
