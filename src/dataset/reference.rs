//! Built-in reference dataset
//!
//! A synthetic, Czech-like dataset generated from parametric curves so that
//! the engine can run without any input files. Levels are annual CZK.

use super::{
    AgeSexCurve, Dataset, DatasetMetadata, FertilitySchedule, PaygBaseline, PensionRatios,
    Population, Sex, SexPair,
};

const MAX_AGE: usize = 100;
const BASE_YEAR: i32 = 2024;
const SEX_RATIO_AT_BIRTH: f64 = 1.05;

/// Gompertz-Makeham hazard parameters: `makeham + alpha * exp(beta * age)`
struct Hazard {
    infant: f64,
    makeham: f64,
    alpha: f64,
    beta: f64,
}

const MALE_HAZARD: Hazard = Hazard { infant: 0.0028, makeham: 0.0002, alpha: 3.5e-5, beta: 0.098 };
const FEMALE_HAZARD: Hazard = Hazard { infant: 0.0023, makeham: 0.0001, alpha: 1.6e-5, beta: 0.102 };

impl Dataset {
    /// Reference dataset used when no dataset file is supplied
    pub fn reference() -> Self {
        let mortality = reference_mortality();
        let population = reference_population(&mortality);
        let employment = reference_employment();
        let relative_wage = reference_relative_wage(&population, &employment);

        Self {
            metadata: DatasetMetadata {
                name: "Reference (synthetic Czech-like)".to_string(),
                max_age: MAX_AGE,
                base_year: BASE_YEAR,
                sex_ratio_at_birth: SEX_RATIO_AT_BIRTH,
                fertile_age_min: 15,
                fertile_age_max: 49,
                working_age_min: 15,
                working_age_max: 64,
            },
            population,
            fertility: reference_fertility(),
            mortality,
            employment,
            relative_wage,
            migration_shape: reference_migration_shape(),
            payg: PaygBaseline {
                contribution_rate: 0.28,
                average_wage: 516_000.0,
                average_pension: 246_000.0,
                cpi: 0.02,
                pensioner_cpi: 0.025,
                unemployment_rate: 0.03,
            },
            pension: PensionRatios {
                basic_amount_ratio: 0.10,
                percentage_amount_ratio: 0.36,
                real_wage_index_share: 0.5,
                minimum_pension_ratio: 0.20,
            },
        }
    }
}

fn gaussian(age: f64, centre: f64, width: f64) -> f64 {
    let z = (age - centre) / width;
    (-z * z).exp()
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn reference_mortality() -> AgeSexCurve {
    SexPair::from_fn(|sex| {
        let h = match sex {
            Sex::Male => &MALE_HAZARD,
            Sex::Female => &FEMALE_HAZARD,
        };
        (0..=MAX_AGE)
            .map(|age| {
                if age == 0 {
                    h.infant
                } else {
                    h.makeham + h.alpha * (h.beta * age as f64).exp()
                }
            })
            .collect()
    })
}

/// Cohort sizes with a post-war bulge near 48 and a trough in the mid-twenties,
/// thinned by survivorship under the reference mortality
fn reference_population(mortality: &AgeSexCurve) -> Population {
    let male_share = SEX_RATIO_AT_BIRTH / (1.0 + SEX_RATIO_AT_BIRTH);
    SexPair::from_fn(|sex| {
        let share = match sex {
            Sex::Male => male_share,
            Sex::Female => 1.0 - male_share,
        };
        let mut survival = 1.0;
        (0..=MAX_AGE)
            .map(|age| {
                let a = age as f64;
                let cohort = 140_000.0
                    * (1.0 + 0.30 * gaussian(a, 48.0, 9.0) - 0.12 * gaussian(a, 25.0, 6.0));
                let value = cohort * share * survival;
                survival *= (-mortality[sex][age]).exp();
                value
            })
            .collect()
    })
}

fn reference_fertility() -> FertilitySchedule {
    let ages: Vec<usize> = (15..=49).collect();
    let raw: Vec<f64> = ages.iter().map(|&a| gaussian(a as f64, 30.5, 5.5)).collect();
    let total: f64 = raw.iter().sum();
    FertilitySchedule {
        ages,
        shape: raw.into_iter().map(|v| v / total).collect(),
    }
}

fn reference_employment() -> AgeSexCurve {
    SexPair::from_fn(|sex| {
        let peak = match sex {
            Sex::Male => 0.88,
            Sex::Female => 0.80,
        };
        (0..=MAX_AGE)
            .map(|age| {
                if !(15..=75).contains(&age) {
                    return 0.0;
                }
                let a = age as f64;
                peak * logistic((a - 20.0) / 2.0) * logistic((62.0 - a) / 2.0)
            })
            .collect()
    })
}

/// Hump-shaped earnings profile, normalised so the employment-weighted mean
/// relative wage of the base population is one
fn reference_relative_wage(population: &Population, employment: &AgeSexCurve) -> AgeSexCurve {
    let mut profile: AgeSexCurve = SexPair::from_fn(|sex| {
        let level = match sex {
            Sex::Male => 1.0,
            Sex::Female => 0.84,
        };
        (0..=MAX_AGE)
            .map(|age| {
                if !(15..=75).contains(&age) {
                    return 0.0;
                }
                level * (0.55 + 0.60 * gaussian(age as f64, 45.0, 16.0))
            })
            .collect()
    });

    let mut workers = 0.0;
    let mut weighted = 0.0;
    for sex in Sex::ALL {
        for age in 0..=MAX_AGE {
            let w = population[sex][age] * employment[sex][age];
            workers += w;
            weighted += w * profile[sex][age];
        }
    }
    if weighted > 0.0 {
        let factor = workers / weighted;
        for sex in Sex::ALL {
            for value in profile[sex].iter_mut() {
                *value *= factor;
            }
        }
    }
    profile
}

fn reference_migration_shape() -> AgeSexCurve {
    let raw: Vec<f64> = (0..=MAX_AGE)
        .map(|age| {
            let a = age as f64;
            gaussian(a, 28.0, 8.0) + 0.15 * gaussian(a, 2.0, 3.0)
        })
        .collect();
    let total: f64 = raw.iter().sum();
    SexPair::from_fn(|sex| {
        let weight = match sex {
            Sex::Male => 0.55,
            Sex::Female => 0.45,
        };
        raw.iter().map(|v| weight * v / total).collect()
    })
}
