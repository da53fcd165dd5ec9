//! Pay-as-you-go accounting over a population snapshot
//!
//! Ratios with a zero denominator follow one policy: 0 when the numerator is
//! also zero, +inf otherwise. No NaN is ever produced.

use crate::dataset::{AgeSexCurve, Dataset, Population, Sex};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Employment and earnings profile used for the wage bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabourProfile {
    pub employment: AgeSexCurve,
    pub relative_wage: AgeSexCurve,
}

impl LabourProfile {
    /// Dataset profile with employment rescaled to a target unemployment rate
    pub fn for_unemployment(dataset: &Dataset, unemployment_rate: f64) -> Self {
        let multiplier = employment_multiplier(unemployment_rate, dataset.payg.unemployment_rate);
        Self {
            employment: dataset
                .employment
                .map(|_, rates| rates.iter().map(|r| (r * multiplier).clamp(0.0, 1.0)).collect()),
            relative_wage: dataset.relative_wage.clone(),
        }
    }

    /// Fail unless both curves cover exactly the ages `0..=max_age`
    pub fn check_ages(&self, max_age: usize) -> Result<()> {
        self.employment.check_ages("employment", max_age)?;
        self.relative_wage.check_ages("relative_wage", max_age)
    }
}

/// Scale applied to observed employment rates when unemployment moves from
/// `baseline` to `target`
pub fn employment_multiplier(target: f64, baseline: f64) -> f64 {
    if baseline >= 1.0 {
        return 1.0;
    }
    ((1.0 - target) / (1.0 - baseline)).max(0.0)
}

/// Average wage in projection year `year` under constant real growth
pub fn average_wage_at(base_wage: f64, real_wage_growth: f64, year: u32) -> f64 {
    base_wage * (1.0 + real_wage_growth).powi(year as i32)
}

/// `numerator / denominator` under the 0 / +inf policy
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if numerator <= 0.0 {
        0.0
    } else if denominator <= 0.0 {
        f64::INFINITY
    } else {
        numerator / denominator
    }
}

/// Employment- and wage-weighted population times the average wage
pub fn calculate_wage_bill(population: &Population, labour: &LabourProfile, average_wage: f64) -> Result<f64> {
    let max_age = population.max_age();
    population.check_ages("population", max_age)?;
    labour.check_ages(max_age)?;
    Ok(sum_wage_bill(population, labour, average_wage))
}

fn sum_wage_bill(population: &Population, labour: &LabourProfile, average_wage: f64) -> f64 {
    let mut total = 0.0;
    for sex in Sex::ALL {
        for ((pop, emp), rel) in population[sex]
            .iter()
            .zip(&labour.employment[sex])
            .zip(&labour.relative_wage[sex])
        {
            total += pop * emp * rel;
        }
    }
    total * average_wage
}

pub fn calculate_contributions(wage_bill: f64, contribution_rate: f64) -> f64 {
    wage_bill * contribution_rate
}

/// Everyone at or above `retirement_age`, both sexes
pub fn count_pensioners(population: &Population, retirement_age: u32) -> f64 {
    population.total_in_ages(retirement_age as usize, population.max_age())
}

/// Effective workers: population weighted by employment rate
pub fn count_workers(population: &Population, employment: &AgeSexCurve) -> Result<f64> {
    let max_age = population.max_age();
    population.check_ages("population", max_age)?;
    employment.check_ages("employment", max_age)?;
    Ok(sum_workers(population, employment))
}

fn sum_workers(population: &Population, employment: &AgeSexCurve) -> f64 {
    Sex::ALL
        .iter()
        .map(|&sex| {
            population[sex]
                .iter()
                .zip(&employment[sex])
                .map(|(p, e)| p * e)
                .sum::<f64>()
        })
        .sum()
}

pub fn calculate_benefits(pensioners: f64, average_pension: f64) -> f64 {
    pensioners * average_pension
}

/// Contributions minus benefits; negative is a deficit
pub fn calculate_balance(contributions: f64, benefits: f64) -> f64 {
    contributions - benefits
}

/// Contribution rate that would exactly cover benefits
pub fn calculate_required_rate(benefits: f64, wage_bill: f64) -> f64 {
    safe_ratio(benefits, wage_bill)
}

/// Pensioners per effective worker
pub fn calculate_dependency_ratio(pensioners: f64, workers: f64) -> f64 {
    safe_ratio(pensioners, workers)
}

/// Scalar inputs of one accounting evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaygInputs {
    pub average_wage: f64,
    pub average_pension: f64,
    pub contribution_rate: f64,
    pub retirement_age: u32,
}

/// Full accounting for one population snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaygAccounts {
    pub wage_bill: f64,
    pub contributions: f64,
    pub workers: f64,
    pub pensioners: f64,
    pub benefits: f64,
    pub balance: f64,
    pub required_rate: f64,
    pub dependency_ratio: f64,
}

impl PaygAccounts {
    pub fn evaluate(population: &Population, labour: &LabourProfile, inputs: &PaygInputs) -> Result<Self> {
        let max_age = population.max_age();
        population.check_ages("population", max_age)?;
        labour.check_ages(max_age)?;
        Ok(Self::evaluate_checked(population, labour, inputs))
    }

    /// Accounting over curves already known to cover the population's ages
    pub(super) fn evaluate_checked(population: &Population, labour: &LabourProfile, inputs: &PaygInputs) -> Self {
        let wage_bill = sum_wage_bill(population, labour, inputs.average_wage);
        let contributions = calculate_contributions(wage_bill, inputs.contribution_rate);
        let workers = sum_workers(population, &labour.employment);
        let pensioners = count_pensioners(population, inputs.retirement_age);
        let benefits = calculate_benefits(pensioners, inputs.average_pension);
        Self {
            wage_bill,
            contributions,
            workers,
            pensioners,
            benefits,
            balance: calculate_balance(contributions, benefits),
            required_rate: calculate_required_rate(benefits, wage_bill),
            dependency_ratio: calculate_dependency_ratio(pensioners, workers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SexPair;
    use crate::error::ProjectionError;
    use approx::assert_relative_eq;

    fn labour(max_age: usize, employment: f64, relative_wage: f64) -> LabourProfile {
        LabourProfile {
            employment: SexPair::from_fn(|_| vec![employment; max_age + 1]),
            relative_wage: SexPair::from_fn(|_| vec![relative_wage; max_age + 1]),
        }
    }

    #[test]
    fn test_reference_example() {
        let contributions = calculate_contributions(1_272_825_000.0, 0.20);
        assert_relative_eq!(contributions, 254_565_000.0, epsilon = 1e-3);

        let benefits = calculate_benefits(8_500.0, 45_000.0);
        assert_eq!(benefits, 382_500_000.0);

        let balance = calculate_balance(contributions, benefits);
        assert_relative_eq!(balance, -127_935_000.0, epsilon = 1e-3);
        assert!(balance < 0.0);
    }

    #[test]
    fn test_required_rate_edge_cases() {
        assert_eq!(calculate_required_rate(0.0, 1_000.0), 0.0);
        assert_eq!(calculate_required_rate(0.0, 0.0), 0.0);
        assert_eq!(calculate_required_rate(100.0, 0.0), f64::INFINITY);
        assert_relative_eq!(calculate_required_rate(25.0, 100.0), 0.25);
    }

    #[test]
    fn test_dependency_ratio_edge_cases() {
        assert_eq!(calculate_dependency_ratio(0.0, 0.0), 0.0);
        assert_eq!(calculate_dependency_ratio(10.0, 0.0), f64::INFINITY);
        assert_relative_eq!(calculate_dependency_ratio(10.0, 40.0), 0.25);
    }

    #[test]
    fn test_wage_bill_and_counts() {
        let pop = SexPair::new(vec![100.0, 200.0, 50.0], vec![100.0, 100.0, 150.0]);
        let profile = labour(2, 0.5, 2.0);
        // (350 + 350) * 0.5 * 2.0 * 1000
        assert_relative_eq!(calculate_wage_bill(&pop, &profile, 1_000.0).unwrap(), 700_000.0);
        assert_relative_eq!(count_workers(&pop, &profile.employment).unwrap(), 350.0);
        assert_relative_eq!(count_pensioners(&pop, 2), 200.0);
        assert_relative_eq!(count_pensioners(&pop, 1), 500.0);
        assert_eq!(count_pensioners(&pop, 3), 0.0);
    }

    #[test]
    fn test_short_labour_curves_are_rejected() {
        let pop = SexPair::new(vec![100.0, 200.0, 50.0], vec![100.0, 100.0, 150.0]);
        let short = labour(1, 0.5, 1.0);
        assert!(matches!(
            calculate_wage_bill(&pop, &short, 1_000.0),
            Err(ProjectionError::LengthMismatch { expected: 3, actual: 2, .. })
        ));
        assert!(count_workers(&pop, &short.employment).is_err());

        let inputs = PaygInputs {
            average_wage: 1_000.0,
            average_pension: 400.0,
            contribution_rate: 0.25,
            retirement_age: 2,
        };
        assert!(PaygAccounts::evaluate(&pop, &short, &inputs).is_err());
    }

    #[test]
    fn test_accounts_evaluate() {
        let pop = SexPair::new(vec![100.0, 200.0, 50.0], vec![100.0, 100.0, 150.0]);
        let profile = labour(2, 0.5, 1.0);
        let inputs = PaygInputs {
            average_wage: 1_000.0,
            average_pension: 400.0,
            contribution_rate: 0.25,
            retirement_age: 2,
        };
        let accounts = PaygAccounts::evaluate(&pop, &profile, &inputs).unwrap();
        assert_relative_eq!(accounts.wage_bill, 350_000.0);
        assert_relative_eq!(accounts.contributions, 87_500.0);
        assert_relative_eq!(accounts.benefits, 80_000.0);
        assert_relative_eq!(accounts.balance, 7_500.0);
        assert_relative_eq!(accounts.required_rate, 80_000.0 / 350_000.0);
        assert_relative_eq!(accounts.dependency_ratio, 200.0 / 350.0);
    }

    #[test]
    fn test_average_wage_growth() {
        assert_eq!(average_wage_at(500_000.0, 0.02, 0), 500_000.0);
        assert_relative_eq!(average_wage_at(500_000.0, 0.02, 2), 500_000.0 * 1.0404, epsilon = 1e-6);
    }

    #[test]
    fn test_employment_multiplier() {
        assert_relative_eq!(employment_multiplier(0.03, 0.03), 1.0);
        assert_relative_eq!(employment_multiplier(0.10, 0.05), 0.9 / 0.95);
        let dataset = Dataset::reference();
        let profile = LabourProfile::for_unemployment(&dataset, 0.0);
        assert!(profile.employment.male.iter().all(|&e| e <= 1.0));
        let age = 40;
        assert!(profile.employment.male[age] > dataset.employment.male[age]);
    }
}
