//! Scenario driver: prepares inputs, steps every year, and records results

use super::prepared::PreparedInputs;
use super::results::{PopulationPyramid, ScenarioResult, YearPoint};
use super::state::{ProjectionState, YearFlows};
use crate::dataset::{Dataset, Sex};
use crate::demography::CalibrationConfig;
use crate::error::Result;
use crate::params::ScenarioParams;
use crate::pension::{safe_ratio, solve_equilibrium, PaygInputs, PaygSnapshot};
use log::{debug, info, warn};

/// Relative gap between modelled and reported base-year pension that is
/// worth a warning
const PENSION_BASELINE_TOLERANCE: f64 = 0.10;

/// Main projection engine
pub struct ProjectionEngine<'a> {
    dataset: &'a Dataset,
    params: ScenarioParams,
    calibration: CalibrationConfig,
}

impl<'a> ProjectionEngine<'a> {
    /// Create an engine after validating the dataset and parameters
    pub fn new(dataset: &'a Dataset, params: ScenarioParams) -> Result<Self> {
        dataset.validate()?;
        params.validate(dataset)?;
        Ok(Self {
            dataset,
            params,
            calibration: CalibrationConfig::default(),
        })
    }

    /// Override the mortality calibration tolerance and iteration budget
    pub fn with_calibration(mut self, calibration: CalibrationConfig) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn params(&self) -> &ScenarioParams {
        &self.params
    }

    /// Run the full horizon
    pub fn run(&self) -> Result<ScenarioResult> {
        let dataset = self.dataset;
        let params = &self.params;
        let base_year = dataset.base_year();

        info!(
            "Projecting {} years from {} (TFR {:.2}, e0 {:.1}/{:.1}, migration {:+.1}‰, retirement age {})",
            params.horizon_years,
            base_year,
            params.tfr,
            params.e0_male,
            params.e0_female,
            params.net_migration_per_1000,
            params.retirement_age
        );

        let prepared = PreparedInputs::prepare(dataset, params, self.calibration);
        let mut state = ProjectionState::initial(dataset, &prepared);
        self.check_pension_baseline(&state);

        let capacity = params.horizon_years as usize + 1;
        let mut points = Vec::with_capacity(capacity);
        let mut pyramids = Vec::with_capacity(capacity);

        points.push(self.year_point(&state, &prepared, YearFlows::default())?);
        pyramids.push(PopulationPyramid::new(base_year, &state.population));

        for _ in 1..=params.horizon_years {
            let flows = state.advance(&prepared, params)?;
            let point = self.year_point(&state, &prepared, flows)?;
            debug!(
                "{}: population {:.0}, births {:.0}, deaths {:.0}, balance {:.0}",
                point.year, point.total_population, point.births, point.deaths, point.balance
            );
            pyramids.push(PopulationPyramid::new(point.year, &state.population));
            points.push(point);
        }

        let result = ScenarioResult::new(base_year, params.clone(), prepared.calibration, points, pyramids);
        let summary = result.summary();
        info!(
            "Projection finished: population {:.0} -> {:.0}, first deficit {:?}",
            summary.initial_population, summary.final_population, summary.first_deficit_year
        );
        Ok(result)
    }

    fn check_pension_baseline(&self, state: &ProjectionState) {
        let reported = self.dataset.payg.average_pension;
        let modelled = state.indexer.components().total_pension;
        if reported > 0.0 && ((modelled - reported) / reported).abs() > PENSION_BASELINE_TOLERANCE {
            warn!(
                "Modelled base-year pension {:.0} differs from the reported {:.0} by more than {:.0}%",
                modelled,
                reported,
                PENSION_BASELINE_TOLERANCE * 100.0
            );
        }
    }

    fn year_point(&self, state: &ProjectionState, prepared: &PreparedInputs, flows: YearFlows) -> Result<YearPoint> {
        let params = &self.params;
        let meta = &self.dataset.metadata;
        let population = &state.population;
        let pension = state.indexer.components();

        let inputs = PaygInputs {
            average_wage: state.average_wage,
            average_pension: pension.total_pension,
            contribution_rate: params.contribution_rate,
            retirement_age: params.retirement_age,
        };
        let snapshot = PaygSnapshot::new(population, &prepared.labour, inputs)?;
        let accounts = snapshot.evaluate();
        let equilibrium = params
            .compute_equilibrium
            .then(|| solve_equilibrium(&snapshot, params.equilibrium_age_bounds));

        let working_age_population = population.total_in_ages(meta.working_age_min, meta.working_age_max);
        let years = state.year_index as i32;

        Ok(YearPoint {
            year: self.dataset.base_year() + years,
            year_index: state.year_index,
            total_population: population.total(),
            male_population: population.sex_total(Sex::Male),
            female_population: population.sex_total(Sex::Female),
            working_age_population,
            births: flows.births,
            deaths: flows.deaths,
            net_migration: flows.net_migration,
            workers: accounts.workers,
            pensioners: accounts.pensioners,
            average_wage: state.average_wage,
            nominal_average_wage: state.average_wage * (1.0 + self.dataset.payg.cpi).powi(years),
            real_wage_growth: flows.real_wage_growth,
            wage_bill: accounts.wage_bill,
            contribution_rate: params.contribution_rate,
            contributions: accounts.contributions,
            basic_amount: pension.basic_amount,
            percentage_amount: pension.percentage_amount,
            average_pension: pension.total_pension,
            minimum_pension_applied: pension.minimum_applied,
            replacement_rate: safe_ratio(pension.total_pension, state.average_wage),
            cumulative_wage_gap: state.indexer.cumulative_wage_gap(),
            effective_indexation_growth: flows.effective_indexation_growth,
            benefits: accounts.benefits,
            balance: accounts.balance,
            required_rate: accounts.required_rate,
            dependency_ratio: accounts.dependency_ratio,
            old_age_dependency_ratio: safe_ratio(accounts.pensioners, working_age_population),
            equilibrium_retirement_age: equilibrium.and_then(|e| e.retirement_age),
            equilibrium_pension_ratio: equilibrium.and_then(|e| e.pension_ratio),
            equilibrium_contribution_rate: equilibrium.map(|e| e.contribution_rate),
        })
    }
}

/// Validate inputs and run one scenario
pub fn run_scenario(dataset: &Dataset, params: ScenarioParams) -> Result<ScenarioResult> {
    ProjectionEngine::new(dataset, params)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectionError;
    use approx::assert_relative_eq;

    fn reference_params(dataset: &Dataset, horizon_years: u32) -> ScenarioParams {
        ScenarioParams {
            horizon_years,
            ..ScenarioParams::from_dataset(dataset)
        }
    }

    #[test]
    fn test_projection_runs() {
        let dataset = Dataset::reference();
        let result = run_scenario(&dataset, reference_params(&dataset, 20)).unwrap();

        assert_eq!(result.points().len(), 21);
        assert_eq!(result.pyramids().len(), 21);
        assert_eq!(result.points()[0].year, dataset.base_year());
        assert_eq!(result.points()[20].year, dataset.base_year() + 20);
        assert_eq!(result.pyramids()[20].year, dataset.base_year() + 20);

        let base = &result.points()[0];
        assert_eq!(base.births, 0.0);
        assert_eq!(base.deaths, 0.0);
        assert_relative_eq!(base.total_population, dataset.population.total(), epsilon = 1e-6);

        for point in result.points() {
            assert!(point.total_population > 0.0);
            assert!(point.wage_bill > 0.0);
            assert!(point.required_rate.is_finite());
            assert!(!point.balance.is_nan());
            assert!(point.equilibrium_retirement_age.is_none());
        }
    }

    #[test]
    fn test_yearly_conservation() {
        let dataset = Dataset::reference();
        let result = run_scenario(&dataset, reference_params(&dataset, 10)).unwrap();
        for pair in result.points().windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let expected = prev.total_population - next.deaths + next.births + next.net_migration;
            assert_relative_eq!(next.total_population, expected, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_zero_fertility_and_migration_ages_population_forward() {
        let dataset = Dataset::reference();
        let params = ScenarioParams {
            horizon_years: 10,
            tfr: 0.0,
            net_migration_per_1000: 0.0,
            ..ScenarioParams::from_dataset(&dataset)
        };
        let result = run_scenario(&dataset, params).unwrap();
        let pyramids = result.pyramids();

        for sex_values in [(&pyramids[0].male, &pyramids[1].male), (&pyramids[0].female, &pyramids[1].female)] {
            let (year0, year1) = sex_values;
            assert!(year1[1] < year0[0]);
            assert!(year1[1] > 0.0);
            assert_eq!(year1[0], 0.0);
        }
        for point in &result.points()[1..] {
            assert_eq!(point.births, 0.0);
            assert_eq!(point.net_migration, 0.0);
        }
        // Each year only loses people
        for pair in result.points().windows(2) {
            assert!(pair[1].total_population < pair[0].total_population);
        }
    }

    #[test]
    fn test_runs_are_deterministic_and_leave_dataset_untouched() {
        let dataset = Dataset::reference();
        let before = dataset.clone();
        let a = run_scenario(&dataset, reference_params(&dataset, 5)).unwrap();
        let b = run_scenario(&dataset, reference_params(&dataset, 5)).unwrap();
        assert_eq!(a.points(), b.points());
        assert_eq!(dataset.population, before.population);
        assert_eq!(dataset.mortality, before.mortality);
    }

    #[test]
    fn test_equilibrium_mode_fills_points() {
        let dataset = Dataset::reference();
        let params = ScenarioParams {
            compute_equilibrium: true,
            ..reference_params(&dataset, 3)
        };
        let result = run_scenario(&dataset, params).unwrap();
        for point in result.points() {
            let rate = point.equilibrium_contribution_rate.unwrap();
            assert_relative_eq!(rate, point.required_rate, epsilon = 1e-12);
            if let Some(ratio) = point.equilibrium_pension_ratio {
                // at the balancing ratio benefits equal contributions
                let benefits = point.pensioners * ratio * point.average_wage;
                assert_relative_eq!(benefits, point.contributions, max_relative = 1e-6);
            }
            if let Some(age) = point.equilibrium_retirement_age {
                assert!((55..=80).contains(&age));
                if point.balance >= 0.0 {
                    assert!(age <= result.params().retirement_age);
                }
            }
        }
    }

    #[test]
    fn test_higher_contribution_rate_improves_balance() {
        let dataset = Dataset::reference();
        let low = run_scenario(&dataset, ScenarioParams { contribution_rate: 0.20, ..reference_params(&dataset, 5) }).unwrap();
        let high = run_scenario(&dataset, ScenarioParams { contribution_rate: 0.30, ..reference_params(&dataset, 5) }).unwrap();
        for (l, h) in low.points().iter().zip(high.points()) {
            assert!(h.balance > l.balance);
            assert_relative_eq!(h.required_rate, l.required_rate, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invalid_parameters_fail_fast() {
        let dataset = Dataset::reference();
        let params = ScenarioParams { retirement_age: 95, ..reference_params(&dataset, 5) };
        assert!(matches!(
            run_scenario(&dataset, params),
            Err(ProjectionError::ParameterOutOfRange { name: "retirement_age", .. })
        ));
    }

    #[test]
    fn test_summary() {
        let dataset = Dataset::reference();
        let result = run_scenario(&dataset, reference_params(&dataset, 10)).unwrap();
        let summary = result.summary();
        assert_eq!(summary.years, 11);
        assert_eq!(summary.final_population, result.points()[10].total_population);
        let peak = result.points().iter().map(|p| p.required_rate).fold(0.0, f64::max);
        assert_eq!(summary.peak_required_rate, peak);
        assert_eq!(result.point_for_year(dataset.base_year() + 10), result.points().last());
        assert!(result.point_for_year(dataset.base_year() - 1).is_none());
    }
}
