//! Mutable state carried from one projection year to the next

use super::prepared::PreparedInputs;
use crate::dataset::{Dataset, Population};
use crate::demography::{step, CohortRates};
use crate::error::Result;
use crate::params::ScenarioParams;
use crate::pension::{average_wage_at, PensionIndexer};

/// Demographic flows and wage movement of one projected year
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YearFlows {
    pub births: f64,
    pub deaths: f64,
    pub net_migration: f64,
    pub real_wage_growth: f64,
    pub effective_indexation_growth: f64,
}

/// Projection state at the start of a year
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Years elapsed since the base year
    pub year_index: u32,
    pub population: Population,
    pub average_wage: f64,
    pub indexer: PensionIndexer,
    base_wage: f64,
}

impl ProjectionState {
    /// Base-year state; copies the dataset population
    pub fn initial(dataset: &Dataset, prepared: &PreparedInputs) -> Self {
        let base_wage = dataset.payg.average_wage;
        Self {
            year_index: 0,
            population: dataset.population.clone(),
            average_wage: base_wage,
            indexer: PensionIndexer::new(prepared.indexation, base_wage),
            base_wage,
        }
    }

    /// Advance population, wage and pension by one year
    ///
    /// On error the state is left at the previous year.
    pub fn advance(&mut self, prepared: &PreparedInputs, params: &ScenarioParams) -> Result<YearFlows> {
        let rates = CohortRates {
            qx: &prepared.qx,
            fertility: &prepared.fertility,
            migration_shape: &prepared.migration_shape,
            net_migration_per_1000: params.net_migration_per_1000,
            male_birth_share: prepared.male_birth_share,
        };
        let outcome = step(&self.population, &rates)?;
        self.population = outcome.population;
        self.year_index += 1;

        let growth = params.wage_growth_for_year(self.year_index);
        self.average_wage = match params.real_wage_growth_path {
            None => average_wage_at(self.base_wage, params.real_wage_growth, self.year_index),
            Some(_) => self.average_wage * (1.0 + growth),
        };

        let indexation = self.indexer.advance(self.average_wage, growth);

        Ok(YearFlows {
            births: outcome.births,
            deaths: outcome.deaths,
            net_migration: outcome.net_migration,
            real_wage_growth: growth,
            effective_indexation_growth: indexation.effective_growth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demography::CalibrationConfig;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_growth_follows_geometric_path() {
        let dataset = Dataset::reference();
        let params = ScenarioParams { real_wage_growth: 0.02, ..ScenarioParams::from_dataset(&dataset) };
        let prepared = PreparedInputs::prepare(&dataset, &params, CalibrationConfig::default());
        let mut state = ProjectionState::initial(&dataset, &prepared);
        for _ in 0..3 {
            state.advance(&prepared, &params).unwrap();
        }
        assert_eq!(state.year_index, 3);
        assert_relative_eq!(state.average_wage, dataset.payg.average_wage * 1.02f64.powi(3), epsilon = 1e-6);
    }

    #[test]
    fn test_growth_path_drives_wage_and_gap() {
        let dataset = Dataset::reference();
        let params = ScenarioParams {
            real_wage_growth_path: Some(vec![-0.05, 0.08]),
            ..ScenarioParams::from_dataset(&dataset)
        };
        let prepared = PreparedInputs::prepare(&dataset, &params, CalibrationConfig::default());
        let mut state = ProjectionState::initial(&dataset, &prepared);

        let first = state.advance(&prepared, &params).unwrap();
        assert_eq!(first.effective_indexation_growth, 0.0);
        assert_relative_eq!(state.indexer.cumulative_wage_gap(), -0.05);

        let second = state.advance(&prepared, &params).unwrap();
        assert_relative_eq!(second.effective_indexation_growth, 0.03, epsilon = 1e-12);
        assert_eq!(state.indexer.cumulative_wage_gap(), 0.0);
        assert_relative_eq!(state.average_wage, dataset.payg.average_wage * 0.95 * 1.08, epsilon = 1e-6);
    }
}
