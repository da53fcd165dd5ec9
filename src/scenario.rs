//! Scenario runner for batch projections
//!
//! Holds one validated dataset and runs any number of parameter sets against
//! it. Runs share only read-only inputs, so batches execute in parallel.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::params::ScenarioParams;
use crate::projection::{ProjectionEngine, ScenarioResult};
use rayon::prelude::*;
use std::path::Path;

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_json_path("data/dataset.json")?;
///
/// for tfr in [1.4, 1.6, 1.8] {
///     let params = ScenarioParams { tfr, ..runner.default_params() };
///     let result = runner.run(params)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    dataset: Dataset,
}

impl ScenarioRunner {
    /// Runner over the built-in reference dataset
    pub fn new() -> Self {
        Self {
            dataset: Dataset::reference(),
        }
    }

    /// Runner over a dataset loaded from JSON
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            dataset: crate::dataset::load_dataset(path)?,
        })
    }

    /// Runner over an in-memory dataset; validated up front
    pub fn with_dataset(dataset: Dataset) -> Result<Self> {
        dataset.validate()?;
        Ok(Self { dataset })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Parameters seeded from the dataset's baselines
    pub fn default_params(&self) -> ScenarioParams {
        ScenarioParams::from_dataset(&self.dataset)
    }

    /// Run a single scenario
    pub fn run(&self, params: ScenarioParams) -> Result<ScenarioResult> {
        ProjectionEngine::new(&self.dataset, params)?.run()
    }

    /// Run independent scenarios in parallel; results keep the input order
    pub fn run_batch(&self, params: &[ScenarioParams]) -> Vec<Result<ScenarioResult>> {
        params.par_iter().map(|p| self.run(p.clone())).collect()
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_runner_batch() {
        let runner = ScenarioRunner::new();
        let params: Vec<_> = [1.2, 1.6, 2.0]
            .iter()
            .map(|&tfr| ScenarioParams {
                tfr,
                horizon_years: 30,
                ..runner.default_params()
            })
            .collect();

        let results: Vec<_> = runner
            .run_batch(&params)
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(results.len(), 3);

        // Higher fertility leaves a larger population after 30 years
        let finals: Vec<f64> = results.iter().map(|r| r.summary().final_population).collect();
        assert!(finals[2] > finals[1] && finals[1] > finals[0]);
        assert_eq!(results[0].params().tfr, 1.2);
    }

    #[test]
    fn test_batch_reports_each_failure() {
        let runner = ScenarioRunner::new();
        let good = ScenarioParams { horizon_years: 2, ..runner.default_params() };
        let bad = ScenarioParams { horizon_years: 0, ..runner.default_params() };
        let results = runner.run_batch(&[good, bad]);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_runner_from_json_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let mut dataset = Dataset::reference();
        dataset.metadata.base_year = 2030;
        dataset.write_json(&path).unwrap();

        let runner = ScenarioRunner::from_json_path(&path).unwrap();
        assert_eq!(runner.dataset().base_year(), 2030);
        let result = runner
            .run(ScenarioParams { horizon_years: 2, ..runner.default_params() })
            .unwrap();
        assert_eq!(result.points()[2].year, 2032);
    }

    #[test]
    fn test_invalid_dataset_is_rejected() {
        let mut dataset = Dataset::reference();
        dataset.migration_shape.male.clear();
        assert!(ScenarioRunner::with_dataset(dataset).is_err());
    }
}
