//! Per-run arrays derived once from the dataset and parameters

use crate::dataset::{AgeSexCurve, Dataset, Sex, SexPair};
use crate::demography::{calibrate_mortality, death_probabilities, CalibrationBound, CalibrationConfig};
use crate::params::ScenarioParams;
use crate::pension::{IndexationRules, LabourProfile};
use serde::{Deserialize, Serialize};

/// Calibration outcome for one sex, kept on the result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSummary {
    pub target_e0: f64,
    pub achieved_e0: f64,
    pub scaling_factor: f64,
    pub bound: CalibrationBound,
}

/// Inputs that stay fixed for the whole horizon
#[derive(Debug, Clone)]
pub struct PreparedInputs {
    /// Death probabilities from the calibrated hazards
    pub qx: AgeSexCurve,
    pub calibration: SexPair<CalibrationSummary>,
    /// Births per woman by age, full length
    pub fertility: Vec<f64>,
    pub migration_shape: AgeSexCurve,
    pub labour: LabourProfile,
    pub male_birth_share: f64,
    pub indexation: IndexationRules,
}

impl PreparedInputs {
    pub fn prepare(dataset: &Dataset, params: &ScenarioParams, config: CalibrationConfig) -> Self {
        let calibrated = dataset.mortality.map(|sex, mx| {
            let target = match sex {
                Sex::Male => params.e0_male,
                Sex::Female => params.e0_female,
            };
            (target, calibrate_mortality(mx, target, config))
        });

        let qx = calibrated.map(|_, (_, c)| death_probabilities(&c.scaled_mx));
        let calibration = calibrated.map(|_, (target, c)| CalibrationSummary {
            target_e0: *target,
            achieved_e0: c.achieved_e0,
            scaling_factor: c.scaling_factor,
            bound: c.bound,
        });

        Self {
            qx,
            calibration,
            fertility: dataset.fertility.rates_by_age(params.tfr, dataset.max_age()),
            migration_shape: dataset.migration_shape.clone(),
            labour: LabourProfile::for_unemployment(dataset, params.unemployment_rate),
            male_birth_share: dataset.male_birth_share(),
            indexation: IndexationRules {
                basic_amount_ratio: params.basic_amount_ratio,
                percentage_amount_ratio: params.percentage_amount_ratio,
                real_wage_index_share: params.real_wage_index_share,
                minimum_pension_ratio: params.minimum_pension_ratio,
                pensioner_cpi: dataset.payg.pensioner_cpi,
            },
        }
    }
}
