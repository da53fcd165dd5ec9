//! Projection output: yearly accounting points and population pyramids

use super::prepared::CalibrationSummary;
use crate::dataset::{Population, SexPair};
use crate::params::ScenarioParams;
use serde::{Deserialize, Serialize};

/// Serde format for ratios that are +inf when their denominator vanishes
///
/// JSON has no infinity, so infinite values are written as the strings
/// `"inf"` / `"-inf"`. Finite values stay plain numbers.
mod unbounded_ratio {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

/// Full accounting snapshot for one projection year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    // Timing
    pub year: i32,
    pub year_index: u32,

    // Population
    pub total_population: f64,
    pub male_population: f64,
    pub female_population: f64,
    pub working_age_population: f64,
    pub births: f64,
    pub deaths: f64,
    pub net_migration: f64,

    // Labour and wages
    pub workers: f64,
    pub pensioners: f64,
    pub average_wage: f64,
    pub nominal_average_wage: f64,
    pub real_wage_growth: f64,
    pub wage_bill: f64,
    pub contribution_rate: f64,
    pub contributions: f64,

    // Pension
    pub basic_amount: f64,
    pub percentage_amount: f64,
    pub average_pension: f64,
    pub minimum_pension_applied: bool,
    #[serde(with = "unbounded_ratio")]
    pub replacement_rate: f64,
    pub cumulative_wage_gap: f64,
    pub effective_indexation_growth: f64,

    // System balance
    pub benefits: f64,
    pub balance: f64,
    #[serde(with = "unbounded_ratio")]
    pub required_rate: f64,
    #[serde(with = "unbounded_ratio")]
    pub dependency_ratio: f64,
    #[serde(with = "unbounded_ratio")]
    pub old_age_dependency_ratio: f64,

    // Equilibrium (only when requested)
    pub equilibrium_retirement_age: Option<u32>,
    pub equilibrium_pension_ratio: Option<f64>,
    pub equilibrium_contribution_rate: Option<f64>,
}

impl YearPoint {
    pub fn is_deficit(&self) -> bool {
        self.balance < 0.0
    }
}

/// Single-year-of-age population for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationPyramid {
    pub year: i32,
    pub male: Vec<f64>,
    pub female: Vec<f64>,
}

/// Aggregated age band of a pyramid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PyramidBand {
    pub from_age: usize,
    pub to_age: usize,
    /// The band holds the terminal open age interval
    pub open_ended: bool,
    pub male: f64,
    pub female: f64,
}

impl PopulationPyramid {
    pub fn new(year: i32, population: &Population) -> Self {
        Self {
            year,
            male: population.male.clone(),
            female: population.female.clone(),
        }
    }

    pub fn total(&self) -> f64 {
        self.male.iter().sum::<f64>() + self.female.iter().sum::<f64>()
    }

    /// Aggregate into bands of `width` years; the last band ends at the open
    /// interval
    pub fn grouped(&self, width: usize) -> Vec<PyramidBand> {
        let width = width.max(1);
        let n = self.male.len();
        let mut bands = Vec::with_capacity(n / width + 1);
        let mut from_age = 0;
        while from_age < n {
            let to_age = (from_age + width - 1).min(n - 1);
            bands.push(PyramidBand {
                from_age,
                to_age,
                open_ended: to_age == n - 1,
                male: self.male[from_age..=to_age].iter().sum(),
                female: self.female[from_age..=to_age].iter().sum(),
            });
            from_age += width;
        }
        bands
    }
}

/// Aggregate view of a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub years: usize,
    pub initial_population: f64,
    pub final_population: f64,
    pub first_deficit_year: Option<i32>,
    pub cumulative_balance: f64,
    #[serde(with = "unbounded_ratio")]
    pub peak_required_rate: f64,
    #[serde(with = "unbounded_ratio")]
    pub final_dependency_ratio: f64,
}

/// Complete, immutable result of one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    base_year: i32,
    params: ScenarioParams,
    calibration: SexPair<CalibrationSummary>,
    points: Vec<YearPoint>,
    pyramids: Vec<PopulationPyramid>,
}

impl ScenarioResult {
    pub(crate) fn new(
        base_year: i32,
        params: ScenarioParams,
        calibration: SexPair<CalibrationSummary>,
        points: Vec<YearPoint>,
        pyramids: Vec<PopulationPyramid>,
    ) -> Self {
        Self {
            base_year,
            params,
            calibration,
            points,
            pyramids,
        }
    }

    pub fn base_year(&self) -> i32 {
        self.base_year
    }

    pub fn params(&self) -> &ScenarioParams {
        &self.params
    }

    pub fn calibration(&self) -> &SexPair<CalibrationSummary> {
        &self.calibration
    }

    /// Year points from the base year through the horizon
    pub fn points(&self) -> &[YearPoint] {
        &self.points
    }

    /// One pyramid per year point, same order
    pub fn pyramids(&self) -> &[PopulationPyramid] {
        &self.pyramids
    }

    pub fn point_for_year(&self, year: i32) -> Option<&YearPoint> {
        let index = usize::try_from(year - self.base_year).ok()?;
        self.points.get(index)
    }

    pub fn summary(&self) -> ScenarioSummary {
        let initial_population = self.points.first().map(|p| p.total_population).unwrap_or(0.0);
        let final_population = self.points.last().map(|p| p.total_population).unwrap_or(0.0);
        let first_deficit_year = self.points.iter().find(|p| p.is_deficit()).map(|p| p.year);
        let cumulative_balance = self.points.iter().map(|p| p.balance).sum();
        let peak_required_rate = self
            .points
            .iter()
            .map(|p| p.required_rate)
            .fold(0.0, f64::max);
        let final_dependency_ratio = self.points.last().map(|p| p.dependency_ratio).unwrap_or(0.0);

        ScenarioSummary {
            years: self.points.len(),
            initial_population,
            final_population,
            first_deficit_year,
            cumulative_balance,
            peak_required_rate,
            final_dependency_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_pyramid_bands() {
        let pop = SexPair::new(vec![1.0; 11], vec![2.0; 11]);
        let pyramid = PopulationPyramid::new(2024, &pop);
        let bands = pyramid.grouped(5);
        assert_eq!(bands.len(), 3);
        assert_eq!((bands[0].from_age, bands[0].to_age), (0, 4));
        assert_eq!(bands[0].male, 5.0);
        assert_eq!(bands[0].female, 10.0);
        assert!(!bands[1].open_ended);
        assert_eq!((bands[2].from_age, bands[2].to_age), (10, 10));
        assert!(bands[2].open_ended);
        let banded: f64 = bands.iter().map(|b| b.male + b.female).sum();
        assert_eq!(banded, pyramid.total());
    }

    #[test]
    fn test_infinite_ratios_survive_json() {
        let summary = ScenarioSummary {
            years: 1,
            initial_population: 10.0,
            final_population: 10.0,
            first_deficit_year: Some(2024),
            cumulative_balance: -5.0,
            peak_required_rate: f64::INFINITY,
            final_dependency_ratio: 0.25,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains(r#""peak_required_rate":"inf""#), "{}", json);
        assert!(json.contains(r#""final_dependency_ratio":0.25"#), "{}", json);

        let parsed: ScenarioSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.peak_required_rate, f64::INFINITY);
        assert_eq!(parsed, summary);
    }

    #[test]
    fn test_grouped_with_zero_width_uses_single_years() {
        let pop = SexPair::new(vec![1.0; 3], vec![1.0; 3]);
        let bands = PopulationPyramid::new(2024, &pop).grouped(0);
        assert_eq!(bands.len(), 3);
    }
}
