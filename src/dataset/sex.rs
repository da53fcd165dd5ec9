//! Two-sex containers
//!
//! The sex set is closed, so per-sex data is held in a fixed pair rather than
//! a keyed map. Every demographic loop iterates [`Sex::ALL`].

use crate::error::{ProjectionError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Sex of a population cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// One value per sex
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SexPair<T> {
    pub male: T,
    pub female: T,
}

impl<T> SexPair<T> {
    pub fn new(male: T, female: T) -> Self {
        Self { male, female }
    }

    /// Build a pair by evaluating `f` for each sex
    pub fn from_fn(mut f: impl FnMut(Sex) -> T) -> Self {
        Self {
            male: f(Sex::Male),
            female: f(Sex::Female),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Sex, &T) -> U) -> SexPair<U> {
        SexPair {
            male: f(Sex::Male, &self.male),
            female: f(Sex::Female, &self.female),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Sex, &T)> {
        [(Sex::Male, &self.male), (Sex::Female, &self.female)].into_iter()
    }
}

impl<T> Index<Sex> for SexPair<T> {
    type Output = T;

    fn index(&self, sex: Sex) -> &T {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }
}

impl<T> IndexMut<Sex> for SexPair<T> {
    fn index_mut(&mut self, sex: Sex) -> &mut T {
        match sex {
            Sex::Male => &mut self.male,
            Sex::Female => &mut self.female,
        }
    }
}

/// Per-age values for both sexes (index = age, last index = open interval)
pub type AgeSexCurve = SexPair<Vec<f64>>;

/// Age-sex population; same shape as any other per-age curve
pub type Population = AgeSexCurve;

impl SexPair<Vec<f64>> {
    /// Zero-filled curve covering ages `0..=max_age`
    pub fn zeros(max_age: usize) -> Self {
        Self::from_fn(|_| vec![0.0; max_age + 1])
    }

    /// Terminal (open interval) age
    pub fn max_age(&self) -> usize {
        self.male.len().saturating_sub(1)
    }

    /// Sum over all ages of one sex
    pub fn sex_total(&self, sex: Sex) -> f64 {
        self[sex].iter().sum()
    }

    /// Sum over all ages and both sexes
    pub fn total(&self) -> f64 {
        self.sex_total(Sex::Male) + self.sex_total(Sex::Female)
    }

    /// Fail unless both sexes hold exactly `max_age + 1` entries
    pub fn check_ages(&self, field: &str, max_age: usize) -> Result<()> {
        for (sex, values) in self.iter() {
            if values.len() != max_age + 1 {
                return Err(ProjectionError::LengthMismatch {
                    field: format!("{}.{}", field, sex.label()),
                    expected: max_age + 1,
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }

    /// Sum of both sexes over ages `from..=to` (clipped to the modelled range)
    pub fn total_in_ages(&self, from: usize, to: usize) -> f64 {
        if from > to {
            return 0.0;
        }
        Sex::ALL
            .iter()
            .map(|&sex| self[sex].iter().take(to.saturating_add(1)).skip(from).sum::<f64>())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_by_sex() {
        let mut pair = SexPair::new(1, 2);
        assert_eq!(pair[Sex::Male], 1);
        assert_eq!(pair[Sex::Female], 2);
        pair[Sex::Female] = 5;
        assert_eq!(pair.female, 5);
    }

    #[test]
    fn test_population_totals() {
        let pop: Population = SexPair::new(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]);
        assert_eq!(pop.max_age(), 2);
        assert_eq!(pop.total(), 21.0);
        assert_eq!(pop.sex_total(Sex::Female), 15.0);
        assert_eq!(pop.total_in_ages(1, 2), 16.0);
        assert_eq!(pop.total_in_ages(2, 99), 9.0);
        assert_eq!(pop.total_in_ages(3, 5), 0.0);
    }

    #[test]
    fn test_check_ages_names_the_short_sex() {
        let pop: Population = SexPair::new(vec![1.0; 4], vec![1.0; 3]);
        assert!(SexPair::new(vec![0.0; 4], vec![0.0; 4]).check_ages("qx", 3).is_ok());
        match pop.check_ages("population", 3) {
            Err(ProjectionError::LengthMismatch { field, expected, actual }) => {
                assert_eq!(field, "population.female");
                assert_eq!((expected, actual), (4, 3));
            }
            other => panic!("expected length mismatch, got {:?}", other),
        }
    }
}
