//! Inverse solves for a balanced PAYG budget
//!
//! Each solver perturbs one input, holds the population snapshot fixed, and
//! re-runs the accounting kernel. Nothing here touches projection state.
//!
//! The retirement-age search assumes the balance does not fall as the
//! retirement age rises. With the accounting kernel as written that holds,
//! because only the pensioner count depends on the age. An evaluator whose
//! wage bill also depends on the retirement age could break it, in which case
//! the age returned is a balancing age but not necessarily the smallest one.

use super::payg::{calculate_required_rate, count_pensioners, LabourProfile, PaygAccounts, PaygInputs};
use crate::dataset::Population;
use crate::error::Result;
use crate::params::RetirementAgeBounds;
use crate::solver::{bisect, first_satisfying, Bisection, BisectionConfig};
use log::debug;
use serde::{Deserialize, Serialize};

/// Upper end of the pension ratio search
pub const MAX_PENSION_RATIO: f64 = 5.0;

/// One year's population and inputs, frozen for re-evaluation
///
/// Curve lengths are checked once on construction, so trial evaluations
/// cannot fail.
#[derive(Debug, Clone, Copy)]
pub struct PaygSnapshot<'a> {
    population: &'a Population,
    labour: &'a LabourProfile,
    pub inputs: PaygInputs,
}

impl<'a> PaygSnapshot<'a> {
    pub fn new(population: &'a Population, labour: &'a LabourProfile, inputs: PaygInputs) -> Result<Self> {
        let max_age = population.max_age();
        population.check_ages("population", max_age)?;
        labour.check_ages(max_age)?;
        Ok(Self { population, labour, inputs })
    }

    pub fn evaluate(&self) -> PaygAccounts {
        self.evaluate_with(self.inputs)
    }

    /// Re-run the kernel with trial inputs
    pub fn evaluate_with(&self, inputs: PaygInputs) -> PaygAccounts {
        PaygAccounts::evaluate_checked(self.population, self.labour, &inputs)
    }
}

/// Equilibrium values attached to a year point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    /// Smallest balancing retirement age within the bounds
    pub retirement_age: Option<u32>,
    /// Pension-to-average-wage ratio that balances at the current age
    pub pension_ratio: Option<f64>,
    /// Contribution rate covering current benefits
    pub contribution_rate: f64,
}

/// Smallest retirement age in `[min_age, max_age]` with a non-negative balance
///
/// Returns `min_age` if already balanced there and `None` if the budget is
/// still in deficit at `max_age`.
pub fn find_required_retirement_age(snapshot: &PaygSnapshot<'_>, min_age: u32, max_age: u32) -> Option<u32> {
    let age = first_satisfying(min_age, max_age, |age| {
        let trial = PaygInputs { retirement_age: age, ..snapshot.inputs };
        snapshot.evaluate_with(trial).balance >= 0.0
    });
    if age.is_none() {
        debug!("No balancing retirement age in {}..={}", min_age, max_age);
    }
    age
}

/// Pension ratio that balances the budget at the current retirement age
///
/// Zero when there are no pensioners; `None` when balance would need a ratio
/// above [`MAX_PENSION_RATIO`].
pub fn find_required_pension_ratio(snapshot: &PaygSnapshot<'_>) -> Option<f64> {
    let inputs = snapshot.inputs;
    if count_pensioners(snapshot.population, inputs.retirement_age) <= 0.0 {
        return Some(0.0);
    }

    let contributions = snapshot.evaluate().contributions;
    let config = BisectionConfig {
        value_tolerance: 1e-9 * contributions.abs().max(1.0),
        x_tolerance: 1e-12,
        max_iterations: 200,
    };
    let outcome = bisect(
        |ratio| {
            let trial = PaygInputs { average_pension: ratio * inputs.average_wage, ..inputs };
            snapshot.evaluate_with(trial).balance
        },
        0.0,
        MAX_PENSION_RATIO,
        config,
    );

    match outcome {
        Bisection::Root(root) => Some(root.x),
        Bisection::NoSignChange { .. } => {
            debug!("Balancing pension ratio exceeds {}", MAX_PENSION_RATIO);
            None
        }
    }
}

/// Contribution rate needed to cover current benefits (closed form)
pub fn find_required_contribution_rate(snapshot: &PaygSnapshot<'_>) -> f64 {
    let accounts = snapshot.evaluate();
    calculate_required_rate(accounts.benefits, accounts.wage_bill)
}

/// Run all three solves on one snapshot
pub fn solve_equilibrium(snapshot: &PaygSnapshot<'_>, bounds: RetirementAgeBounds) -> Equilibrium {
    Equilibrium {
        retirement_age: find_required_retirement_age(snapshot, bounds.min_age, bounds.max_age),
        pension_ratio: find_required_pension_ratio(snapshot),
        contribution_rate: find_required_contribution_rate(snapshot),
    }
}
