//! PAYG accounting, pension indexation and equilibrium solves

mod payg;
mod indexation;
mod equilibrium;

pub use payg::{
    average_wage_at, calculate_balance, calculate_benefits, calculate_contributions,
    calculate_dependency_ratio, calculate_required_rate, calculate_wage_bill, count_pensioners,
    count_workers, employment_multiplier, safe_ratio, LabourProfile, PaygAccounts, PaygInputs,
};
pub use indexation::{erase_wage_gap, IndexationRules, IndexationStep, PensionComponents, PensionIndexer};
pub use equilibrium::{
    find_required_contribution_rate, find_required_pension_ratio, find_required_retirement_age,
    solve_equilibrium, Equilibrium, PaygSnapshot, MAX_PENSION_RATIO,
};
