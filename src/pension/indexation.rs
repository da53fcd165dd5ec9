//! Two-component (basic + percentage) pension with wage-gap indexation
//!
//! The basic amount always equals a fixed share of the current average wage.
//! The percentage amount is indexed each year by pensioner inflation plus a
//! share of *effective* real wage growth. Negative real wage growth is not
//! passed on; it accumulates in a wage-gap ledger that later positive growth
//! must first erase before any of it reaches indexation.

use serde::{Deserialize, Serialize};

/// Average pension split into its two components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PensionComponents {
    pub basic_amount: f64,
    pub percentage_amount: f64,
    /// Amount paid: the component sum, or the minimum pension if higher
    pub total_pension: f64,
    pub minimum_applied: bool,
}

impl PensionComponents {
    /// Combine components and apply the minimum pension floor
    pub fn with_floor(basic_amount: f64, percentage_amount: f64, minimum_pension: f64) -> Self {
        let sum = basic_amount + percentage_amount;
        let minimum_applied = minimum_pension > sum;
        Self {
            basic_amount,
            percentage_amount,
            total_pension: if minimum_applied { minimum_pension } else { sum },
            minimum_applied,
        }
    }
}

/// Formula ratios and price indexation used by [`PensionIndexer`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexationRules {
    pub basic_amount_ratio: f64,
    pub percentage_amount_ratio: f64,
    pub real_wage_index_share: f64,
    pub minimum_pension_ratio: f64,
    pub pensioner_cpi: f64,
}

/// Split this year's real wage growth against the outstanding gap
///
/// Returns `(effective_growth, new_gap)`. Negative growth deepens the gap and
/// yields no effective growth; positive growth first fills the gap.
pub fn erase_wage_gap(gap: f64, real_wage_growth: f64) -> (f64, f64) {
    if real_wage_growth < 0.0 {
        return (0.0, gap + real_wage_growth);
    }
    let net = gap + real_wage_growth;
    (net.max(0.0), net.min(0.0))
}

/// One year's indexation outcome
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexationStep {
    pub components: PensionComponents,
    pub effective_growth: f64,
    pub cumulative_wage_gap: f64,
}

/// Year-over-year pension state
#[derive(Debug, Clone)]
pub struct PensionIndexer {
    rules: IndexationRules,
    components: PensionComponents,
    cumulative_wage_gap: f64,
}

impl PensionIndexer {
    /// Base-year components at the base average wage
    pub fn new(rules: IndexationRules, base_wage: f64) -> Self {
        let components = PensionComponents::with_floor(
            base_wage * rules.basic_amount_ratio,
            base_wage * rules.percentage_amount_ratio,
            base_wage * rules.minimum_pension_ratio,
        );
        Self {
            rules,
            components,
            cumulative_wage_gap: 0.0,
        }
    }

    pub fn components(&self) -> PensionComponents {
        self.components
    }

    pub fn cumulative_wage_gap(&self) -> f64 {
        self.cumulative_wage_gap
    }

    /// Advance one year given the new average wage and the real growth that
    /// produced it
    pub fn advance(&mut self, current_wage: f64, real_wage_growth: f64) -> IndexationStep {
        let (effective_growth, gap) = erase_wage_gap(self.cumulative_wage_gap, real_wage_growth);
        self.cumulative_wage_gap = gap;

        let basic = current_wage * self.rules.basic_amount_ratio;
        let percentage = self.components.percentage_amount
            * (1.0 + self.rules.pensioner_cpi + self.rules.real_wage_index_share * effective_growth);
        self.components =
            PensionComponents::with_floor(basic, percentage, current_wage * self.rules.minimum_pension_ratio);

        IndexationStep {
            components: self.components,
            effective_growth,
            cumulative_wage_gap: gap,
        }
    }
}
