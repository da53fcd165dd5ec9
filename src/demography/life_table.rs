//! Period life tables from central death rates
//!
//! Ages run `0..=max_age`; the last age is an open interval whose person-years
//! are `lx / mx` (or `lx` when the hazard there is zero).

/// Survivors at age 0 of the synthetic cohort
pub const LIFE_TABLE_RADIX: f64 = 100_000.0;

/// Annual death probability from a hazard: `qx = 1 - exp(-mx)`
pub fn death_probability(mx: f64) -> f64 {
    if mx <= 0.0 {
        return 0.0;
    }
    (1.0 - (-mx).exp()).clamp(0.0, 1.0)
}

/// Death probabilities for a whole hazard curve
pub fn death_probabilities(mx: &[f64]) -> Vec<f64> {
    mx.iter().map(|&m| death_probability(m)).collect()
}

/// Complete single-year life table
#[derive(Debug, Clone)]
pub struct LifeTable {
    pub mx: Vec<f64>,
    pub qx: Vec<f64>,
    pub lx: Vec<f64>,
    /// Person-years lived in each age interval
    pub big_lx: Vec<f64>,
    /// Person-years remaining from each age
    pub tx: Vec<f64>,
    /// Remaining life expectancy at each age
    pub ex: Vec<f64>,
}

impl LifeTable {
    /// Build a life table from hazards `mx[0..=max_age]`
    pub fn from_hazards(mx: &[f64]) -> Self {
        let n = mx.len();
        let qx = death_probabilities(mx);

        let mut lx = vec![0.0; n];
        if n > 0 {
            lx[0] = LIFE_TABLE_RADIX;
        }
        for age in 1..n {
            lx[age] = lx[age - 1] * (1.0 - qx[age - 1]);
        }

        let mut big_lx = vec![0.0; n];
        for age in 0..n.saturating_sub(1) {
            big_lx[age] = 0.5 * (lx[age] + lx[age + 1]);
        }
        if let Some(last) = n.checked_sub(1) {
            big_lx[last] = if mx[last] > 0.0 { lx[last] / mx[last] } else { lx[last] };
        }

        let mut tx = vec![0.0; n];
        let mut running = 0.0;
        for age in (0..n).rev() {
            running += big_lx[age];
            tx[age] = running;
        }

        let ex = tx
            .iter()
            .zip(&lx)
            .map(|(&t, &l)| if l > 0.0 { t / l } else { 0.0 })
            .collect();

        Self {
            mx: mx.to_vec(),
            qx,
            lx,
            big_lx,
            tx,
            ex,
        }
    }

    /// Life expectancy at birth
    pub fn e0(&self) -> f64 {
        self.tx.first().map(|t| t / LIFE_TABLE_RADIX).unwrap_or(0.0)
    }

    /// Remaining life expectancy at `age` (0 beyond the table)
    pub fn life_expectancy_at(&self, age: usize) -> f64 {
        self.ex.get(age).copied().unwrap_or(0.0)
    }
}

/// Life expectancy at birth for a hazard curve
pub fn life_expectancy(mx: &[f64]) -> f64 {
    LifeTable::from_hazards(mx).e0()
}
