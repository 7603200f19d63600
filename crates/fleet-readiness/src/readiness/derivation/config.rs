use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Weights for the next-day unscheduled withdrawal draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRisk {
    pub base: f64,
    pub wear_weight: f64,
    pub fitness_violation_weight: f64,
    pub cap: f64,
}

impl Default for WithdrawalRisk {
    fn default() -> Self {
        Self {
            base: 0.02,
            wear_weight: 0.05,
            fitness_violation_weight: 0.1,
            cap: 0.9,
        }
    }
}

impl WithdrawalRisk {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("withdrawal_base", self.base),
            ("withdrawal_wear_weight", self.wear_weight),
            (
                "withdrawal_fitness_violation_weight",
                self.fitness_violation_weight,
            ),
            ("withdrawal_cap", self.cap),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        Ok(())
    }

    pub fn probability(&self, wear_index: f64, violates_fitness: bool) -> f64 {
        let fitness = if violates_fitness { 1.0 } else { 0.0 };
        let raw = self.base + self.wear_weight * wear_index + self.fitness_violation_weight * fitness;
        raw.min(self.cap)
    }
}
