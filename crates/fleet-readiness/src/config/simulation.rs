use super::ConfigError;
use crate::readiness::derivation::WithdrawalRisk;
use crate::readiness::generator::SignalDistributions;
use serde::{Deserialize, Serialize};

/// Immutable description of a fleet simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub fleet_size: usize,
    pub nights: u32,
    pub depots: Vec<String>,
    pub vehicle_prefix: String,
    pub seed: Option<u64>,
    pub distributions: SignalDistributions,
    pub withdrawal: WithdrawalRisk,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fleet_size: 25,
            nights: 30,
            depots: vec!["Aluva".to_string(), "M.G.Road".to_string()],
            vehicle_prefix: "TS".to_string(),
            seed: None,
            distributions: SignalDistributions::default(),
            withdrawal: WithdrawalRisk::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fleet_size == 0 {
            return Err(ConfigError::EmptyFleet);
        }
        if self.nights == 0 {
            return Err(ConfigError::NoNights);
        }
        if self.depots.is_empty() || self.depots.iter().any(|depot| depot.trim().is_empty()) {
            return Err(ConfigError::NoDepots);
        }
        self.distributions.validate()?;
        self.withdrawal.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_simulation_is_valid() {
        SimulationConfig::default()
            .validate()
            .expect("defaults validate");
    }

    #[test]
    fn rejects_missing_depots_and_nights() {
        let no_depots = SimulationConfig {
            depots: vec![" ".to_string()],
            ..SimulationConfig::default()
        };
        assert!(matches!(no_depots.validate(), Err(ConfigError::NoDepots)));

        let no_nights = SimulationConfig {
            nights: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(no_nights.validate(), Err(ConfigError::NoNights)));
    }

    #[test]
    fn rejects_invalid_withdrawal_cap() {
        let config = SimulationConfig {
            withdrawal: WithdrawalRisk {
                cap: 1.5,
                ..WithdrawalRisk::default()
            },
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability { name: "withdrawal_cap", .. })
        ));
    }
}
