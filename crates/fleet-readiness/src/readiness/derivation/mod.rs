mod config;
mod policy;
mod rules;

pub use config::WithdrawalRisk;
pub use policy::{InductionDecision, Recommendation};
pub use rules::{probability_of_use, wear_index, ReadinessFactor, ScoreAdjustment, UsageSignals};

use super::domain::{SignalBundle, SignalError};
use crate::config::ConfigError;
use policy::{decide_induction, DecisionSignals};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Turns one signal bundle into one derived record.
///
/// Everything except the withdrawal outcome is a closed-form function of the
/// bundle; the withdrawal is a Bernoulli draw on the caller's RNG.
#[derive(Debug, Clone, Default)]
pub struct DerivationEngine {
    withdrawal: WithdrawalRisk,
}

impl DerivationEngine {
    pub fn new(withdrawal: WithdrawalRisk) -> Result<Self, ConfigError> {
        withdrawal.validate()?;
        Ok(Self { withdrawal })
    }

    pub fn derive<R: Rng + ?Sized>(&self, signals: SignalBundle, rng: &mut R) -> DerivedRecord {
        let fitness_all_valid = signals.fitness_all_valid();
        let violates_mandatory_fitness = !fitness_all_valid;
        let violates_critical_job = signals.job_cards.critical;
        let wear_index = wear_index(signals.wear.odometer_total_km, signals.wear.km_last_30d);

        let rank_adjustments =
            rules::rank_adjustments(&signals, violates_mandatory_fitness, violates_critical_job);
        let rank_score = rules::rank_score(&rank_adjustments);

        let induction_decision = decide_induction(&DecisionSignals {
            manual_override: signals.ops.manual_override,
            violates_fitness: violates_mandatory_fitness,
            violates_critical_job,
            rank_score,
        });

        let withdrawal_probability = self
            .withdrawal
            .probability(wear_index, violates_mandatory_fitness);
        let unscheduled_withdrawal_within_24h = rng.gen::<f64>() < withdrawal_probability;

        let probability_of_use = probability_of_use(&UsageSignals {
            fitness_all_valid,
            critical_job: violates_critical_job,
            cleaning_unbooked: signals.cleaning.unbooked(),
            wear_index,
            manual_override: signals.ops.manual_override,
        });
        let recommendation = Recommendation::from_probability(probability_of_use);
        let final_score = rules::final_score(rank_score, probability_of_use);
        let expected_shunting_energy_cost =
            rules::shunting_energy_cost(signals.stabling.shunting_moves_needed);

        DerivedRecord {
            signals,
            fitness_all_valid,
            violates_mandatory_fitness,
            violates_critical_job,
            wear_index,
            expected_shunting_energy_cost,
            rank_score,
            rank_adjustments,
            induction_decision,
            withdrawal_probability,
            unscheduled_withdrawal_within_24h,
            probability_of_use,
            recommendation,
            final_score,
        }
    }

    /// Derive a bundle that arrived from outside the generator.
    pub fn derive_checked<R: Rng + ?Sized>(
        &self,
        signals: SignalBundle,
        rng: &mut R,
    ) -> Result<DerivedRecord, SignalError> {
        signals.validate()?;
        Ok(self.derive(signals, rng))
    }
}

/// Signals plus everything derived from them, before fleet ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    pub signals: SignalBundle,
    pub fitness_all_valid: bool,
    pub violates_mandatory_fitness: bool,
    pub violates_critical_job: bool,
    pub wear_index: f64,
    pub expected_shunting_energy_cost: f64,
    pub rank_score: f64,
    pub rank_adjustments: Vec<ScoreAdjustment>,
    pub induction_decision: InductionDecision,
    pub withdrawal_probability: f64,
    pub unscheduled_withdrawal_within_24h: bool,
    pub probability_of_use: f64,
    pub recommendation: Recommendation,
    pub final_score: f64,
}
