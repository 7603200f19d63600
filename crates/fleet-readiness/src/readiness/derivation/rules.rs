use super::super::domain::SignalBundle;
use super::super::generator::round_to;
use serde::{Deserialize, Serialize};

const FITNESS_VIOLATION_PENALTY: f64 = -10.0;
const CRITICAL_JOB_PENALTY: f64 = -8.0;
const UNBOOKED_CLEANING_PENALTY: f64 = -1.0;
const TARGET_MONTHLY_KM: f64 = 900.0;
const MILEAGE_DEVIATION_SCALE: f64 = 1500.0;
const SHUNTING_MOVE_PENALTY: f64 = 0.1;
const MANUAL_OVERRIDE_BONUS: f64 = 100.0;

const BASE_PROBABILITY: f64 = 0.9;
const FITNESS_PROBABILITY_PENALTY: f64 = 0.4;
const CRITICAL_JOB_PROBABILITY_PENALTY: f64 = 0.3;
const UNBOOKED_CLEANING_PROBABILITY_PENALTY: f64 = 0.1;
const WEAR_PROBABILITY_WEIGHT: f64 = 0.2;
const MANUAL_OVERRIDE_PROBABILITY_BONUS: f64 = 0.05;

const RANK_SCORE_WEIGHT: f64 = 0.7;
const PROBABILITY_WEIGHT: f64 = 0.3;
const SHUNTING_ENERGY_PER_MOVE: f64 = 0.5;

/// Signal families that move the rank score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessFactor {
    Fitness,
    CriticalJob,
    Cleaning,
    Mileage,
    Shunting,
    ManualOverride,
}

/// One additive contribution to the rank score, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAdjustment {
    pub factor: ReadinessFactor,
    pub delta: f64,
    pub notes: String,
}

/// The subset of signals the probability-of-use rule reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageSignals {
    pub fitness_all_valid: bool,
    pub critical_job: bool,
    pub cleaning_unbooked: bool,
    pub wear_index: f64,
    pub manual_override: bool,
}

/// Odometer and recent mileage folded into [0, 1].
///
/// Very low odometer readings push the raw formula below zero; those are
/// floored so downstream penalties never turn into bonuses.
pub fn wear_index(odometer_total_km: f64, km_last_30d: f64) -> f64 {
    let raw = 0.2 + (odometer_total_km - 300_000.0) / 1_000_000.0 + 0.3 * (km_last_30d / 2000.0);
    raw.clamp(0.0, 1.0)
}

pub(crate) fn rank_adjustments(
    bundle: &SignalBundle,
    violates_fitness: bool,
    violates_critical_job: bool,
) -> Vec<ScoreAdjustment> {
    let mut adjustments = Vec::new();

    if violates_fitness {
        adjustments.push(ScoreAdjustment {
            factor: ReadinessFactor::Fitness,
            delta: FITNESS_VIOLATION_PENALTY,
            notes: "one or more fitness certificates expired".to_string(),
        });
    }

    if violates_critical_job {
        adjustments.push(ScoreAdjustment {
            factor: ReadinessFactor::CriticalJob,
            delta: CRITICAL_JOB_PENALTY,
            notes: format!(
                "critical job card open ({} open in total)",
                bundle.job_cards.open_count
            ),
        });
    }

    if bundle.cleaning.unbooked() {
        adjustments.push(ScoreAdjustment {
            factor: ReadinessFactor::Cleaning,
            delta: UNBOOKED_CLEANING_PENALTY,
            notes: "cleaning required without a booked slot".to_string(),
        });
    }

    let km_last_30d = bundle.wear.km_last_30d;
    adjustments.push(ScoreAdjustment {
        factor: ReadinessFactor::Mileage,
        delta: -((km_last_30d - TARGET_MONTHLY_KM).abs() / MILEAGE_DEVIATION_SCALE),
        notes: format!("{km_last_30d:.1} km in 30 days against {TARGET_MONTHLY_KM:.0} km target"),
    });

    let moves = bundle.stabling.shunting_moves_needed;
    adjustments.push(ScoreAdjustment {
        factor: ReadinessFactor::Shunting,
        delta: -(moves as f64 * SHUNTING_MOVE_PENALTY),
        notes: format!("{moves} shunting move(s) to reach the departure slot"),
    });

    if bundle.ops.manual_override {
        adjustments.push(ScoreAdjustment {
            factor: ReadinessFactor::ManualOverride,
            delta: MANUAL_OVERRIDE_BONUS,
            notes: "manual override set by depot controller".to_string(),
        });
    }

    adjustments
}

pub(crate) fn rank_score(adjustments: &[ScoreAdjustment]) -> f64 {
    adjustments
        .iter()
        .fold(0.0, |score, adjustment| score + adjustment.delta)
}

/// Likelihood the vehicle is put into service, saturated to [0, 1].
pub fn probability_of_use(signals: &UsageSignals) -> f64 {
    let mut probability = BASE_PROBABILITY;
    if !signals.fitness_all_valid {
        probability -= FITNESS_PROBABILITY_PENALTY;
    }
    if signals.critical_job {
        probability -= CRITICAL_JOB_PROBABILITY_PENALTY;
    }
    if signals.cleaning_unbooked {
        probability -= UNBOOKED_CLEANING_PROBABILITY_PENALTY;
    }
    probability -= WEAR_PROBABILITY_WEIGHT * signals.wear_index;
    if signals.manual_override {
        probability += MANUAL_OVERRIDE_PROBABILITY_BONUS;
    }
    probability.clamp(0.0, 1.0)
}

pub(crate) fn final_score(rank_score: f64, probability_of_use: f64) -> f64 {
    round_to(
        RANK_SCORE_WEIGHT * rank_score + PROBABILITY_WEIGHT * (probability_of_use * 100.0),
        2,
    )
}

pub(crate) fn shunting_energy_cost(moves: u32) -> f64 {
    moves as f64 * SHUNTING_ENERGY_PER_MOVE
}
