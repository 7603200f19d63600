use serde::{Deserialize, Serialize};

const STANDBY_RANK_THRESHOLD: f64 = -2.0;
const READY_PROBABILITY: f64 = 0.8;
const MAINTENANCE_PROBABILITY: f64 = 0.5;

/// Nightly disposition for a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InductionDecision {
    EnterService,
    Standby,
    HoldInIbl,
}

/// Planner-facing advice derived from probability of use alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Ready for service")]
    ReadyForService,
    #[serde(rename = "Schedule maintenance soon")]
    ScheduleMaintenanceSoon,
    #[serde(rename = "Hold for immediate inspection")]
    HoldForImmediateInspection,
}

impl Recommendation {
    pub fn from_probability(probability_of_use: f64) -> Self {
        if probability_of_use >= READY_PROBABILITY {
            Self::ReadyForService
        } else if probability_of_use >= MAINTENANCE_PROBABILITY {
            Self::ScheduleMaintenanceSoon
        } else {
            Self::HoldForImmediateInspection
        }
    }
}

pub(crate) struct DecisionSignals {
    pub manual_override: bool,
    pub violates_fitness: bool,
    pub violates_critical_job: bool,
    pub rank_score: f64,
}

/// First matching rule wins; the override short-circuits every penalty.
pub(crate) fn decide_induction(signals: &DecisionSignals) -> InductionDecision {
    if signals.manual_override {
        return InductionDecision::EnterService;
    }

    if signals.violates_fitness || signals.violates_critical_job {
        return InductionDecision::HoldInIbl;
    }

    if signals.rank_score < STANDBY_RANK_THRESHOLD {
        return InductionDecision::Standby;
    }

    InductionDecision::EnterService
}
