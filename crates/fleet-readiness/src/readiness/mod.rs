//! Nightly fleet readiness: signal generation, derivation, ranking, and the
//! tabular/serving contracts that sit around them.

pub mod derivation;
pub mod domain;
pub mod export;
pub mod generator;
pub mod ranking;
pub mod serving;
pub mod simulation;
pub mod store;

pub use derivation::{DerivationEngine, DerivedRecord, InductionDecision, Recommendation};
pub use domain::{SignalBundle, SignalError, VehicleId};
pub use generator::{SignalDistributions, SignalGenerator};
pub use ranking::{FleetRanker, RankedRecord};
pub use serving::{
    prediction_router, FeatureTable, PredictionService, Predictor, PredictorError,
    ReadinessRulePredictor, ServingError,
};
pub use simulation::{FleetSimulator, SimulationError, SimulationSummary};
pub use store::{InMemoryRecordStore, RecordStore, StoreError};
