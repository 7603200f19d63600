use super::derivation::{DerivationEngine, InductionDecision};
use super::domain::VehicleId;
use super::generator::SignalGenerator;
use super::ranking::{FleetRanker, RankedRecord};
use super::store::{RecordStore, StoreError};
use crate::config::{ConfigError, SimulationConfig};
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// Drives generation, derivation, and ranking night by night.
#[derive(Debug, Clone)]
pub struct FleetSimulator {
    config: SimulationConfig,
    generator: SignalGenerator,
    engine: DerivationEngine,
    ranker: FleetRanker,
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub start_date: NaiveDate,
    pub nights: u32,
    pub records: usize,
    pub enter_service: usize,
    pub standby: usize,
    pub hold_in_ibl: usize,
    pub unscheduled_withdrawals: usize,
}

impl FleetSimulator {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = SignalGenerator::new(config.distributions.clone())?;
        let engine = DerivationEngine::new(config.withdrawal)?;

        Ok(Self {
            config,
            generator,
            engine,
            ranker: FleetRanker,
        })
    }

    pub fn vehicles(&self) -> Vec<VehicleId> {
        (1..=self.config.fleet_size)
            .map(|number| VehicleId::numbered(&self.config.vehicle_prefix, number))
            .collect()
    }

    /// Generate and derive every vehicle for `date`, then rank the night.
    pub fn simulate_night<R: Rng + ?Sized>(&self, date: NaiveDate, rng: &mut R) -> Vec<RankedRecord> {
        let derived = self
            .vehicles()
            .into_iter()
            .map(|vehicle_id| {
                let depot = self
                    .config
                    .depots
                    .choose(rng)
                    .map(String::as_str)
                    .unwrap_or_default();
                let signals = self.generator.generate(rng, date, vehicle_id, depot);
                self.engine.derive(signals, rng)
            })
            .collect::<Vec<_>>();

        let ranked = self.ranker.rank(derived);
        debug!(%date, vehicles = ranked.len(), "night ranked");
        ranked
    }

    /// Date of the final night when the run starts on `start_date`.
    pub fn last_night(&self, start_date: NaiveDate) -> Result<NaiveDate, ConfigError> {
        let span = u64::from(self.config.nights.saturating_sub(1));
        start_date
            .checked_add_days(Days::new(span))
            .ok_or(ConfigError::NightWindowOutOfRange {
                nights: self.config.nights,
            })
    }

    /// Run every configured night sequentially into `store`.
    pub fn run<S: RecordStore + ?Sized>(
        &self,
        start_date: NaiveDate,
        store: &S,
    ) -> Result<SimulationSummary, SimulationError> {
        self.last_night(start_date)?;
        let seed = self.resolve_seed();
        let nights = (0..self.config.nights)
            .map(|index| self.night_at(seed, start_date, index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.persist(seed, start_date, nights, store)?)
    }

    /// Same output as [`FleetSimulator::run`], with nights generated on the
    /// rayon pool before the store sees them in date order.
    pub fn run_parallel<S: RecordStore + ?Sized>(
        &self,
        start_date: NaiveDate,
        store: &S,
    ) -> Result<SimulationSummary, SimulationError> {
        self.last_night(start_date)?;
        let seed = self.resolve_seed();
        let nights = (0..self.config.nights)
            .into_par_iter()
            .map(|index| self.night_at(seed, start_date, index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.persist(seed, start_date, nights, store)?)
    }

    fn resolve_seed(&self) -> u64 {
        self.config.seed.unwrap_or_else(rand::random)
    }

    fn night_at(
        &self,
        seed: u64,
        start_date: NaiveDate,
        index: u32,
    ) -> Result<(NaiveDate, Vec<RankedRecord>), ConfigError> {
        let date = start_date
            .checked_add_days(Days::new(u64::from(index)))
            .ok_or(ConfigError::NightWindowOutOfRange {
                nights: self.config.nights,
            })?;
        let mut rng = night_rng(seed, index);
        Ok((date, self.simulate_night(date, &mut rng)))
    }

    fn persist<S: RecordStore + ?Sized>(
        &self,
        seed: u64,
        start_date: NaiveDate,
        nights: Vec<(NaiveDate, Vec<RankedRecord>)>,
        store: &S,
    ) -> Result<SimulationSummary, StoreError> {
        let mut summary = SimulationSummary {
            seed,
            start_date,
            nights: self.config.nights,
            records: 0,
            enter_service: 0,
            standby: 0,
            hold_in_ibl: 0,
            unscheduled_withdrawals: 0,
        };

        for (date, records) in nights {
            for ranked in &records {
                summary.records += 1;
                match ranked.record.induction_decision {
                    InductionDecision::EnterService => summary.enter_service += 1,
                    InductionDecision::Standby => summary.standby += 1,
                    InductionDecision::HoldInIbl => summary.hold_in_ibl += 1,
                }
                if ranked.record.unscheduled_withdrawal_within_24h {
                    summary.unscheduled_withdrawals += 1;
                }
            }
            store.append_night(date, records)?;
        }

        info!(
            seed,
            nights = summary.nights,
            records = summary.records,
            enter_service = summary.enter_service,
            standby = summary.standby,
            hold_in_ibl = summary.hold_in_ibl,
            "fleet simulation complete"
        );
        Ok(summary)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Independent stream per night so nights can be produced in any order.
pub fn night_rng(seed: u64, night_index: u32) -> StdRng {
    let stream = u64::from(night_index)
        .wrapping_add(1)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(seed ^ stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readiness::store::InMemoryRecordStore;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date")
    }

    fn simulator(fleet_size: usize, nights: u32) -> FleetSimulator {
        FleetSimulator::new(SimulationConfig {
            fleet_size,
            nights,
            seed: Some(17),
            ..SimulationConfig::default()
        })
        .expect("valid simulation config")
    }

    #[test]
    fn night_contains_every_vehicle_once_with_permuted_ranks() {
        let simulator = simulator(25, 1);
        let ranked = simulator.simulate_night(start(), &mut night_rng(17, 0));

        assert_eq!(ranked.len(), 25);
        let mut ranks: Vec<u32> = ranked.iter().map(|r| r.probability_rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=25).collect::<Vec<_>>());

        let mut vehicles: Vec<String> = ranked
            .iter()
            .map(|r| r.record.signals.vehicle_id.to_string())
            .collect();
        vehicles.sort();
        vehicles.dedup();
        assert_eq!(vehicles.len(), 25);

        for pair in ranked.windows(2) {
            assert!(pair[0].record.probability_of_use >= pair[1].record.probability_of_use);
        }
        assert!(ranked.iter().all(|r| {
            r.record.signals.depot == "Aluva" || r.record.signals.depot == "M.G.Road"
        }));
    }

    #[test]
    fn sequential_and_parallel_runs_agree() {
        let simulator = simulator(8, 5);
        let sequential = InMemoryRecordStore::default();
        let parallel = InMemoryRecordStore::default();

        let first = simulator.run(start(), &sequential).expect("sequential run");
        let second = simulator
            .run_parallel(start(), &parallel)
            .expect("parallel run");

        assert_eq!(first, second);
        assert_eq!(first.records, 40);
        assert_eq!(
            first.enter_service + first.standby + first.hold_in_ibl,
            first.records
        );
        assert_eq!(
            sequential.records().expect("readable"),
            parallel.records().expect("readable")
        );
    }

    #[test]
    fn nights_are_consecutive_and_ranked_independently() {
        let simulator = simulator(5, 3);
        let store = InMemoryRecordStore::default();
        simulator.run(start(), &store).expect("run completes");

        for offset in 0..3 {
            let date = start() + chrono::Duration::days(offset);
            let night = store.night(date).expect("readable").expect("night stored");
            assert_eq!(night.len(), 5);
            assert_eq!(night[0].probability_rank, 1);
            assert!(night.iter().all(|r| r.record.signals.date == date));
        }
    }

    #[test]
    fn rejects_invalid_configuration() {
        let error = FleetSimulator::new(SimulationConfig {
            fleet_size: 0,
            ..SimulationConfig::default()
        })
        .expect_err("empty fleet rejected");
        assert!(matches!(error, ConfigError::EmptyFleet));
    }

    #[test]
    fn window_past_calendar_end_is_rejected_before_simulating() {
        let simulator = simulator(3, 10);
        let store = InMemoryRecordStore::default();
        let near_end = NaiveDate::MAX - chrono::Duration::days(4);

        assert!(matches!(
            simulator.last_night(near_end),
            Err(ConfigError::NightWindowOutOfRange { nights: 10 })
        ));
        assert!(matches!(
            simulator.run(near_end, &store),
            Err(SimulationError::Config(ConfigError::NightWindowOutOfRange { .. }))
        ));
        assert!(matches!(
            simulator.run_parallel(near_end, &store),
            Err(SimulationError::Config(ConfigError::NightWindowOutOfRange { .. }))
        ));
        assert!(store.records().expect("readable").is_empty());

        let fits = NaiveDate::MAX - chrono::Duration::days(9);
        assert!(matches!(simulator.last_night(fits), Ok(date) if date == NaiveDate::MAX));
    }

    #[test]
    fn night_streams_differ() {
        let a: u64 = night_rng(5, 0).gen();
        let b: u64 = night_rng(5, 1).gen();
        assert_ne!(a, b);
    }
}
