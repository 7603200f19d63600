use chrono::{Duration, NaiveDate};
use fleet_readiness::config::SimulationConfig;
use fleet_readiness::readiness::domain::{
    CleaningState, FitnessCertificates, FitnessSubsystem, JobCardBacklog, OperationalSignals,
    RakeStatus, StablingGeometry, WearProxy,
};
use fleet_readiness::readiness::export::{read_rows, write_records, EXPORT_COLUMNS};
use fleet_readiness::readiness::{
    DerivationEngine, FleetSimulator, InMemoryRecordStore, InductionDecision, RankedRecord,
    Recommendation, RecordStore, SignalBundle, VehicleId,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid start date")
}

fn seeded_run(fleet_size: usize, nights: u32, seed: u64) -> Vec<RankedRecord> {
    let simulator = FleetSimulator::new(SimulationConfig {
        fleet_size,
        nights,
        seed: Some(seed),
        ..SimulationConfig::default()
    })
    .expect("valid simulation config");
    let store = InMemoryRecordStore::default();
    simulator.run(start_date(), &store).expect("run succeeds");
    store.records().expect("records readable")
}

fn by_night(records: &[RankedRecord]) -> BTreeMap<NaiveDate, Vec<&RankedRecord>> {
    let mut nights: BTreeMap<NaiveDate, Vec<&RankedRecord>> = BTreeMap::new();
    for ranked in records {
        nights
            .entry(ranked.record.signals.date)
            .or_default()
            .push(ranked);
    }
    nights
}

#[test]
fn fitness_flags_agree_with_certificates() {
    let records = seeded_run(25, 10, 7);
    assert_eq!(records.len(), 250);

    for ranked in &records {
        let record = &ranked.record;
        let each_valid = FitnessSubsystem::ordered()
            .into_iter()
            .all(|subsystem| record.signals.fitness_valid(subsystem));
        assert_eq!(record.fitness_all_valid, each_valid);
        assert_eq!(record.violates_mandatory_fitness, !record.fitness_all_valid);
        assert_eq!(record.violates_critical_job, record.signals.job_cards.critical);
    }
}

#[test]
fn derived_values_stay_in_bounds() {
    for ranked in seeded_run(25, 10, 8) {
        let record = ranked.record;
        assert!((0.0..=1.0).contains(&record.wear_index));
        assert!((0.0..=1.0).contains(&record.probability_of_use));
        assert!((0.0..=1.0).contains(&record.withdrawal_probability));
        assert_eq!(
            record.recommendation,
            Recommendation::from_probability(record.probability_of_use)
        );
    }
}

#[test]
fn induction_policy_respects_priority() {
    for ranked in seeded_run(25, 20, 9) {
        let record = ranked.record;
        if record.signals.ops.manual_override {
            assert_eq!(record.induction_decision, InductionDecision::EnterService);
        } else if record.violates_mandatory_fitness || record.violates_critical_job {
            assert_eq!(record.induction_decision, InductionDecision::HoldInIbl);
        } else if record.rank_score < -2.0 {
            assert_eq!(record.induction_decision, InductionDecision::Standby);
        } else {
            assert_eq!(record.induction_decision, InductionDecision::EnterService);
        }
    }
}

#[test]
fn ranks_form_a_permutation_ordered_by_probability() {
    let records = seeded_run(25, 5, 10);
    for (date, night) in by_night(&records) {
        let mut ranks: Vec<u32> = night.iter().map(|ranked| ranked.probability_rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=25).collect::<Vec<u32>>(), "night {date}");

        for pair in night.windows(2) {
            assert!(pair[0].probability_rank < pair[1].probability_rank);
            assert!(
                pair[0].record.probability_of_use >= pair[1].record.probability_of_use,
                "night {date} is not ordered by probability"
            );
        }
    }
}

#[test]
fn identical_seed_reproduces_run() {
    assert_eq!(seeded_run(12, 4, 31), seeded_run(12, 4, 31));
    assert_ne!(seeded_run(12, 4, 31), seeded_run(12, 4, 32));
}

#[test]
fn parallel_run_matches_sequential_run() {
    let simulator = FleetSimulator::new(SimulationConfig {
        fleet_size: 15,
        nights: 6,
        seed: Some(44),
        ..SimulationConfig::default()
    })
    .expect("valid simulation config");

    let sequential = InMemoryRecordStore::default();
    let parallel = InMemoryRecordStore::default();
    let sequential_summary = simulator.run(start_date(), &sequential).expect("runs");
    let parallel_summary = simulator
        .run_parallel(start_date(), &parallel)
        .expect("runs");

    assert_eq!(sequential_summary, parallel_summary);
    assert_eq!(
        sequential.records().expect("records"),
        parallel.records().expect("records")
    );
    assert_eq!(
        sequential_summary.enter_service + sequential_summary.standby + sequential_summary.hold_in_ibl,
        90
    );
}

#[test]
fn export_round_trip_preserves_rows() {
    let records = seeded_run(10, 3, 12);
    let mut buffer = Vec::new();
    let written = write_records(&mut buffer, &records).expect("export succeeds");
    assert_eq!(written, 30);

    let header = std::str::from_utf8(&buffer)
        .expect("utf8")
        .lines()
        .next()
        .expect("header")
        .to_string();
    assert_eq!(header, EXPORT_COLUMNS.join(","));

    let rows = read_rows(buffer.as_slice()).expect("parses back");
    assert_eq!(rows.len(), records.len());
    for (row, ranked) in rows.iter().zip(&records) {
        assert_eq!(row.vehicle_id, ranked.record.signals.vehicle_id.as_str());
        assert_eq!(row.date, ranked.record.signals.date);
        assert_eq!(row.probability_rank, ranked.probability_rank);
        assert_eq!(row.induction_decision, ranked.record.induction_decision);
        assert_eq!(row.final_score, ranked.record.final_score);
        assert!((row.probability_of_use - ranked.record.probability_of_use).abs() <= 0.0005);
    }
}

fn fit_bundle(km_last_30d: f64, shunting_moves_needed: u32) -> SignalBundle {
    let date = NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid date");
    let midnight = date.and_hms_opt(0, 0, 0).expect("valid midnight");
    SignalBundle {
        date,
        vehicle_id: VehicleId::numbered("TS", 4),
        depot: "M.G.Road".to_string(),
        rake_status: RakeStatus::Stabled,
        certificates: FitnessCertificates {
            rolling_stock_expiry: date + Duration::days(3),
            signalling_expiry: date + Duration::days(3),
            telecom_expiry: date + Duration::days(3),
        },
        job_cards: JobCardBacklog {
            open_count: 1,
            critical: false,
            last_update: midnight - Duration::hours(12),
        },
        branding: None,
        cleaning: CleaningState {
            required: false,
            slot_booked: false,
            slot_time: None,
        },
        // odometer low enough that the wear index floors at zero
        wear: WearProxy {
            odometer_total_km: 5_000.0,
            km_last_7d: 150.0,
            km_last_30d,
        },
        stabling: StablingGeometry {
            home_bay: 2,
            bay_proximity_score: 0.4,
            shunting_moves_needed,
        },
        ops: OperationalSignals {
            crew_available: true,
            manual_override: false,
            hvac_temp_c: 23.0,
            telemetry_last_seen: midnight - Duration::minutes(30),
            message_update_count: 1,
        },
    }
}

#[test]
fn fit_vehicle_scores_only_mileage_and_shunting() {
    let engine = DerivationEngine::default();
    let mut rng = StdRng::seed_from_u64(5);

    let record = engine
        .derive_checked(fit_bundle(600.0, 3), &mut rng)
        .expect("valid bundle");
    assert_eq!(record.wear_index, 0.0);
    let expected_rank = -(300.0 / 1500.0) - 3.0 * 0.1;
    assert!((record.rank_score - expected_rank).abs() < 1e-9);
    assert!((record.probability_of_use - 0.9).abs() < 1e-12);
    assert_eq!(record.recommendation, Recommendation::ReadyForService);
    assert_eq!(record.induction_decision, InductionDecision::EnterService);

    let far_off = engine
        .derive_checked(fit_bundle(4200.0, 0), &mut rng)
        .expect("valid bundle");
    assert!(far_off.rank_score < -2.0);
    assert_eq!(far_off.induction_decision, InductionDecision::Standby);
}

#[test]
fn checked_derivation_rejects_corrupt_bundles() {
    let mut bundle = fit_bundle(900.0, 0);
    bundle.wear.km_last_30d = f64::NAN;

    let mut rng = StdRng::seed_from_u64(1);
    assert!(DerivationEngine::default()
        .derive_checked(bundle, &mut rng)
        .is_err());
}
