use crate::readiness::derivation::{InductionDecision, Recommendation};
use crate::readiness::domain::RakeStatus;
use crate::readiness::generator::round_to;
use crate::readiness::ranking::RankedRecord;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One flat export row; field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub depot: String,
    pub vehicle_id: String,
    pub rake_status_current: RakeStatus,
    pub fitness_rolling_stock_expiry: NaiveDate,
    pub fitness_signalling_expiry: NaiveDate,
    pub fitness_telecom_expiry: NaiveDate,
    pub fitness_all_valid: bool,
    pub open_job_cards_count: u32,
    pub critical_job_card_flag: bool,
    pub job_card_last_update: NaiveDateTime,
    pub branding_contract_id: Option<String>,
    pub branding_min_exposure_hours: u32,
    pub branding_current_exposure_hours_last_7d: f64,
    pub branding_penalty_if_missed: f64,
    pub odometer_total_km: f64,
    pub km_last_7d: f64,
    pub km_last_30d: f64,
    pub wear_index: f64,
    pub cleaning_required: bool,
    pub cleaning_slot_booked: bool,
    pub cleaning_slot_time: Option<String>,
    pub home_bay: u8,
    pub bay_proximity_score: f64,
    pub shunting_moves_needed: u32,
    pub crew_available_flag: bool,
    pub iot_temp_hvac_status: f64,
    pub telemetry_last_seen: NaiveDateTime,
    pub manual_override_flag: bool,
    pub message_update_count: u32,
    pub violates_mandatory_fitness: bool,
    pub violates_critical_job: bool,
    pub expected_shunting_energy_cost: f64,
    pub rank_score: f64,
    pub induction_decision: InductionDecision,
    pub unscheduled_withdrawal_within_24h: bool,
    pub probability_of_use: f64,
    pub recommendation: Recommendation,
    pub probability_rank: u32,
    pub final_score: f64,
}

impl From<&RankedRecord> for ExportRow {
    fn from(ranked: &RankedRecord) -> Self {
        let record = &ranked.record;
        let signals = &record.signals;
        let branding = signals.branding.as_ref();

        Self {
            date: signals.date,
            depot: signals.depot.clone(),
            vehicle_id: signals.vehicle_id.to_string(),
            rake_status_current: signals.rake_status,
            fitness_rolling_stock_expiry: signals.certificates.rolling_stock_expiry,
            fitness_signalling_expiry: signals.certificates.signalling_expiry,
            fitness_telecom_expiry: signals.certificates.telecom_expiry,
            fitness_all_valid: record.fitness_all_valid,
            open_job_cards_count: signals.job_cards.open_count,
            critical_job_card_flag: signals.job_cards.critical,
            job_card_last_update: signals.job_cards.last_update,
            branding_contract_id: branding.map(|contract| contract.contract_id.clone()),
            branding_min_exposure_hours: branding
                .map(|contract| contract.min_exposure_hours)
                .unwrap_or(0),
            branding_current_exposure_hours_last_7d: branding
                .map(|contract| round_to(contract.current_exposure_hours, 1))
                .unwrap_or(0.0),
            branding_penalty_if_missed: branding
                .map(|contract| round_to(contract.penalty_if_missed, 2))
                .unwrap_or(0.0),
            odometer_total_km: round_to(signals.wear.odometer_total_km, 1),
            km_last_7d: round_to(signals.wear.km_last_7d, 1),
            km_last_30d: round_to(signals.wear.km_last_30d, 1),
            wear_index: round_to(record.wear_index, 3),
            cleaning_required: signals.cleaning.required,
            cleaning_slot_booked: signals.cleaning.slot_booked,
            cleaning_slot_time: signals.cleaning.slot_time.clone(),
            home_bay: signals.stabling.home_bay,
            bay_proximity_score: signals.stabling.bay_proximity_score,
            shunting_moves_needed: signals.stabling.shunting_moves_needed,
            crew_available_flag: signals.ops.crew_available,
            iot_temp_hvac_status: signals.ops.hvac_temp_c,
            telemetry_last_seen: signals.ops.telemetry_last_seen,
            manual_override_flag: signals.ops.manual_override,
            message_update_count: signals.ops.message_update_count,
            violates_mandatory_fitness: record.violates_mandatory_fitness,
            violates_critical_job: record.violates_critical_job,
            expected_shunting_energy_cost: round_to(record.expected_shunting_energy_cost, 2),
            rank_score: round_to(record.rank_score, 2),
            induction_decision: record.induction_decision,
            unscheduled_withdrawal_within_24h: record.unscheduled_withdrawal_within_24h,
            probability_of_use: round_to(record.probability_of_use, 3),
            recommendation: record.recommendation,
            probability_rank: ranked.probability_rank,
            final_score: record.final_score,
        }
    }
}
