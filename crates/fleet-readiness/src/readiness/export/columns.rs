/// Column order of every readiness export.
pub const EXPORT_COLUMNS: [&str; 40] = [
    "date",
    "depot",
    "vehicle_id",
    "rake_status_current",
    "fitness_rolling_stock_expiry",
    "fitness_signalling_expiry",
    "fitness_telecom_expiry",
    "fitness_all_valid",
    "open_job_cards_count",
    "critical_job_card_flag",
    "job_card_last_update",
    "branding_contract_id",
    "branding_min_exposure_hours",
    "branding_current_exposure_hours_last_7d",
    "branding_penalty_if_missed",
    "odometer_total_km",
    "km_last_7d",
    "km_last_30d",
    "wear_index",
    "cleaning_required",
    "cleaning_slot_booked",
    "cleaning_slot_time",
    "home_bay",
    "bay_proximity_score",
    "shunting_moves_needed",
    "crew_available_flag",
    "iot_temp_hvac_status",
    "telemetry_last_seen",
    "manual_override_flag",
    "message_update_count",
    "violates_mandatory_fitness",
    "violates_critical_job",
    "expected_shunting_energy_cost",
    "rank_score",
    "induction_decision",
    "unscheduled_withdrawal_within_24h",
    "probability_of_use",
    "recommendation",
    "probability_rank",
    "final_score",
];

/// Identity, target, and derived-target columns that must never reach a
/// predictor. Generation-side exports and the serving boundary both read
/// this list.
pub const EXCLUDED_FEATURE_COLUMNS: [&str; 7] = [
    "date",
    "vehicle_id",
    "probability_of_use",
    "final_score",
    "probability_rank",
    "recommendation",
    "rank_score",
];

/// Column appended by the serving boundary.
pub const PREDICTION_COLUMN: &str = "predicted_probability_of_use";

pub fn is_excluded_feature(column: &str) -> bool {
    EXCLUDED_FEATURE_COLUMNS.contains(&column)
}

/// Export columns a predictor may consume, in export order.
pub fn feature_columns() -> Vec<&'static str> {
    EXPORT_COLUMNS
        .into_iter()
        .filter(|column| !is_excluded_feature(column))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_excluded_column_is_exported() {
        for column in EXCLUDED_FEATURE_COLUMNS {
            assert!(EXPORT_COLUMNS.contains(&column), "{column} missing");
        }
    }

    #[test]
    fn features_are_exports_minus_exclusions() {
        let features = feature_columns();
        assert_eq!(
            features.len(),
            EXPORT_COLUMNS.len() - EXCLUDED_FEATURE_COLUMNS.len()
        );
        assert!(features.iter().all(|column| !is_excluded_feature(column)));
        assert_eq!(features.first(), Some(&"depot"));
        assert!(features.contains(&"wear_index"));
        assert!(!features.contains(&PREDICTION_COLUMN));
    }
}
