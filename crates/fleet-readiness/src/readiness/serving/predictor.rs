use super::table::FeatureTable;
use crate::readiness::derivation::{probability_of_use, UsageSignals};

/// Capability of turning a feature table into one prediction per row.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, PredictorError>;

    /// Feature columns that must be present for `predict` to work.
    fn required_columns(&self) -> &[&'static str] {
        &[]
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictorError {
    #[error("feature column {0} is missing")]
    MissingColumn(String),
    #[error("row {row}: cannot read {column} value '{value}'")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
    #[error("model failure: {0}")]
    Model(String),
}

const RULE_COLUMNS: [&str; 6] = [
    "fitness_all_valid",
    "violates_critical_job",
    "cleaning_required",
    "cleaning_slot_booked",
    "wear_index",
    "manual_override_flag",
];

/// Baseline predictor that replays the probability-of-use rule on the
/// uploaded features. Any trained model can stand in behind [`Predictor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadinessRulePredictor;

impl Predictor for ReadinessRulePredictor {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, PredictorError> {
        let index = |name: &str| {
            features
                .column_index(name)
                .ok_or_else(|| PredictorError::MissingColumn(name.to_string()))
        };
        let fitness = index("fitness_all_valid")?;
        let critical = index("violates_critical_job")?;
        let cleaning_required = index("cleaning_required")?;
        let cleaning_booked = index("cleaning_slot_booked")?;
        let wear = index("wear_index")?;
        let manual_override = index("manual_override_flag")?;

        features
            .rows()
            .iter()
            .enumerate()
            .map(|(row_number, row)| {
                let flag = |column: usize| parse_flag(features, row_number, column, &row[column]);
                let cleaning_unbooked = flag(cleaning_required)? && !flag(cleaning_booked)?;
                let wear_index = parse_number(features, row_number, wear, &row[wear])?;

                Ok(probability_of_use(&UsageSignals {
                    fitness_all_valid: flag(fitness)?,
                    critical_job: flag(critical)?,
                    cleaning_unbooked,
                    wear_index: wear_index.clamp(0.0, 1.0),
                    manual_override: flag(manual_override)?,
                }))
            })
            .collect()
    }

    fn required_columns(&self) -> &[&'static str] {
        &RULE_COLUMNS
    }
}

fn invalid(features: &FeatureTable, row: usize, column: usize, value: &str) -> PredictorError {
    PredictorError::InvalidValue {
        column: features.columns()[column].clone(),
        row: row + 1,
        value: value.to_string(),
    }
}

fn parse_flag(
    features: &FeatureTable,
    row: usize,
    column: usize,
    value: &str,
) -> Result<bool, PredictorError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" => Ok(true),
        "false" | "0" | "0.0" | "no" => Ok(false),
        _ => Err(invalid(features, row, column, value)),
    }
}

fn parse_number(
    features: &FeatureTable,
    row: usize,
    column: usize,
    value: &str,
) -> Result<f64, PredictorError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(features, row, column, value))
}
