//! Serving boundary: strip non-feature columns from an uploaded export, ask a
//! predictor for probability of use, and hand the augmented table back.

mod predictor;
pub mod router;
mod table;

pub use predictor::{Predictor, PredictorError, ReadinessRulePredictor};
pub use router::prediction_router;
pub use table::FeatureTable;

use super::export::{is_excluded_feature, PREDICTION_COLUMN};
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs uploads through a predictor, all or nothing.
pub struct PredictionService<P> {
    predictor: Arc<P>,
}

impl<P> Clone for PredictionService<P> {
    fn clone(&self) -> Self {
        Self {
            predictor: Arc::clone(&self.predictor),
        }
    }
}

impl<P> PredictionService<P>
where
    P: Predictor + 'static,
{
    pub fn new(predictor: Arc<P>) -> Self {
        Self { predictor }
    }

    /// Predict every row of a CSV upload and return the augmented CSV.
    pub fn predict_csv(&self, upload: &[u8]) -> Result<Vec<u8>, ServingError> {
        let mut table = FeatureTable::from_csv(upload)?;
        let predictions = self.predict_table(&table)?;

        let replaced = table.replace_non_finite();
        let values = predictions
            .into_iter()
            .map(|prediction| {
                if prediction.is_finite() {
                    format_prediction(prediction)
                } else {
                    "0.0".to_string()
                }
            })
            .collect();
        table.push_column(PREDICTION_COLUMN, values);

        info!(
            rows = table.len(),
            non_finite_replaced = replaced,
            "prediction upload processed"
        );
        table.to_csv()
    }

    /// Predictions for `table`, one per row, after the feature contract is
    /// enforced.
    pub fn predict_table(&self, table: &FeatureTable) -> Result<Vec<f64>, ServingError> {
        if table.column_index(PREDICTION_COLUMN).is_some() {
            return Err(ServingError::AlreadyPredicted);
        }

        let features = table.without_columns(is_excluded_feature);
        let missing: Vec<String> = self
            .predictor
            .required_columns()
            .iter()
            .filter(|column| features.column_index(column).is_none())
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ServingError::MissingFeatures(missing));
        }

        let predictions = self.predictor.predict(&features).map_err(|err| {
            warn!(error = %err, "predictor rejected upload");
            ServingError::Predictor(err)
        })?;

        if predictions.len() != table.len() {
            return Err(ServingError::PredictionCountMismatch {
                expected: table.len(),
                actual: predictions.len(),
            });
        }

        Ok(predictions)
    }
}

fn format_prediction(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServingError {
    #[error("upload is empty or has no header row")]
    EmptyUpload,
    #[error("column {0} appears more than once")]
    DuplicateColumn(String),
    #[error("upload already carries a predicted_probability_of_use column")]
    AlreadyPredicted,
    #[error("upload is missing feature columns: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),
    #[error("invalid CSV upload: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Predictor(PredictorError),
    #[error("predictor returned {actual} values for {expected} rows")]
    PredictionCountMismatch { expected: usize, actual: usize },
    #[error("failed to encode predictions: {0}")]
    Encoding(String),
}

impl ServingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServingError::EmptyUpload | ServingError::Csv(_) => StatusCode::BAD_REQUEST,
            ServingError::DuplicateColumn(_)
            | ServingError::AlreadyPredicted
            | ServingError::MissingFeatures(_)
            | ServingError::Predictor(PredictorError::MissingColumn(_))
            | ServingError::Predictor(PredictorError::InvalidValue { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServingError::Predictor(PredictorError::Model(_))
            | ServingError::PredictionCountMismatch { .. }
            | ServingError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
