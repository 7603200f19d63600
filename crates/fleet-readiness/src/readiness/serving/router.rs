use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::{PredictionService, Predictor};

/// Router builder exposing the CSV prediction endpoint.
pub fn prediction_router<P>(service: Arc<PredictionService<P>>) -> Router
where
    P: Predictor + 'static,
{
    Router::new()
        .route("/api/v1/predict_csv", post(predict_csv_handler::<P>))
        .with_state(service)
}

pub(crate) async fn predict_csv_handler<P>(
    State(service): State<Arc<PredictionService<P>>>,
    body: Bytes,
) -> Response
where
    P: Predictor + 'static,
{
    match service.predict_csv(&body) {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime::TEXT_CSV.as_ref()),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=predictions.csv",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (error.status_code(), axum::Json(payload)).into_response()
        }
    }
}
