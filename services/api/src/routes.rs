use crate::infra::{
    default_start_date, deserialize_optional_date, simulate, AppState, SimulationOverrides,
};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use fleet_readiness::error::AppError;
use fleet_readiness::readiness::export::write_records;
use fleet_readiness::readiness::{prediction_router, PredictionService, Predictor};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Largest nights x fleet_size a single HTTP simulation may produce.
pub(crate) const MAX_SIMULATED_RECORDS: u64 = 200_000;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SimulateRequest {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) start_date: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) nights: Option<u32>,
    #[serde(default)]
    pub(crate) fleet_size: Option<usize>,
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

pub(crate) fn with_fleet_routes<P>(service: Arc<PredictionService<P>>) -> axum::Router
where
    P: Predictor + 'static,
{
    prediction_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/fleet/simulate",
            axum::routing::post(simulate_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn simulate_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<SimulateRequest>,
) -> Result<Response, AppError> {
    let SimulateRequest {
        start_date,
        nights,
        fleet_size,
        seed,
    } = payload;

    let config = SimulationOverrides {
        nights,
        fleet_size,
        seed,
    }
    .apply(&state.simulation);
    config.validate()?;

    let requested = u64::from(config.nights).saturating_mul(config.fleet_size as u64);
    if requested > MAX_SIMULATED_RECORDS {
        let payload = json!({
            "error": format!(
                "simulation of {requested} records exceeds the limit of {MAX_SIMULATED_RECORDS}"
            ),
        });
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response());
    }

    let start_date = match start_date {
        Some(date) => date,
        None => default_start_date(config.nights)?,
    };
    let (summary, csv) = tokio::task::spawn_blocking(move || {
        let (summary, records) = simulate(config, start_date, true)?;
        let mut csv = Vec::new();
        write_records(&mut csv, &records)?;
        Ok::<_, AppError>((summary, csv))
    })
    .await
    .map_err(|err| AppError::Server(axum::Error::new(err)))??;

    info!(
        seed = summary.seed,
        records = summary.records,
        %start_date,
        "simulation served"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=metro_fleet_data.csv",
            ),
        ],
        csv,
    )
        .into_response())
}
