use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_fleet_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fleet_readiness::config::AppConfig;
use fleet_readiness::error::AppError;
use fleet_readiness::readiness::{PredictionService, ReadinessRulePredictor};
use fleet_readiness::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        simulation: Arc::new(config.simulation.clone()),
    };

    let prediction_service = Arc::new(PredictionService::new(Arc::new(ReadinessRulePredictor)));

    let app = with_fleet_routes(prediction_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        fleet_size = config.simulation.fleet_size,
        nights = config.simulation.nights,
        "fleet readiness service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
