use crate::cli::ServeArgs;
use crate::infra::{build_availability_service, AppState};
use crate::routes::with_availability_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use oceanvillas::config::AppConfig;
use oceanvillas::error::AppError;
use oceanvillas::telemetry::{self, LogOutput};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, LogOutput::Stdout)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if config.provider.listing_ids.is_empty() {
        warn!("OCEANVILLAS_LISTING_IDS is empty; searches will fail until it is set");
    }
    if config.provider.account_id.is_none() || config.provider.api_key.is_none() {
        warn!("Hostaway credentials are incomplete; searches will fail until they are set");
    }

    let availability_service = build_availability_service(&config.provider)?;

    let app = with_availability_routes(availability_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        listings = config.provider.listing_ids.len(),
        "ocean villas availability service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
