use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use krew_leads::config::AppConfig;
use krew_leads::error::AppError;
use krew_leads::storage::StorageBackend;
use krew_leads::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{build_services, AppState, JsonFileBackend};
use crate::routes::api_router;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.storage.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let backend: Arc<dyn StorageBackend> =
        Arc::new(JsonFileBackend::new(&config.storage.data_dir)?);
    let services = Arc::new(build_services(backend));

    let app = api_router(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, data_dir = %config.storage.data_dir.display(), "lead capture service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
