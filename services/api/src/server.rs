use crate::cli::ServeArgs;
use crate::demo::seed_reference_data;
use crate::infra::{
    AppState, InMemoryAttendanceLog, InMemoryEmployeeDirectory, InMemoryMealLedger,
    InMemoryMealSessionCatalog,
};
use crate::routes::with_verification_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mealpass::canteen::verification::{InMemoryRuleStore, MealVerificationService};
use mealpass::config::AppConfig;
use mealpass::error::AppError;
use mealpass::telemetry;
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
    };

    let directory = Arc::new(InMemoryEmployeeDirectory::default());
    let sessions = Arc::new(InMemoryMealSessionCatalog::default());
    let attendance = Arc::new(InMemoryAttendanceLog::default());
    let ledger = Arc::new(InMemoryMealLedger::default());
    let rules = Arc::new(InMemoryRuleStore::new());
    seed_reference_data(&directory, &sessions, &rules)?;

    let verification_service = Arc::new(MealVerificationService::new(
        directory,
        sessions,
        attendance,
        ledger,
        rules,
    ));

    let app = with_verification_routes(verification_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "canteen verification service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
