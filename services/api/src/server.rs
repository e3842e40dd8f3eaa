use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySubsidySource};
use crate::routes::with_subsidy_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use learner_subsidy::config::AppConfig;
use learner_subsidy::error::AppError;
use learner_subsidy::subsidy::SubsidyResolutionService;
use learner_subsidy::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let source = match config.subsidy_fixtures.as_deref() {
        Some(path) => {
            let source = InMemorySubsidySource::from_fixture_file(path)?;
            let (learners, courses) = source.counts()?;
            info!(path = %path.display(), learners, courses, "subsidy fixtures loaded");
            source
        }
        None => {
            warn!("APP_SUBSIDY_FIXTURES not set; learner lookups will report not found");
            InMemorySubsidySource::default()
        }
    };
    let source = Arc::new(source);
    let resolution_service = Arc::new(SubsidyResolutionService::new(source, config.features));

    let app = with_subsidy_routes(resolution_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        enterprise_offers = config.features.enterprise_offers,
        learner_credit = config.features.learner_credit,
        "learner subsidy resolver ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
