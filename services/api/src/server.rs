use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_intake_routes;
use appraisal_intake::config::AppConfig;
use appraisal_intake::error::AppError;
use appraisal_intake::telemetry;
use appraisal_intake::workflows::intake::address::{AddressAutofill, ViaCepClient};
use appraisal_intake::workflows::intake::report::GeminiClient;
use appraisal_intake::workflows::intake::session::IntakeSession;
use appraisal_intake::workflows::intake::submission::{
    SubmissionOrchestrator, SupabaseStore, WebhookNotifier,
};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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

    let channels = &config.channels;
    let store = SupabaseStore::new(
        &channels.supabase_url,
        channels.supabase_key()?,
        &channels.supabase_table,
        channels.timeout,
    )?;
    let webhook = WebhookNotifier::new(channels.webhook_url.clone(), channels.timeout)?;
    let lookup = ViaCepClient::new(channels.cep_lookup_url.clone(), channels.timeout)?;

    let orchestrator = SubmissionOrchestrator::new(Arc::new(store), Arc::new(webhook));
    let mut session = IntakeSession::new(orchestrator, AddressAutofill::new(Arc::new(lookup)));

    match config.report.api_key.as_deref() {
        Some(api_key) => {
            let reporter = GeminiClient::new(api_key, config.report.model.clone(), channels.timeout)?;
            session = session.with_reporter(Arc::new(reporter));
            info!(model = %config.report.model, "report generation enabled");
        }
        None => warn!("GEMINI_API_KEY not set; report generation disabled"),
    }

    let app = with_intake_routes(Arc::new(session))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "appraisal intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
