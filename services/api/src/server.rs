use crate::cli::ServeArgs;
use crate::infra::{build_session, load_saved_outfits, load_wardrobe, AppState};
use crate::routes::with_outfit_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use wardrobe_ai::config::AppConfig;
use wardrobe_ai::error::AppError;
use wardrobe_ai::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.wardrobe.take() {
        config.outfits.wardrobe_path = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let items = load_wardrobe(config.outfits.wardrobe_path.as_deref())?;
    let saved = load_saved_outfits(args.saved.as_deref())?;
    let mut session = build_session(items, saved, &config.outfits);
    let count = session.load_wardrobe().await?;
    info!(%count, "wardrobe seeded");

    let app = with_outfit_routes(session)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "outfit engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
