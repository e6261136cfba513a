use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use wardrobe_ai::workflows::outfits::{
    outfit_router, ItemStore, OutfitSession, OutfitStore, Style,
};

#[derive(Debug, Serialize)]
pub(crate) struct StyleView {
    pub(crate) id: Style,
    pub(crate) label: &'static str,
    pub(crate) description: &'static str,
    pub(crate) color_rule: &'static str,
}

impl From<Style> for StyleView {
    fn from(style: Style) -> Self {
        Self {
            id: style,
            label: style.label(),
            description: style.description(),
            color_rule: style.color_rule_description(),
        }
    }
}

pub(crate) fn with_outfit_routes<O, I>(session: OutfitSession<O, I>) -> axum::Router
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    outfit_router(Arc::new(Mutex::new(session)))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/styles", axum::routing::get(styles_endpoint))
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

pub(crate) async fn styles_endpoint() -> Json<Vec<StyleView>> {
    Json(Style::ordered().into_iter().map(StyleView::from).collect())
}
