use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use super::domain::{Category, Disposition, GeneratedOutfit, SavedOutfit, Style};
use super::enumerator::{EnumeratorError, Step, StepStatus};
use super::rejection::DispositionPrompt;
use super::repository::{ItemStore, OutfitStore, StoreError};
use super::service::{
    OutfitSession, PromptOutcome, RejectOutcome, SessionError, EXHAUSTED_MESSAGE,
};

/// The single mutable session shared by every handler.
pub type SharedSession<O, I> = Arc<Mutex<OutfitSession<O, I>>>;

/// Router builder exposing the outfit session and saved-outfit library.
pub fn outfit_router<O, I>(session: SharedSession<O, I>) -> Router
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    Router::new()
        .route("/api/v1/outfits/session", post(start_handler::<O, I>))
        .route("/api/v1/outfits/session/next", post(next_handler::<O, I>))
        .route("/api/v1/outfits/session/reject", post(reject_handler::<O, I>))
        .route(
            "/api/v1/outfits/session/locks/:slot",
            post(lock_handler::<O, I>),
        )
        .route(
            "/api/v1/outfits/session/prompt",
            get(prompt_handler::<O, I>).post(resolve_prompt_handler::<O, I>),
        )
        .route("/api/v1/outfits/session/save", post(save_handler::<O, I>))
        .route(
            "/api/v1/outfits/rejections/reset",
            post(reset_rejections_handler::<O, I>),
        )
        .route("/api/v1/outfits/saved", get(saved_handler::<O, I>))
        .route(
            "/api/v1/outfits/saved/:name",
            delete(delete_saved_handler::<O, I>),
        )
        .with_state(session)
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub style: String,
}

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub disposition: Disposition,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SavedQuery {
    pub q: Option<String>,
}

/// Outfit as rendered to clients.
#[derive(Debug, Clone, Serialize)]
pub struct OutfitView {
    pub style: &'static str,
    pub status: StepStatus,
    pub exhausted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub overall_score: f64,
    pub ready_to_save: bool,
    pub outfit: GeneratedOutfit,
}

impl OutfitView {
    pub fn new(style: Style, step: Step) -> Self {
        let exhausted = step.is_exhausted();
        Self {
            style: style.label(),
            status: step.status,
            exhausted,
            message: exhausted.then_some(EXHAUSTED_MESSAGE),
            overall_score: step.outfit.overall_score(),
            ready_to_save: step.outfit.all_locked(),
            outfit: step.outfit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptView {
    pub message: String,
    #[serde(flatten)]
    pub prompt: DispositionPrompt,
}

impl From<DispositionPrompt> for PromptView {
    fn from(prompt: DispositionPrompt) -> Self {
        let message = format!(
            "You have rejected this {} from {} {} times. Keep it, delete it, or donate it?",
            prompt.slot, prompt.item.brand, prompt.rejection_count
        );
        Self { message, prompt }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedOutfitView {
    #[serde(flatten)]
    pub outfit: SavedOutfit,
    pub share_summary: String,
}

impl From<SavedOutfit> for SavedOutfitView {
    fn from(outfit: SavedOutfit) -> Self {
        let share_summary = outfit.share_summary();
        Self {
            outfit,
            share_summary,
        }
    }
}

pub(crate) async fn start_handler<O, I>(
    State(session): State<SharedSession<O, I>>,
    axum::Json(request): axum::Json<StartRequest>,
) -> Response
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    let Some(style) = Style::parse(&request.style) else {
        let payload = json!({
            "error": format!("unknown style \"{}\"", request.style),
            "code": "unknown_style",
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    };

    let mut session = session.lock().await;
    match session.start(style).await {
        Ok(step) => (StatusCode::OK, axum::Json(OutfitView::new(style, step))).into_response(),
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn next_handler<O, I>(State(session): State<SharedSession<O, I>>) -> Response
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    let mut session = session.lock().await;
    let result = session.next().await;
    step_response(session.style(), result)
}

pub(crate) async fn reject_handler<O, I>(State(session): State<SharedSession<O, I>>) -> Response
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    let mut session = session.lock().await;
    match session.reject().await {
        Ok(RejectOutcome::Advanced { step }) => {
            let Some(style) = session.style() else {
                return session_error_response(SessionError::NotStarted);
            };
            let payload = json!({
                "outcome": "advanced",
                "outfit": OutfitView::new(style, step),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(RejectOutcome::Prompt { prompt }) => {
            let payload = json!({
                "outcome": "prompt",
                "prompt": PromptView::from(prompt),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn lock_handler<O, I>(
    State(session): State<SharedSession<O, I>>,
    Path(slot): Path<String>,
) -> Response
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    let Some(slot) = Category::parse(&slot) else {
        let payload = json!({
            "error": format!("unknown slot \"{slot}\""),
            "code": "unknown_slot",
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    };

    let mut session = session.lock().await;
    match session.toggle_lock(slot) {
        Ok(toggle) => (StatusCode::OK, axum::Json(toggle)).into_response(),
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn prompt_handler<O, I>(State(session): State<SharedSession<O, I>>) -> Response
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    let session = session.lock().await;
    let payload = json!({
        "pending": session.pending_prompts(),
        "prompt": session.current_prompt().cloned().map(PromptView::from),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn resolve_prompt_handler<O, I>(
    State(session): State<SharedSession<O, I>>,
    axum::Json(request): axum::Json<PromptRequest>,
) -> Response
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    let mut session = session.lock().await;
    match session.resolve_prompt(request.disposition).await {
        Ok(PromptOutcome::NextPrompt { prompt }) => {
            let payload = json!({
                "outcome": "next_prompt",
                "prompt": PromptView::from(prompt),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(PromptOutcome::Donate { url, prompt }) => {
            let payload = json!({
                "outcome": "donate",
                "url": url,
                "prompt": PromptView::from(prompt),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(PromptOutcome::Resumed { step }) => {
            let Some(style) = session.style() else {
                return session_error_response(SessionError::NotStarted);
            };
            let payload = json!({
                "outcome": "resumed",
                "outfit": OutfitView::new(style, step),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn save_handler<O, I>(
    State(session): State<SharedSession<O, I>>,
    axum::Json(request): axum::Json<SaveRequest>,
) -> Response
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    let mut session = session.lock().await;
    match session.save(&request.name).await {
        Ok(saved) => {
            (StatusCode::CREATED, axum::Json(SavedOutfitView::from(saved))).into_response()
        }
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn reset_rejections_handler<O, I>(
    State(session): State<SharedSession<O, I>>,
) -> Response
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    let mut session = session.lock().await;
    match session.reset_rejections().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn saved_handler<O, I>(
    State(session): State<SharedSession<O, I>>,
    Query(query): Query<SavedQuery>,
) -> Response
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    let session = session.lock().await;
    match session.saved_outfits(query.q.as_deref()).await {
        Ok(outfits) => {
            let views: Vec<SavedOutfitView> =
                outfits.into_iter().map(SavedOutfitView::from).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn delete_saved_handler<O, I>(
    State(session): State<SharedSession<O, I>>,
    Path(name): Path<String>,
) -> Response
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    let mut session = session.lock().await;
    match session.delete_saved(&name).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => session_error_response(error),
    }
}

fn step_response(style: Option<Style>, result: Result<Step, SessionError>) -> Response {
    match (style, result) {
        (Some(style), Ok(step)) => {
            (StatusCode::OK, axum::Json(OutfitView::new(style, step))).into_response()
        }
        (None, Ok(_)) => session_error_response(SessionError::NotStarted),
        (_, Err(error)) => session_error_response(error),
    }
}

pub(crate) fn session_error_response(error: SessionError) -> Response {
    let (status, code) = match &error {
        SessionError::InsufficientWardrobe { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_wardrobe")
        }
        SessionError::Enumerator(EnumeratorError::InsufficientItems { .. }) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_items")
        }
        SessionError::Store(StoreError::NameTaken(_)) => (StatusCode::CONFLICT, "name_taken"),
        SessionError::Store(StoreError::CombinationTaken) => {
            (StatusCode::CONFLICT, "combination_taken")
        }
        SessionError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
        SessionError::Store(StoreError::Unavailable(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
        }
        SessionError::PromptPending => (StatusCode::CONFLICT, "prompt_pending"),
        SessionError::NoPendingPrompt => (StatusCode::CONFLICT, "no_pending_prompt"),
        SessionError::InvalidName => (StatusCode::BAD_REQUEST, "invalid_name"),
        SessionError::IncompleteOutfit => (StatusCode::CONFLICT, "incomplete_outfit"),
        SessionError::NotStarted | SessionError::Enumerator(EnumeratorError::NoActiveOutfit) => {
            (StatusCode::CONFLICT, "not_started")
        }
        SessionError::Enumerator(EnumeratorError::EmptySlot { .. }) => {
            (StatusCode::BAD_REQUEST, "empty_slot")
        }
    };
    let payload = json!({
        "error": error.to_string(),
        "code": code,
    });
    (status, axum::Json(payload)).into_response()
}
