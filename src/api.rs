//! Public JSON endpoints driving a participant through the funnel.
//!
//! Every mutation locks the session's flow for the duration of the request,
//! so transitions within one session are strictly sequential. A spin request
//! holds the lock across the animation window; a second spin arriving
//! meanwhile waits and is then rejected as an out-of-order transition.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::flow::FlowError;
use crate::state::{AppState, SessionError};
use crate::types::{Establishment, GameStep, Segment, SessionId, SpinOutcome};
use crate::validation::{validate_email, validate_phone};
use crate::wheel::WheelError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/establishments/{slug}", get(get_establishment))
        .route("/api/game/{slug}/session", post(create_session))
        .route("/api/session/{id}", get(get_session))
        .route("/api/session/{id}/contact", post(submit_contact))
        .route("/api/session/{id}/review", post(confirm_review))
        .route("/api/session/{id}/spin", post(spin))
        .route("/api/session/{id}/continue", post(proceed_from_result))
        .route("/api/session/{id}/instagram", post(confirm_instagram))
        .route("/api/session/{id}/finish", post(finish))
}

/// Public view of an establishment: everything the game page needs to render
/// the wheel, nothing an admin owns.
#[derive(Debug, Serialize)]
pub struct EstablishmentView {
    pub name: String,
    pub slug: String,
    pub review_url: String,
    pub instagram_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub bonus_wheel_enabled: bool,
    pub segments: Vec<Segment>,
}

impl EstablishmentView {
    fn new(establishment: Establishment, segments: Vec<Segment>) -> Self {
        Self {
            name: establishment.name,
            slug: establishment.slug,
            review_url: establishment.review_url,
            instagram_url: establishment.instagram_url,
            primary_color: establishment.primary_color,
            secondary_color: establishment.secondary_color,
            bonus_wheel_enabled: establishment.bonus_wheel_enabled,
            segments,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub step: GameStep,
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub step: GameStep,
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct SpinResponse {
    pub step: GameStep,
    pub outcome: SpinOutcome,
}

type ApiError = (StatusCode, String);

fn session_error(e: SessionError) -> ApiError {
    match e {
        SessionError::EstablishmentNotFound => {
            (StatusCode::NOT_FOUND, "Establishment not found".to_string())
        }
        // Misconfigured wheel: not recoverable without admin action.
        SessionError::Wheel(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        SessionError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn flow_error(e: FlowError) -> ApiError {
    match e {
        FlowError::InvalidTransition { .. } => (StatusCode::CONFLICT, e.to_string()),
        FlowError::Wheel(WheelError::SpinInFlight) => (StatusCode::CONFLICT, e.to_string()),
        FlowError::Wheel(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn session_not_found() -> ApiError {
    (StatusCode::NOT_FOUND, "Session not found".to_string())
}

async fn get_establishment(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<EstablishmentView>, ApiError> {
    let establishment = state
        .establishments
        .get_by_slug(&slug)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Establishment not found".to_string()))?;

    let mut segments = state
        .segments
        .load_segments(&establishment.id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    segments.sort_by_key(|s| s.order);

    Ok(Json(EstablishmentView::new(establishment, segments)))
}

async fn create_session(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (session_id, flow) = state.create_session(&slug).await.map_err(session_error)?;
    let step = flow.lock().await.step();
    Ok(Json(SessionResponse { session_id, step }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StepResponse>, ApiError> {
    let flow = state.session(&id).await.ok_or_else(session_not_found)?;
    let step = flow.lock().await.step();
    Ok(Json(StepResponse { step }))
}

async fn submit_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<StepResponse>, ApiError> {
    validate_email(&request.email)
        .and(validate_phone(&request.phone))
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let flow = state.session(&id).await.ok_or_else(session_not_found)?;
    let step = flow
        .lock()
        .await
        .submit_contact_info(&request.email, &request.phone)
        .await
        .map_err(flow_error)?;
    Ok(Json(StepResponse { step }))
}

async fn confirm_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StepResponse>, ApiError> {
    let flow = state.session(&id).await.ok_or_else(session_not_found)?;
    let step = flow.lock().await.confirm_review().map_err(flow_error)?;
    Ok(Json(StepResponse { step }))
}

/// Spin whichever wheel the session is waiting on. The response carries the
/// pre-selected outcome and the rotation the client animates to; it is sent
/// only after the animation window has elapsed server-side.
async fn spin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SpinResponse>, ApiError> {
    let flow = state.session(&id).await.ok_or_else(session_not_found)?;
    let mut flow = flow.lock().await;

    let outcome = match flow.step() {
        GameStep::SpinningWheel2 => flow.spin_wheel2().await,
        _ => flow.spin_wheel1().await,
    }
    .map_err(flow_error)?;

    tracing::info!(
        session = %id,
        prize = %outcome.segment.title,
        is_winner = outcome.is_winner,
        "Wheel spun"
    );

    Ok(Json(SpinResponse {
        step: flow.step(),
        outcome,
    }))
}

async fn proceed_from_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StepResponse>, ApiError> {
    let flow = state.session(&id).await.ok_or_else(session_not_found)?;
    let step = flow
        .lock()
        .await
        .proceed_from_result1()
        .map_err(flow_error)?;
    Ok(Json(StepResponse { step }))
}

async fn confirm_instagram(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StepResponse>, ApiError> {
    let flow = state.session(&id).await.ok_or_else(session_not_found)?;
    let step = flow
        .lock()
        .await
        .confirm_instagram_follow()
        .map_err(flow_error)?;
    Ok(Json(StepResponse { step }))
}

async fn finish(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StepResponse>, ApiError> {
    let flow = state.session(&id).await.ok_or_else(session_not_found)?;
    let step = flow.lock().await.finish().map_err(flow_error)?;
    Ok(Json(StepResponse { step }))
}
