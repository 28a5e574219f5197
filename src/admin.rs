//! Admin endpoints for managing establishments, their wheels, and the
//! collected participant entries. Mounted behind Basic auth.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::store::StoreError;
use crate::types::{slugify, Establishment, ParticipantEntry, Segment, SegmentKind};
use crate::wheel::SegmentSet;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/establishments",
            get(list_establishments).post(create_establishment),
        )
        .route(
            "/api/admin/establishments/{id}",
            get(get_establishment)
                .put(update_establishment)
                .delete(delete_establishment),
        )
        .route(
            "/api/admin/establishments/{id}/segments",
            put(replace_segments).get(list_segments),
        )
        .route(
            "/api/admin/establishments/{id}/participants",
            get(list_participants),
        )
}

#[derive(Debug, Deserialize)]
pub struct EstablishmentRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub review_url: String,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default = "default_secondary_color")]
    pub secondary_color: String,
    #[serde(default)]
    pub bonus_wheel_enabled: bool,
}

fn default_primary_color() -> String {
    "#8b5cf6".to_string()
}

fn default_secondary_color() -> String {
    "#d946ef".to_string()
}

/// Segment payload as the dashboard sends it. The angular slot comes from the
/// array position, the id is assigned server-side.
#[derive(Debug, Deserialize)]
pub struct SegmentRequest {
    pub title: String,
    pub color: String,
    pub kind: SegmentKind,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct ParticipantListResponse {
    pub participants: Vec<ParticipantEntry>,
    pub total: usize,
}

type ApiError = (StatusCode, String);

fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        StoreError::Unavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn establishment_not_found() -> ApiError {
    (StatusCode::NOT_FOUND, "Establishment not found".to_string())
}

/// Find a slug not already taken, appending `-2`, `-3`, ... when needed.
async fn unique_slug(state: &AppState, name: &str) -> Result<String, ApiError> {
    let base = slugify(name);
    let base = if base.is_empty() {
        "establishment".to_string()
    } else {
        base
    };

    let mut candidate = base.clone();
    let mut suffix = 2;
    loop {
        let taken = state
            .establishments
            .get_by_slug(&candidate)
            .await
            .map_err(store_error)?
            .is_some();
        if !taken {
            return Ok(candidate);
        }
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
}

async fn list_establishments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Establishment>>, ApiError> {
    let establishments = state.establishments.list().await.map_err(store_error)?;
    Ok(Json(establishments))
}

async fn get_establishment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Establishment>, ApiError> {
    let establishment = state
        .establishments
        .get_by_id(&id)
        .await
        .map_err(store_error)?
        .ok_or_else(establishment_not_found)?;
    Ok(Json(establishment))
}

async fn create_establishment(
    State(state): State<AppState>,
    Json(request): Json<EstablishmentRequest>,
) -> Result<(StatusCode, Json<Establishment>), ApiError> {
    if request.name.trim().is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "Name is required".to_string()));
    }

    let slug = unique_slug(&state, &request.name).await?;
    let establishment = Establishment {
        id: ulid::Ulid::new().to_string(),
        name: request.name.trim().to_string(),
        slug: slug.clone(),
        address: request.address,
        review_url: request.review_url,
        instagram_url: request.instagram_url,
        primary_color: request.primary_color,
        secondary_color: request.secondary_color,
        bonus_wheel_enabled: request.bonus_wheel_enabled,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state
        .establishments
        .save(establishment.clone())
        .await
        .map_err(store_error)?;

    tracing::info!(slug, "Establishment created");
    Ok((StatusCode::CREATED, Json(establishment)))
}

/// Update everything except id, slug, and creation time. The slug stays
/// stable because it is printed on QR codes.
async fn update_establishment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<EstablishmentRequest>,
) -> Result<Json<Establishment>, ApiError> {
    let mut establishment = state
        .establishments
        .get_by_id(&id)
        .await
        .map_err(store_error)?
        .ok_or_else(establishment_not_found)?;

    if request.name.trim().is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "Name is required".to_string()));
    }

    establishment.name = request.name.trim().to_string();
    establishment.address = request.address;
    establishment.review_url = request.review_url;
    establishment.instagram_url = request.instagram_url;
    establishment.primary_color = request.primary_color;
    establishment.secondary_color = request.secondary_color;
    establishment.bonus_wheel_enabled = request.bonus_wheel_enabled;

    state
        .establishments
        .save(establishment.clone())
        .await
        .map_err(store_error)?;

    Ok(Json(establishment))
}

async fn delete_establishment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .establishments
        .get_by_id(&id)
        .await
        .map_err(store_error)?
        .ok_or_else(establishment_not_found)?;

    state.establishments.delete(&id).await.map_err(store_error)?;

    tracing::info!(establishment = %id, "Establishment deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_segments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Segment>>, ApiError> {
    state
        .establishments
        .get_by_id(&id)
        .await
        .map_err(store_error)?
        .ok_or_else(establishment_not_found)?;

    let mut segments = state.segments.load_segments(&id).await.map_err(store_error)?;
    segments.sort_by_key(|s| s.order);
    Ok(Json(segments))
}

/// Replace the whole wheel in one shot. The new configuration must itself be
/// spinnable, otherwise the previous one stays in place.
async fn replace_segments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<Vec<SegmentRequest>>,
) -> Result<Json<Vec<Segment>>, ApiError> {
    state
        .establishments
        .get_by_id(&id)
        .await
        .map_err(store_error)?
        .ok_or_else(establishment_not_found)?;

    let segments: Vec<Segment> = request
        .into_iter()
        .enumerate()
        .map(|(order, s)| Segment {
            id: ulid::Ulid::new().to_string(),
            establishment_id: id.clone(),
            title: s.title,
            color: s.color,
            kind: s.kind,
            weight: s.weight,
            order: order as u32,
        })
        .collect();

    SegmentSet::new(segments.clone())
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    state
        .segments
        .replace_segments(&id, segments.clone())
        .await
        .map_err(store_error)?;

    tracing::info!(establishment = %id, count = segments.len(), "Wheel replaced");
    Ok(Json(segments))
}

async fn list_participants(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ParticipantListResponse>, ApiError> {
    state
        .establishments
        .get_by_id(&id)
        .await
        .map_err(store_error)?
        .ok_or_else(establishment_not_found)?;

    let mut participants = state.participants.list(&id).await.map_err(store_error)?;
    participants.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = participants.len();
    Ok(Json(ParticipantListResponse {
        participants,
        total,
    }))
}
