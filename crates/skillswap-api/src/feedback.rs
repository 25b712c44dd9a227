use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use skillswap_db::StoreError;
use skillswap_types::api::{Claims, CreateFeedbackRequest, UpdateFeedbackRequest};
use skillswap_types::models::FeedbackView;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::views;

fn feedback_not_found() -> ApiError {
    ApiError::NotFound("Feedback not found".into())
}

/// Record feedback for a completed swap; the author is always the caller.
pub async fn create_feedback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateFeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = Uuid::new_v4().to_string();
    let row = state
        .db
        .create_feedback(
            &id,
            &req.swap_request.to_string(),
            &claims.sub.to_string(),
            &req.to_user.to_string(),
            req.rating,
            req.comment.as_deref(),
        )
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("swap request or user not found".into()),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(views::feedback_view(&state.db, &row)?)))
}

/// Feedback the caller wrote or received, newest first.
pub async fn list_feedback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_feedback_for_user(&claims.sub.to_string())?;
    let feedback: Vec<FeedbackView> = rows
        .iter()
        .map(|row| views::feedback_view(&state.db, row))
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(feedback))
}

pub async fn get_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_feedback_authored(&id.to_string(), &claims.sub.to_string())?
        .ok_or_else(feedback_not_found)?;

    Ok(Json(views::feedback_view(&state.db, &row)?))
}

pub async fn update_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateFeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .update_feedback(
            &id.to_string(),
            &claims.sub.to_string(),
            req.rating,
            req.comment.as_deref(),
        )
        .map_err(|e| match e {
            StoreError::NotFound => feedback_not_found(),
            StoreError::Invalid(msg) => ApiError::field("rating", msg),
            other => other.into(),
        })?;

    Ok(Json(views::feedback_view(&state.db, &row)?))
}

pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .delete_feedback(&id.to_string(), &claims.sub.to_string())
        .map_err(|e| match e {
            StoreError::NotFound => feedback_not_found(),
            other => other.into(),
        })?;

    Ok(StatusCode::NO_CONTENT)
}
