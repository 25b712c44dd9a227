use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use skillswap_db::StoreError;
use skillswap_types::api::{Claims, CreateSwapRequest, UpdateSwapRequest};
use skillswap_types::models::{SwapRequestView, SwapStatus};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::views;

fn swap_not_found() -> ApiError {
    ApiError::NotFound("Swap request not found".into())
}

/// Create a pending request. The sender is always the caller; any
/// client-supplied sender is not even deserialized.
pub async fn create_swap(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateSwapRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = Uuid::new_v4().to_string();
    let row = state
        .db
        .create_swap(
            &id,
            &claims.sub.to_string(),
            &req.receiver.to_string(),
            &req.offered_skill_id.to_string(),
            &req.requested_skill_id.to_string(),
        )
        .map_err(|e| match e {
            StoreError::Invalid(msg) => ApiError::Invalid(msg),
            StoreError::NotFound => ApiError::NotFound("receiver or skill not found".into()),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(views::swap_view(&state.db, &row)?)))
}

/// All requests the caller is a party to, newest first.
pub async fn list_swaps(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_swaps_for_user(&claims.sub.to_string())?;
    let swaps: Vec<SwapRequestView> = rows
        .iter()
        .map(|row| views::swap_view(&state.db, row))
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(swaps))
}

pub async fn get_swap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_swap_for_user(&id.to_string(), &claims.sub.to_string())?
        .ok_or_else(swap_not_found)?;

    Ok(Json(views::swap_view(&state.db, &row)?))
}

/// Generic update path: `status` is the only writable field, and the value
/// must be one of accepted/rejected/cancelled.
pub async fn update_swap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateSwapRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = SwapStatus::parse(&req.status)
        .filter(|s| s.is_terminal())
        .ok_or_else(|| ApiError::field("status", "Invalid status"))?;

    let row = state
        .db
        .update_swap_status(&id.to_string(), &claims.sub.to_string(), status)
        .map_err(|e| match e {
            StoreError::NotFound => swap_not_found(),
            other => other.into(),
        })?;

    Ok(Json(views::swap_view(&state.db, &row)?))
}

pub async fn delete_swap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .delete_swap(&id.to_string(), &claims.sub.to_string())
        .map_err(|e| match e {
            StoreError::NotFound => swap_not_found(),
            other => other.into(),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /swap-requests/{id}/{action}` — receiver accepts or rejects. A
/// missing request, a request addressed to someone else and a request that
/// is no longer pending all come back as the same 404.
pub async fn act_on_swap(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, String)>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match action.as_str() {
        "accept" => SwapStatus::Accepted,
        "reject" => SwapStatus::Rejected,
        _ => return Err(ApiError::Invalid("Invalid action".into())),
    };

    let row = state
        .db
        .act_on_swap(&id.to_string(), &claims.sub.to_string(), status)
        .map_err(|e| match e {
            StoreError::NotFound => swap_not_found(),
            other => other.into(),
        })?;

    Ok(Json(views::swap_view(&state.db, &row)?))
}
