use axum::{Extension, Json, extract::State, response::IntoResponse};

use skillswap_types::api::Claims;
use skillswap_types::models::UserStats;

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn user_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.db.user_stats(&claims.sub.to_string())?;

    Ok(Json(UserStats {
        total_sent_requests: row.total_sent_requests,
        total_received_requests: row.total_received_requests,
        accepted_requests: row.accepted_requests,
        pending_requests: row.pending_requests,
        total_feedbacks: row.total_feedbacks,
        average_rating: row.average_rating,
    }))
}
