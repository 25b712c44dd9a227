use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use skillswap_types::api::Claims;
use skillswap_types::models::UserView;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    /// Case-insensitive substring matched against skill names on any swap
    /// request involving the user.
    pub skill: Option<String>,
}

/// Directory of public users, excluding the caller.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .db
        .list_public_users(&claims.sub.to_string(), query.skill.as_deref())?;
    let users: Vec<UserView> = rows
        .iter()
        .map(|row| views::user_view(&state.db, row))
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(users))
}
