use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use skillswap_db::StoreError;
use skillswap_types::api::{Claims, CreateSkillRequest};
use skillswap_types::models::SkillView;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::views;

pub async fn list_skills(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_skills()?;
    let skills: Vec<SkillView> = rows.iter().map(views::skill_view).collect();
    Ok(Json(skills))
}

/// Creating skills is reserved to admins; the catalog is otherwise
/// append-only via seeding.
pub async fn create_skill(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateSkillRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !claims.admin {
        return Err(ApiError::Permission(
            "You do not have permission to perform this action".into(),
        ));
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::field("name", "This field may not be blank"));
    }

    let id = Uuid::new_v4();
    state.db.create_skill(&id.to_string(), &req.name).map_err(|e| match e {
        StoreError::Conflict(msg) => ApiError::field("name", msg),
        other => other.into(),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(SkillView {
            id,
            name: req.name,
        }),
    ))
}
