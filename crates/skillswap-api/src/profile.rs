use axum::{Extension, Json, extract::State, response::IntoResponse};

use skillswap_db::users::{ProfileChanges, SkillSet};
use skillswap_db::StoreError;
use skillswap_types::api::{Claims, ProfileUpdateRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::views;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(views::user_view(&state.db, &user)?))
}

/// Partial update of the caller's own record. Skill sets are written as ID
/// arrays and come back expanded in the response.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();

    state
        .db
        .update_profile(
            &user_id,
            &ProfileChanges {
                name: req.name.as_deref(),
                location: req.location.as_ref().map(|inner| inner.as_deref()),
                availability: req.availability.as_ref().map(|inner| inner.as_deref()),
                is_public: req.is_public,
            },
        )
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("User not found".into()),
            other => other.into(),
        })?;

    if let Some(skill_ids) = &req.skills_offered {
        let ids: Vec<String> = skill_ids.iter().map(|id| id.to_string()).collect();
        state
            .db
            .set_user_skills(&user_id, SkillSet::Offered, &ids)
            .map_err(|e| match e {
                StoreError::Invalid(msg) => ApiError::field("skills_offered", msg),
                other => other.into(),
            })?;
    }
    if let Some(skill_ids) = &req.skills_wanted {
        let ids: Vec<String> = skill_ids.iter().map(|id| id.to_string()).collect();
        state
            .db
            .set_user_skills(&user_id, SkillSet::Wanted, &ids)
            .map_err(|e| match e {
                StoreError::Invalid(msg) => ApiError::field("skills_wanted", msg),
                other => other.into(),
            })?;
    }

    let user = state
        .db
        .get_user_by_id(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(views::user_view(&state.db, &user)?))
}
