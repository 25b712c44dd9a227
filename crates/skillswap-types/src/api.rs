use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::UserView;

// -- JWT Claims --

/// Access-token claims. Canonical definition lives here so the middleware
/// and the auth handlers agree on one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub admin: bool,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
    pub password2: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by both register and login: the user's read view plus an
/// access JWT and an opaque refresh token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserView,
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogoutRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

// -- Profile --

/// Partial update of the caller's own record. Absent fields are left
/// unchanged; skill sets are replaced wholesale when present, as skill IDs.
/// The nullable fields are tri-state: absent keeps the stored value, an
/// explicit JSON null clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub availability: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub skills_offered: Option<Vec<Uuid>>,
    pub skills_wanted: Option<Vec<Uuid>>,
}

/// Distinguish an absent field from an explicit null: serde only calls this
/// when the field is present, so present-null becomes `Some(None)` while the
/// field default stays `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// -- Skills --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSkillRequest {
    pub name: String,
}

// -- Swap requests --

/// Create shape: skills by ID, sender implied by the bearer token.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSwapRequest {
    pub receiver: Uuid,
    pub offered_skill_id: Uuid,
    pub requested_skill_id: Uuid,
}

/// Generic update path: `status` is the only writable field.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSwapRequest {
    pub status: String,
}

// -- Feedback --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateFeedbackRequest {
    pub swap_request: Uuid,
    pub to_user: Uuid,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateFeedbackRequest {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}
