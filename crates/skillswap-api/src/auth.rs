use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{Duration, SecondsFormat, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use skillswap_db::{Database, StoreError};
use skillswap_db::models::UserRow;
use skillswap_types::api::{
    AuthResponse, Claims, LoginRequest, LogoutRequest, RefreshRequest, RefreshResponse,
    RegisterRequest,
};

use crate::error::ApiError;
use crate::views;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

const ACCESS_TOKEN_MINUTES: i64 = 60;
const REFRESH_TOKEN_DAYS: i64 = 30;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors: Vec<(&'static str, String)> = Vec::new();

    if req.username.len() < 3 || req.username.len() > 32 {
        errors.push(("username", "username must be 3 to 32 characters".into()));
    }
    if !req.email.contains('@') {
        errors.push(("email", "Enter a valid email address".into()));
    }
    if req.name.trim().is_empty() {
        errors.push(("name", "This field may not be blank".into()));
    }
    if req.password.len() < 8 {
        errors.push(("password", "password must be at least 8 characters".into()));
    }
    if req.password != req.password2 {
        errors.push(("password2", "Passwords don't match".into()));
    }
    if state.db.get_user_by_email(&req.email)?.is_some() {
        errors.push(("email", "user with this email already exists".into()));
    }
    if state.db.get_user_by_username(&req.username)?.is_some() {
        errors.push(("username", "user with this username already exists".into()));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?
        .to_string();

    let user_id = Uuid::new_v4().to_string();
    state
        .db
        .create_user(&user_id, &req.username, &req.email, &req.name, &password_hash)
        .map_err(|e| match e {
            // raced with another registration between pre-check and insert
            StoreError::Conflict(msg) if msg.contains("email") => ApiError::field("email", msg),
            StoreError::Conflict(msg) => ApiError::field("username", msg),
            other => other.into(),
        })?;

    let user = state
        .db
        .get_user_by_id(&user_id)?
        .ok_or_else(|| ApiError::Internal("registered user vanished".into()))?;

    let response = auth_response(&state, &user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_email(&req.email)?
        .ok_or_else(|| ApiError::Invalid("Invalid credentials".into()))?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(format!("corrupt password hash: {e}")))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Invalid("Invalid credentials".into()))?;

    let response = auth_response(&state, &user)?;
    Ok(Json(response))
}

/// Revoke the presented refresh token. Revoking an unknown or already
/// revoked token is a 400, mirroring blacklist semantics.
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .revoke_refresh_token(&hash_refresh_token(&req.refresh))
        .map_err(|_| ApiError::Invalid("Error logging out".into()))?;

    Ok(Json(serde_json::json!({ "message": "Successfully logged out" })))
}

/// Exchange a live refresh token for a fresh access token. The refresh token
/// itself is not rotated.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let user_id = state
        .db
        .lookup_refresh_token(&hash_refresh_token(&req.refresh), &now)?
        .ok_or_else(|| ApiError::Invalid("Token is invalid or expired".into()))?;

    let user = state
        .db
        .get_user_by_id(&user_id)?
        .ok_or_else(|| ApiError::Invalid("Token is invalid or expired".into()))?;

    let access = create_access_token(&state.jwt_secret, &user)?;
    Ok(Json(RefreshResponse { access }))
}

fn auth_response(state: &AppState, user: &UserRow) -> Result<AuthResponse, ApiError> {
    Ok(AuthResponse {
        user: views::user_view(&state.db, user)?,
        access: create_access_token(&state.jwt_secret, user)?,
        refresh: issue_refresh_token(&state.db, &user.id)?,
    })
}

fn create_access_token(secret: &str, user: &UserRow) -> Result<String, ApiError> {
    let sub: Uuid = user
        .id
        .parse()
        .map_err(|e| ApiError::Internal(format!("corrupt user id '{}': {e}", user.id)))?;

    let claims = Claims {
        sub,
        email: user.email.clone(),
        admin: user.is_admin,
        exp: (Utc::now() + Duration::minutes(ACCESS_TOKEN_MINUTES)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token encoding failed: {e}")))
}

/// Opaque refresh token: 32 random bytes, hex-encoded; only its sha256 digest
/// is stored.
fn issue_refresh_token(db: &Database, user_id: &str) -> Result<String, ApiError> {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);

    let expires_at = (Utc::now() + Duration::days(REFRESH_TOKEN_DAYS))
        .to_rfc3339_opts(SecondsFormat::Micros, true);
    db.store_refresh_token(&hash_refresh_token(&token), user_id, &expires_at)?;

    Ok(token)
}

fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
