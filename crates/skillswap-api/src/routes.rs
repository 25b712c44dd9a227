use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{feedback, profile, skills, stats, swaps, users};

/// Assemble the full application router. Lives here rather than in the
/// server binary so integration tests exercise the same router.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/token/refresh", post(auth::refresh))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/users", get(users::list_users))
        .route("/stats", get(stats::user_stats))
        .route(
            "/skills",
            get(skills::list_skills).post(skills::create_skill),
        )
        .route(
            "/swap-requests",
            get(swaps::list_swaps).post(swaps::create_swap),
        )
        .route(
            "/swap-requests/{id}",
            get(swaps::get_swap)
                .put(swaps::update_swap)
                .patch(swaps::update_swap)
                .delete(swaps::delete_swap),
        )
        .route("/swap-requests/{id}/{action}", post(swaps::act_on_swap))
        .route(
            "/feedback",
            get(feedback::list_feedback).post(feedback::create_feedback),
        )
        .route(
            "/feedback/{id}",
            get(feedback::get_feedback)
                .put(feedback::update_feedback)
                .patch(feedback::update_feedback)
                .delete(feedback::delete_feedback),
        )
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
