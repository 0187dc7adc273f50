use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::me))
        .route(
            "/api/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route("/api/habits/track", post(handlers::track_habit))
        .route("/api/habits/:id", delete(handlers::delete_habit))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/calendar", get(handlers::get_calendar))
        .with_state(state)
}
