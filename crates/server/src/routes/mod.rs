use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod auth;
mod catalog;
mod codes;
mod events;
mod health;
mod profile;
mod tracking;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/api/health", get(health::health_check))
        // Verification codes
        .route("/send-code", post(codes::send_code))
        .route("/verify-code", post(codes::verify_code))
        // Account lifecycle
        .route("/register", post(auth::register))
        .route("/send-activation-code", post(auth::send_activation_code))
        .route("/verify-activation-code", post(auth::verify_activation_code))
        .route("/login", post(auth::login))
        // Fitness events
        .route("/api/events", get(events::list_events).post(events::create_event))
        .route(
            "/api/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/api/events/:id/register", post(events::register_for_event))
        .route("/api/events/:id/like", post(events::toggle_like))
        .route(
            "/api/events/professional/:trainer_id",
            get(events::professional_events),
        )
        // Profile
        .route("/api/profile", get(profile::get_profile).put(profile::update_profile))
        // Catalogs
        .route("/api/training-programs", get(catalog::list_programs))
        .route("/api/training-programs/:id", get(catalog::get_program))
        .route("/api/meal-plans", get(catalog::list_meal_plans))
        // Tracking
        .route("/api/workout-logs", post(tracking::log_workout))
        .route(
            "/api/progress",
            get(tracking::get_progress).post(tracking::add_progress),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
