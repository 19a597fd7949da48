use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::auth;
use super::health;
use super::middleware::{authentication_middleware, logging_middleware};
use super::state::AppState;
use super::{teams, test_content, users};

const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(CORS_MAX_AGE);

    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api/auth", auth::create_auth_router())
        .nest("/api/users", users::create_users_router())
        .nest("/api/teams", teams::create_teams_router())
        .nest("/api/test", test_content::create_test_router())
        // Innermost first: logging sees the context set by authentication
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
