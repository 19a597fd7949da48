//! Role demonstration endpoints

use axum::{routing::get, Router};

use crate::api::middleware::{require_any_role, CurrentAuth, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, MessageResponse};
use crate::domain::role::Role;

pub fn create_test_router() -> Router<AppState> {
    Router::new()
        .route("/all", get(all_access))
        .route("/user", get(user_access))
        .route("/po", get(product_owner_access))
        .route("/sm", get(scrum_master_access))
        .route("/admin", get(admin_access))
}

/// GET /api/test/all, open to anonymous callers
pub async fn all_access(CurrentAuth(context): CurrentAuth) -> Json<MessageResponse> {
    let message = match context.principal() {
        Some(principal) => format!("Public content. Signed in as {}.", principal.username),
        None => "Public content.".to_string(),
    };
    Json(MessageResponse::new(message))
}

pub async fn user_access(
    RequireUser(principal): RequireUser,
) -> Result<Json<MessageResponse>, ApiError> {
    require_any_role(&principal, &Role::ALL)?;
    Ok(Json(MessageResponse::new("User content.")))
}

pub async fn product_owner_access(
    RequireUser(principal): RequireUser,
) -> Result<Json<MessageResponse>, ApiError> {
    require_any_role(&principal, &[Role::ProductOwner, Role::Admin])?;
    Ok(Json(MessageResponse::new("Product owner content.")))
}

pub async fn scrum_master_access(
    RequireUser(principal): RequireUser,
) -> Result<Json<MessageResponse>, ApiError> {
    require_any_role(&principal, &[Role::ScrumMaster, Role::Admin])?;
    Ok(Json(MessageResponse::new("Scrum master content.")))
}

pub async fn admin_access(
    RequireUser(principal): RequireUser,
) -> Result<Json<MessageResponse>, ApiError> {
    require_any_role(&principal, &[Role::Admin])?;
    Ok(Json(MessageResponse::new("Admin content.")))
}
