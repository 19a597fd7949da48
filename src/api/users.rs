//! User directory endpoints

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::{require_any_role, require_self_or_any_role, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, MessageResponse, Query};
use crate::domain::role::Role;
use crate::domain::user::{User, UserStatus};

/// Roles allowed to delete users
const USER_DELETERS: [Role; 2] = [Role::Admin, Role::ScrumMaster];

pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(current_user))
        .route("/{id}", get(get_user).delete(delete_user))
        .route("/{id}/preferences", put(update_preferences))
        .route("/{id}/team", put(update_team))
        .route("/{id}/suspend", post(suspend_user))
        .route("/{id}/activate", post(activate_user))
}

/// User summary, safe to expose to other directory users
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<&'static str>,
    pub team_id: Option<String>,
    pub status: UserStatus,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            first_name: user.first_name().map(String::from),
            last_name: user.last_name().map(String::from),
            roles: user.roles().iter().map(Role::authority).collect(),
            team_id: user.team_id().map(ToString::to_string),
            status: user.status(),
        }
    }
}

/// Full user view, for the user themself and directory managers
#[derive(Debug, Clone, Serialize)]
pub struct UserDetailsResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub email: String,
    pub team_name: Option<String>,
    pub preferences: BTreeMap<String, String>,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub status: Option<UserStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamBody {
    /// `null` removes the user from their team
    pub team_id: Option<String>,
}

async fn details(state: &AppState, user: &User) -> Result<UserDetailsResponse, ApiError> {
    let team_name = match user.team_id() {
        Some(team_id) => state
            .team_service
            .get(team_id.as_str())
            .await?
            .map(|team| team.name().to_string()),
        None => None,
    };

    Ok(UserDetailsResponse {
        user: UserResponse::from(user),
        email: user.email().to_string(),
        team_name,
        preferences: user.preferences().clone(),
        created_at: user.created_at().to_rfc3339(),
        last_login_at: user.last_login_at().map(|t| t.to_rfc3339()),
    })
}

async fn find_user(state: &AppState, id: &str) -> Result<User, ApiError> {
    state
        .user_service
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", id)))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require_any_role(&principal, &Role::MANAGERS)?;

    let users = state.user_service.list(query.status).await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /api/users/me
pub async fn current_user(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
) -> Result<Json<UserDetailsResponse>, ApiError> {
    let user = find_user(&state, principal.id.as_str()).await?;
    Ok(Json(details(&state, &user).await?))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<UserDetailsResponse>, ApiError> {
    require_self_or_any_role(&principal, &id, &Role::MANAGERS)?;

    let user = find_user(&state, &id).await?;
    Ok(Json(details(&state, &user).await?))
}

/// PUT /api/users/{id}/preferences
///
/// Merges the given keys into the user's preferences. Only the user may
/// change their own preferences.
pub async fn update_preferences(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<String>,
    Json(preferences): Json<BTreeMap<String, String>>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_self_or_any_role(&principal, &id, &[])?;

    state.user_service.update_preferences(&id, preferences).await?;
    Ok(Json(MessageResponse::new("User preferences updated successfully")))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_any_role(&principal, &USER_DELETERS)?;

    if !state.user_service.delete(&id).await? {
        return Err(ApiError::not_found(format!("User '{}' not found", id)));
    }

    debug!(user_id = %id, by = %principal.id, "User deleted via API");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// PUT /api/users/{id}/team
pub async fn update_team(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateTeamBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_self_or_any_role(&principal, &id, &Role::MANAGERS)?;

    let team_id = body.team_id.as_deref().map(str::trim).filter(|t| !t.is_empty());
    state.user_service.set_team(&id, team_id).await?;

    let message = match team_id {
        Some(_) => "User team updated successfully",
        None => "User removed from team successfully",
    };
    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/users/{id}/suspend
pub async fn suspend_user(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    require_any_role(&principal, &[Role::Admin])?;

    if principal.id.as_str() == id {
        return Err(ApiError::bad_request("Cannot suspend your own account"));
    }

    let user = state.user_service.suspend(&id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/users/{id}/activate
pub async fn activate_user(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    require_any_role(&principal, &[Role::Admin])?;

    let user = state.user_service.activate(&id).await?;
    Ok(Json(UserResponse::from(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;

    #[test]
    fn test_user_response_hides_credentials() {
        let user = User::new(
            UserId::new("u-1").unwrap(),
            "jane",
            "jane@example.com",
            "$argon2id$hash",
            [Role::ProductOwner],
        );

        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();

        assert_eq!(json["username"], "jane");
        assert_eq!(json["roles"][0], "ROLE_PRODUCT_OWNER");
        assert_eq!(json["status"], "active");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email").is_none());
    }
}
