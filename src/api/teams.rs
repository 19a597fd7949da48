//! Team directory endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::{require_any_role, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, MessageResponse};
use crate::api::users::UserResponse;
use crate::domain::role::Role;
use crate::domain::team::Team;
use crate::infrastructure::team::{CreateTeamRequest, UpdateTeamRequest};

/// Roles allowed to delete teams
const TEAM_DELETERS: [Role; 2] = [Role::Admin, Role::ScrumMaster];

pub fn create_teams_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_teams).post(create_team))
        .route("/{id}", get(get_team).put(update_team).delete(delete_team))
        .route("/{id}/members/{user_id}", put(add_member).delete(remove_member))
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamApiRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTeamApiRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<UserResponse>,
    pub created_at: String,
    pub updated_at: String,
}

async fn team_response(state: &AppState, team: &Team) -> Result<TeamResponse, ApiError> {
    let members = state.team_service.members(team.id().as_str()).await?;

    Ok(TeamResponse {
        id: team.id().to_string(),
        name: team.name().to_string(),
        description: team.description().map(String::from),
        members: members.iter().map(UserResponse::from).collect(),
        created_at: team.created_at().to_rfc3339(),
        updated_at: team.updated_at().to_rfc3339(),
    })
}

/// GET /api/teams
pub async fn list_teams(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
) -> Result<Json<Vec<TeamResponse>>, ApiError> {
    let teams = state.team_service.list().await?;

    let mut responses = Vec::with_capacity(teams.len());
    for team in &teams {
        responses.push(team_response(&state, team).await?);
    }

    Ok(Json(responses))
}

/// GET /api/teams/{id}
pub async fn get_team(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state
        .team_service
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Team '{}' not found", id)))?;

    Ok(Json(team_response(&state, &team).await?))
}

/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Json(request): Json<CreateTeamApiRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    require_any_role(&principal, &Role::MANAGERS)?;

    debug!(name = %request.name, by = %principal.id, "Creating team via API");

    let team = state
        .team_service
        .create(CreateTeamRequest {
            name: request.name,
            description: request.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(team_response(&state, &team).await?)))
}

/// PUT /api/teams/{id}
pub async fn update_team(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateTeamApiRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    require_any_role(&principal, &Role::MANAGERS)?;

    let team = state
        .team_service
        .update(
            &id,
            UpdateTeamRequest {
                name: request.name,
                description: request.description,
            },
        )
        .await?;

    Ok(Json(team_response(&state, &team).await?))
}

/// DELETE /api/teams/{id}
///
/// Members are detached, not deleted.
pub async fn delete_team(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_any_role(&principal, &TEAM_DELETERS)?;

    if !state.team_service.delete(&id).await? {
        return Err(ApiError::not_found(format!("Team '{}' not found", id)));
    }

    Ok(Json(MessageResponse::new("Team deleted successfully")))
}

/// PUT /api/teams/{id}/members/{user_id}
pub async fn add_member(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_any_role(&principal, &Role::MANAGERS)?;

    state.team_service.add_member(&id, &user_id).await?;
    Ok(Json(MessageResponse::new("User added to team successfully")))
}

/// DELETE /api/teams/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_any_role(&principal, &Role::MANAGERS)?;

    state.team_service.remove_member(&id, &user_id).await?;
    Ok(Json(MessageResponse::new("User removed from team successfully")))
}
