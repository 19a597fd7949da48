//! Team service for team management

use std::sync::Arc;

use tracing::info;

use crate::domain::team::{Team, TeamId, TeamRepository};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// Request for creating a new team
#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Request for updating a team. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Team service for managing teams and their membership
#[derive(Debug)]
pub struct TeamService<R: TeamRepository, U: UserRepository> {
    repository: Arc<R>,
    users: Arc<U>,
}

impl<R: TeamRepository, U: UserRepository> TeamService<R, U> {
    /// Create a new team service
    pub fn new(repository: Arc<R>, users: Arc<U>) -> Self {
        Self { repository, users }
    }

    /// Create a new team with a generated ID
    pub async fn create(&self, request: CreateTeamRequest) -> Result<Team, DomainError> {
        info!(name = %request.name, "Creating team");

        let team = Team::new(TeamId::generate(), &request.name)
            .and_then(|team| team.with_description(request.description))
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.get_by_name(team.name()).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "Team name '{}' is already in use",
                team.name()
            )));
        }

        self.repository.create(team).await
    }

    /// Get a team by ID
    pub async fn get(&self, id: &str) -> Result<Option<Team>, DomainError> {
        let team_id = parse_team_id(id)?;
        self.repository.get(&team_id).await
    }

    /// List all teams
    pub async fn list(&self) -> Result<Vec<Team>, DomainError> {
        self.repository.list().await
    }

    /// Update a team
    pub async fn update(&self, id: &str, request: UpdateTeamRequest) -> Result<Team, DomainError> {
        info!(id = %id, "Updating team");

        let mut team = self.require(id).await?;

        if let Some(name) = request.name {
            team.set_name(name)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        if let Some(description) = request.description {
            team.set_description(Some(description))
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        self.repository.update(team).await
    }

    /// Delete a team, detaching its members first
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let team_id = parse_team_id(id)?;

        if !self.repository.exists(&team_id).await? {
            return Ok(false);
        }

        let detached = self.users.clear_team(&team_id).await?;
        let deleted = self.repository.delete(&team_id).await?;

        info!(id = %team_id, detached, "Team deleted");

        Ok(deleted)
    }

    /// List the members of a team
    pub async fn members(&self, id: &str) -> Result<Vec<User>, DomainError> {
        let team = self.require(id).await?;
        self.users.list_by_team(team.id()).await
    }

    /// Move a user into this team
    pub async fn add_member(&self, id: &str, user_id: &str) -> Result<User, DomainError> {
        let team = self.require(id).await?;
        let mut user = self.require_user(user_id).await?;

        user.set_team(Some(team.id().clone()));
        info!(team_id = %team.id(), user_id = %user.id(), "Member added");

        self.users.update(&user).await
    }

    /// Remove a user from this team
    pub async fn remove_member(&self, id: &str, user_id: &str) -> Result<User, DomainError> {
        let team = self.require(id).await?;
        let mut user = self.require_user(user_id).await?;

        if user.team_id() != Some(team.id()) {
            return Err(DomainError::validation(format!(
                "User '{}' is not a member of team '{}'",
                user.id(),
                team.id()
            )));
        }

        user.set_team(None);
        info!(team_id = %team.id(), user_id = %user.id(), "Member removed");

        self.users.update(&user).await
    }

    /// Number of teams, used by readiness checks
    pub async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.repository.list().await?.len())
    }

    async fn require(&self, id: &str) -> Result<Team, DomainError> {
        let team_id = parse_team_id(id)?;
        self.repository
            .get(&team_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))
    }

    async fn require_user(&self, id: &str) -> Result<User, DomainError> {
        let user_id = UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.users
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }
}

fn parse_team_id(id: &str) -> Result<TeamId, DomainError> {
    TeamId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))
}
