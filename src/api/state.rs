//! Application state for shared services

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::team::TeamRepository;
use crate::domain::user::UserRepository;
use crate::domain::{DomainError, Team, User, UserStatus};
use crate::infrastructure::auth::{AuthenticationGate, RevocationStore, SessionLifecycle};
use crate::infrastructure::team::{CreateTeamRequest, TeamService, UpdateTeamRequest};
use crate::infrastructure::user::{PasswordHasher, SignupRequest, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub team_service: Arc<dyn TeamServiceTrait>,
    pub sessions: SessionLifecycle,
    pub gate: AuthenticationGate,
    pub revocations: Arc<RevocationStore>,
    /// Accept `?token=` when no bearer header is sent
    pub allow_query_token: bool,
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn signup(&self, request: SignupRequest) -> Result<User, DomainError>;
    async fn get(&self, id: &str) -> Result<Option<User>, DomainError>;
    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError>;
    async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError>;
    async fn update_preferences(
        &self,
        id: &str,
        preferences: BTreeMap<String, String>,
    ) -> Result<User, DomainError>;
    async fn set_team(&self, id: &str, team_id: Option<&str>) -> Result<User, DomainError>;
    async fn suspend(&self, id: &str) -> Result<User, DomainError>;
    async fn activate(&self, id: &str) -> Result<User, DomainError>;
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
}

/// Trait for team service operations
#[async_trait::async_trait]
pub trait TeamServiceTrait: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Team>, DomainError>;
    async fn list(&self) -> Result<Vec<Team>, DomainError>;
    async fn create(&self, request: CreateTeamRequest) -> Result<Team, DomainError>;
    async fn update(&self, id: &str, request: UpdateTeamRequest) -> Result<Team, DomainError>;
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
    async fn members(&self, id: &str) -> Result<Vec<User>, DomainError>;
    async fn add_member(&self, id: &str, user_id: &str) -> Result<User, DomainError>;
    async fn remove_member(&self, id: &str, user_id: &str) -> Result<User, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}

#[async_trait::async_trait]
impl<R, T, H> UserServiceTrait for UserService<R, T, H>
where
    R: UserRepository + 'static,
    T: TeamRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn signup(&self, request: SignupRequest) -> Result<User, DomainError> {
        UserService::signup(self, request).await
    }

    async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError> {
        UserService::list(self, status).await
    }

    async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError> {
        UserService::count(self, status).await
    }

    async fn update_preferences(
        &self,
        id: &str,
        preferences: BTreeMap<String, String>,
    ) -> Result<User, DomainError> {
        UserService::update_preferences(self, id, preferences).await
    }

    async fn set_team(&self, id: &str, team_id: Option<&str>) -> Result<User, DomainError> {
        UserService::set_team(self, id, team_id).await
    }

    async fn suspend(&self, id: &str) -> Result<User, DomainError> {
        UserService::suspend(self, id).await
    }

    async fn activate(&self, id: &str) -> Result<User, DomainError> {
        UserService::activate(self, id).await
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        UserService::delete(self, id).await
    }
}

#[async_trait::async_trait]
impl<R, U> TeamServiceTrait for TeamService<R, U>
where
    R: TeamRepository + 'static,
    U: UserRepository + 'static,
{
    async fn get(&self, id: &str) -> Result<Option<Team>, DomainError> {
        TeamService::get(self, id).await
    }

    async fn list(&self) -> Result<Vec<Team>, DomainError> {
        TeamService::list(self).await
    }

    async fn create(&self, request: CreateTeamRequest) -> Result<Team, DomainError> {
        TeamService::create(self, request).await
    }

    async fn update(&self, id: &str, request: UpdateTeamRequest) -> Result<Team, DomainError> {
        TeamService::update(self, id, request).await
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        TeamService::delete(self, id).await
    }

    async fn members(&self, id: &str) -> Result<Vec<User>, DomainError> {
        TeamService::members(self, id).await
    }

    async fn add_member(&self, id: &str, user_id: &str) -> Result<User, DomainError> {
        TeamService::add_member(self, id, user_id).await
    }

    async fn remove_member(&self, id: &str, user_id: &str) -> Result<User, DomainError> {
        TeamService::remove_member(self, id, user_id).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        TeamService::count(self).await
    }
}
