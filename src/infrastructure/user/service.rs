//! User service for registration, lookup and profile management

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::role::Role;
use crate::domain::team::{TeamId, TeamRepository};
use crate::domain::user::{
    validate_email, validate_password, validate_username, User, UserId, UserRepository,
    UserStatus,
};
use crate::domain::DomainError;
use crate::infrastructure::auth::CredentialVerifier;

use super::password::PasswordHasher;

const MAX_PREFERENCES: usize = 50;
const MAX_PREFERENCE_KEY_LENGTH: usize = 64;
const MAX_PREFERENCE_VALUE_LENGTH: usize = 512;

/// Request for registering a new user
#[derive(Clone, Default)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Signup role names (`admin`, `scrum_master`, `product_owner`, ...)
    pub roles: Vec<String>,
    pub team_id: Option<String>,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[hidden]")
            .field("roles", &self.roles)
            .field("team_id", &self.team_id)
            .finish()
    }
}

/// User service for directory users
#[derive(Debug)]
pub struct UserService<R: UserRepository, T: TeamRepository, H: PasswordHasher> {
    repository: Arc<R>,
    teams: Arc<T>,
    hasher: Arc<H>,
}

impl<R: UserRepository, T: TeamRepository, H: PasswordHasher> UserService<R, T, H> {
    /// Create a new user service
    pub fn new(repository: Arc<R>, teams: Arc<T>, hasher: Arc<H>) -> Self {
        Self {
            repository,
            teams,
            hasher,
        }
    }

    /// Register a new user.
    ///
    /// Unknown role names map to team member. A team id that does not name an
    /// existing team is ignored.
    pub async fn signup(&self, request: SignupRequest) -> Result<User, DomainError> {
        let username = request.username.trim();
        let email = request.email.trim();

        validate_username(username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_email(email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.username_exists(username).await? {
            return Err(DomainError::conflict("Username is already taken"));
        }

        if self.repository.email_exists(email).await? {
            return Err(DomainError::conflict("Email is already in use"));
        }

        let team_id = match request.team_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => self.existing_team(id).await?,
            _ => None,
        };

        let roles: Vec<Role> = request
            .roles
            .iter()
            .map(|name| Role::from_signup_name(name))
            .collect();

        let password_hash = self.hasher.hash(&request.password)?;

        let user = User::new(UserId::generate(), username, email, password_hash, roles)
            .with_names(non_blank(request.first_name), non_blank(request.last_name))
            .with_team(team_id);

        let user = self.repository.create(user).await?;

        info!(
            user_id = %user.id(),
            username = %user.username(),
            roles = ?user.roles(),
            "User registered"
        );

        Ok(user)
    }

    /// Authenticate a user with username and password
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(user) = self.repository.get_by_username(username.trim()).await? else {
            self.hasher.verify_dummy(password);
            return Ok(None);
        };

        if !self.hasher.verify(password, user.password_hash()) || !user.is_active() {
            return Ok(None);
        }

        self.repository.record_login(user.id()).await?;

        // Re-fetch user to get updated last_login_at
        self.repository.get(user.id()).await
    }

    /// Get a user by ID
    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        let user_id = parse_user_id(id)?;
        self.repository.get(&user_id).await
    }

    /// List all users
    pub async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError> {
        self.repository.list(status).await
    }

    /// Count users
    pub async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError> {
        self.repository.count(status).await
    }

    /// Merge preferences into a user's preference map
    pub async fn update_preferences(
        &self,
        id: &str,
        preferences: BTreeMap<String, String>,
    ) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;

        for (key, value) in &preferences {
            if key.trim().is_empty() || key.len() > MAX_PREFERENCE_KEY_LENGTH {
                return Err(DomainError::validation(format!(
                    "Preference keys must be 1 to {} characters",
                    MAX_PREFERENCE_KEY_LENGTH
                )));
            }
            if value.len() > MAX_PREFERENCE_VALUE_LENGTH {
                return Err(DomainError::validation(format!(
                    "Preference '{}' exceeds {} characters",
                    key, MAX_PREFERENCE_VALUE_LENGTH
                )));
            }
        }

        let merged = user
            .preferences()
            .keys()
            .chain(preferences.keys())
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        if merged > MAX_PREFERENCES {
            return Err(DomainError::validation(format!(
                "A user can store at most {} preferences",
                MAX_PREFERENCES
            )));
        }

        user.merge_preferences(preferences);
        debug!(user_id = %user.id(), "Preferences updated");

        self.repository.update(&user).await
    }

    /// Move a user into a team, or out of any team with `None`
    pub async fn set_team(&self, id: &str, team_id: Option<&str>) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;

        let team = match team_id {
            Some(team_id) => Some(
                self.existing_team(team_id)
                    .await?
                    .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", team_id)))?,
            ),
            None => None,
        };

        user.set_team(team);
        info!(user_id = %user.id(), team_id = ?user.team_id(), "User team changed");

        self.repository.update(&user).await
    }

    /// Suspend a user; their tokens stop resolving on the next request
    pub async fn suspend(&self, id: &str) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;
        user.suspend();
        info!(user_id = %user.id(), "User suspended");
        self.repository.update(&user).await
    }

    /// Activate a suspended user
    pub async fn activate(&self, id: &str) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;
        user.activate();
        info!(user_id = %user.id(), "User activated");
        self.repository.update(&user).await
    }

    /// Delete a user
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let user_id = parse_user_id(id)?;
        let deleted = self.repository.delete(&user_id).await?;

        if deleted {
            info!(user_id = %user_id, "User deleted");
        }

        Ok(deleted)
    }

    async fn require(&self, id: &str) -> Result<User, DomainError> {
        let user_id = parse_user_id(id)?;
        self.repository
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }

    async fn existing_team(&self, id: &str) -> Result<Option<TeamId>, DomainError> {
        let Ok(team_id) = TeamId::new(id) else {
            return Ok(None);
        };

        Ok(self.teams.exists(&team_id).await?.then_some(team_id))
    }
}

#[async_trait]
impl<R, T, H> CredentialVerifier for UserService<R, T, H>
where
    R: UserRepository + 'static,
    T: TeamRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserId>, DomainError> {
        Ok(self
            .authenticate(username, password)
            .await?
            .map(|user| user.id().clone()))
    }
}

fn parse_user_id(id: &str) -> Result<UserId, DomainError> {
    UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
