//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId, UserStatus};
use crate::domain::team::TeamId;
use crate::domain::DomainError;

/// Repository trait for user storage
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their username (for login)
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by their email address
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Update an existing user
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Delete a user
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;

    /// List all users (optionally filtered by status)
    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError>;

    /// List the members of a team
    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<User>, DomainError>;

    /// Detach every member from a team, returning how many were detached
    async fn clear_team(&self, team_id: &TeamId) -> Result<usize, DomainError>;

    /// Count users (optionally filtered by status)
    async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError>;

    /// Check if a username exists
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    /// Check if an email exists
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_email(email).await?.is_some())
    }

    /// Record a login for a user
    async fn record_login(&self, id: &UserId) -> Result<(), DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock user repository for testing
    #[derive(Debug, Default)]
    pub struct MockUserRepository {
        users: Arc<RwLock<HashMap<String, User>>>,
        should_fail: Arc<RwLock<bool>>,
    }

    impl MockUserRepository {
        /// Create a new mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Set whether operations should fail
        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.write().await = fail;
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            if *self.should_fail.read().await {
                return Err(DomainError::storage("Mock repository configured to fail"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
            self.check_should_fail().await?;
            Ok(self.users.read().await.get(id.as_str()).cloned())
        }

        async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
            self.check_should_fail().await?;
            let users = self.users.read().await;
            Ok(users.values().find(|u| u.username() == username).cloned())
        }

        async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
            self.check_should_fail().await?;
            let users = self.users.read().await;
            Ok(users
                .values()
                .find(|u| u.email().eq_ignore_ascii_case(email))
                .cloned())
        }

        async fn create(&self, user: User) -> Result<User, DomainError> {
            self.check_should_fail().await?;
            let mut users = self.users.write().await;
            let id = user.id().as_str().to_string();

            if users.contains_key(&id) {
                return Err(DomainError::conflict(format!(
                    "User with ID '{}' already exists",
                    id
                )));
            }

            if users.values().any(|u| u.username() == user.username()) {
                return Err(DomainError::conflict(format!(
                    "Username '{}' already exists",
                    user.username()
                )));
            }

            users.insert(id, user.clone());
            Ok(user)
        }

        async fn update(&self, user: &User) -> Result<User, DomainError> {
            self.check_should_fail().await?;
            let mut users = self.users.write().await;
            let id = user.id().as_str().to_string();

            if !users.contains_key(&id) {
                return Err(DomainError::not_found(format!("User '{}' not found", id)));
            }

            users.insert(id, user.clone());
            Ok(user.clone())
        }

        async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
            self.check_should_fail().await?;
            Ok(self.users.write().await.remove(id.as_str()).is_some())
        }

        async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError> {
            self.check_should_fail().await?;
            let users = self.users.read().await;

            Ok(users
                .values()
                .filter(|u| status.is_none_or(|s| u.status() == s))
                .cloned()
                .collect())
        }

        async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<User>, DomainError> {
            self.check_should_fail().await?;
            let users = self.users.read().await;

            Ok(users
                .values()
                .filter(|u| u.team_id() == Some(team_id))
                .cloned()
                .collect())
        }

        async fn clear_team(&self, team_id: &TeamId) -> Result<usize, DomainError> {
            self.check_should_fail().await?;
            let mut users = self.users.write().await;
            let mut cleared = 0;

            for user in users.values_mut().filter(|u| u.team_id() == Some(team_id)) {
                user.set_team(None);
                cleared += 1;
            }

            Ok(cleared)
        }

        async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError> {
            Ok(self.list(status).await?.len())
        }

        async fn record_login(&self, id: &UserId) -> Result<(), DomainError> {
            self.check_should_fail().await?;
            let mut users = self.users.write().await;

            match users.get_mut(id.as_str()) {
                Some(user) => {
                    user.record_login();
                    Ok(())
                }
                None => Err(DomainError::not_found(format!("User '{}' not found", id))),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::domain::role::Role;

        fn create_test_user(id: &str, username: &str) -> User {
            User::new(
                UserId::new(id).unwrap(),
                username,
                format!("{}@example.com", username),
                "hashed_password",
                [Role::TeamMember],
            )
        }

        #[tokio::test]
        async fn test_create_and_get() {
            let repo = MockUserRepository::new();
            let user = create_test_user("user-1", "testuser");

            repo.create(user.clone()).await.unwrap();

            let retrieved = repo.get(user.id()).await.unwrap();
            assert_eq!(retrieved.unwrap().username(), "testuser");
        }

        #[tokio::test]
        async fn test_username_uniqueness() {
            let repo = MockUserRepository::new();

            repo.create(create_test_user("user-1", "testuser")).await.unwrap();
            let result = repo.create(create_test_user("user-2", "testuser")).await;

            assert!(matches!(result, Err(DomainError::Conflict { .. })));
        }

        #[tokio::test]
        async fn test_email_lookup_ignores_case() {
            let repo = MockUserRepository::new();
            repo.create(create_test_user("user-1", "testuser")).await.unwrap();

            assert!(repo.email_exists("TestUser@Example.com").await.unwrap());
            assert!(!repo.email_exists("other@example.com").await.unwrap());
        }

        #[tokio::test]
        async fn test_team_membership() {
            let repo = MockUserRepository::new();
            let team = TeamId::new("platform").unwrap();

            repo.create(create_test_user("user-1", "alice").with_team(Some(team.clone())))
                .await
                .unwrap();
            repo.create(create_test_user("user-2", "bobby")).await.unwrap();

            assert_eq!(repo.list_by_team(&team).await.unwrap().len(), 1);
            assert_eq!(repo.clear_team(&team).await.unwrap(), 1);
            assert!(repo.list_by_team(&team).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_should_fail() {
            let repo = MockUserRepository::new();
            repo.set_should_fail(true).await;

            let result = repo.get(&UserId::new("user-1").unwrap()).await;
            assert!(matches!(result, Err(DomainError::Storage { .. })));
        }
    }
}
