//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::team::TeamId;
use crate::domain::user::{User, UserId, UserRepository, UserStatus};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Directory {
    users: HashMap<String, User>,
    /// username -> user ID
    by_username: HashMap<String, String>,
    /// lowercased email -> user ID
    by_email: HashMap<String, String>,
}

impl Directory {
    fn insert(&mut self, user: User) {
        let id = user.id().as_str().to_string();
        self.by_username.insert(user.username().to_string(), id.clone());
        self.by_email.insert(email_key(user.email()), id.clone());
        self.users.insert(id, user);
    }

    fn check_unique(&self, user: &User) -> Result<(), DomainError> {
        let id = user.id().as_str();
        let taken_by_other = |owner: Option<&String>| owner.is_some_and(|owner| owner != id);

        if taken_by_other(self.by_username.get(user.username())) {
            return Err(DomainError::conflict(format!(
                "Username '{}' is already taken",
                user.username()
            )));
        }

        if taken_by_other(self.by_email.get(&email_key(user.email()))) {
            return Err(DomainError::conflict("Email is already in use"));
        }

        Ok(())
    }

    fn lookup(&self, index: &HashMap<String, String>, key: &str) -> Option<User> {
        index.get(key).and_then(|id| self.users.get(id)).cloned()
    }
}

fn email_key(email: &str) -> String {
    email.to_ascii_lowercase()
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    directory: RwLock<Directory>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let mut directory = Directory::default();
        for user in users {
            directory.insert(user);
        }

        Self {
            directory: RwLock::new(directory),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.directory.read().await.users.get(id.as_str()).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let directory = self.directory.read().await;
        Ok(directory.lookup(&directory.by_username, username))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let directory = self.directory.read().await;
        Ok(directory.lookup(&directory.by_email, &email_key(email)))
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut directory = self.directory.write().await;

        if directory.users.contains_key(user.id().as_str()) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                user.id()
            )));
        }
        directory.check_unique(&user)?;

        directory.insert(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut directory = self.directory.write().await;

        let Some(old) = directory.users.get(user.id().as_str()) else {
            return Err(DomainError::not_found(format!("User '{}' not found", user.id())));
        };
        let old_username = old.username().to_string();
        let old_email = email_key(old.email());

        directory.check_unique(user)?;

        directory.by_username.remove(&old_username);
        directory.by_email.remove(&old_email);
        directory.insert(user.clone());

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut directory = self.directory.write().await;

        match directory.users.remove(id.as_str()) {
            Some(user) => {
                directory.by_username.remove(user.username());
                directory.by_email.remove(&email_key(user.email()));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError> {
        let directory = self.directory.read().await;

        let mut users: Vec<User> = directory
            .users
            .values()
            .filter(|u| status.is_none_or(|s| u.status() == s))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username().cmp(b.username()));

        Ok(users)
    }

    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<User>, DomainError> {
        let directory = self.directory.read().await;

        let mut members: Vec<User> = directory
            .users
            .values()
            .filter(|u| u.team_id() == Some(team_id))
            .cloned()
            .collect();
        members.sort_by(|a, b| a.username().cmp(b.username()));

        Ok(members)
    }

    async fn clear_team(&self, team_id: &TeamId) -> Result<usize, DomainError> {
        let mut directory = self.directory.write().await;
        let mut cleared = 0;

        for user in directory
            .users
            .values_mut()
            .filter(|u| u.team_id() == Some(team_id))
        {
            user.set_team(None);
            cleared += 1;
        }

        Ok(cleared)
    }

    async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError> {
        let directory = self.directory.read().await;

        Ok(directory
            .users
            .values()
            .filter(|u| status.is_none_or(|s| u.status() == s))
            .count())
    }

    async fn record_login(&self, id: &UserId) -> Result<(), DomainError> {
        let mut directory = self.directory.write().await;

        match directory.users.get_mut(id.as_str()) {
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
    async fn test_create_and_lookup() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user("user-1", "alice")).await.unwrap();

        let id = UserId::new("user-1").unwrap();
        assert_eq!(repo.get(&id).await.unwrap().unwrap().username(), "alice");
        assert!(repo.get_by_username("alice").await.unwrap().is_some());
        assert!(repo.get_by_email("ALICE@example.com").await.unwrap().is_some());
        assert!(repo.get_by_username("bobby").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_username_and_email_uniqueness() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user("user-1", "alice")).await.unwrap();

        let same_name = create_test_user("user-2", "alice");
        assert!(matches!(
            repo.create(same_name).await,
            Err(DomainError::Conflict { .. })
        ));

        let same_email = User::new(
            UserId::new("user-3").unwrap(),
            "alicia",
            "Alice@Example.com",
            "hash",
            [],
        );
        assert!(matches!(
            repo.create(same_email).await,
            Err(DomainError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_indices_in_sync() {
        let repo = InMemoryUserRepository::new();
        let mut user = create_test_user("user-1", "alice");
        repo.create(user.clone()).await.unwrap();

        user.merge_preferences([("theme".to_string(), "dark".to_string())]);
        repo.update(&user).await.unwrap();

        let stored = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.preferences().get("theme").map(String::as_str), Some("dark"));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let result = repo.update(&create_test_user("user-1", "alice")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_frees_username() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user("user-1", "alice")).await.unwrap();

        assert!(repo.delete(&UserId::new("user-1").unwrap()).await.unwrap());
        assert!(!repo.delete(&UserId::new("user-1").unwrap()).await.unwrap());
        assert!(!repo.username_exists("alice").await.unwrap());

        repo.create(create_test_user("user-2", "alice")).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_sorted_and_filtered() {
        let mut suspended = create_test_user("user-3", "carol");
        suspended.suspend();
        let repo = InMemoryUserRepository::with_users(vec![
            create_test_user("user-2", "bobby"),
            create_test_user("user-1", "alice"),
            suspended,
        ]);

        let names: Vec<String> = repo
            .list(None)
            .await
            .unwrap()
            .iter()
            .map(|u| u.username().to_string())
            .collect();
        assert_eq!(names, vec!["alice", "bobby", "carol"]);

        assert_eq!(repo.count(Some(UserStatus::Active)).await.unwrap(), 2);
        assert_eq!(repo.count(Some(UserStatus::Suspended)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_team_membership() {
        let team = TeamId::new("platform").unwrap();
        let repo = InMemoryUserRepository::with_users(vec![
            create_test_user("user-1", "alice").with_team(Some(team.clone())),
            create_test_user("user-2", "bobby").with_team(Some(team.clone())),
            create_test_user("user-3", "carol"),
        ]);

        assert_eq!(repo.list_by_team(&team).await.unwrap().len(), 2);
        assert_eq!(repo.clear_team(&team).await.unwrap(), 2);
        assert!(repo.list_by_team(&team).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_login() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user("user-1", "alice")).await.unwrap();

        let id = UserId::new("user-1").unwrap();
        repo.record_login(&id).await.unwrap();

        assert!(repo.get(&id).await.unwrap().unwrap().last_login_at().is_some());
    }
}
