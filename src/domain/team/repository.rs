//! Team repository trait

use async_trait::async_trait;

use super::entity::{Team, TeamId};
use crate::domain::DomainError;

/// Repository for managing teams
#[async_trait]
pub trait TeamRepository: Send + Sync + std::fmt::Debug {
    /// Get a team by ID
    async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError>;

    /// Get a team by its (case-insensitive) name
    async fn get_by_name(&self, name: &str) -> Result<Option<Team>, DomainError>;

    /// Create a new team
    async fn create(&self, team: Team) -> Result<Team, DomainError>;

    /// Update an existing team
    async fn update(&self, team: Team) -> Result<Team, DomainError>;

    /// Delete a team by ID
    async fn delete(&self, id: &TeamId) -> Result<bool, DomainError>;

    /// List all teams ordered by name
    async fn list(&self) -> Result<Vec<Team>, DomainError>;

    /// Check if a team exists
    async fn exists(&self, id: &TeamId) -> Result<bool, DomainError> {
        Ok(self.get(id).await?.is_some())
    }
}
