//! In-memory team repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::team::{Team, TeamId, TeamRepository};
use crate::domain::DomainError;

/// In-memory implementation of TeamRepository.
///
/// Team names are unique ignoring ASCII case.
#[derive(Debug, Default)]
pub struct InMemoryTeamRepository {
    teams: RwLock<HashMap<String, Team>>,
}

impl InMemoryTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(teams: &HashMap<String, Team>, team: &Team) -> bool {
    teams
        .values()
        .any(|t| t.id() != team.id() && t.name().eq_ignore_ascii_case(team.name()))
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        Ok(self.teams.read().await.get(id.as_str()).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Team>, DomainError> {
        let name = name.trim();
        let teams = self.teams.read().await;

        Ok(teams
            .values()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn create(&self, team: Team) -> Result<Team, DomainError> {
        let mut teams = self.teams.write().await;

        if teams.contains_key(team.id().as_str()) {
            return Err(DomainError::conflict(format!(
                "Team '{}' already exists",
                team.id()
            )));
        }

        if name_taken(&teams, &team) {
            return Err(DomainError::conflict(format!(
                "Team name '{}' is already in use",
                team.name()
            )));
        }

        teams.insert(team.id().as_str().to_string(), team.clone());
        Ok(team)
    }

    async fn update(&self, team: Team) -> Result<Team, DomainError> {
        let mut teams = self.teams.write().await;

        if !teams.contains_key(team.id().as_str()) {
            return Err(DomainError::not_found(format!(
                "Team '{}' not found",
                team.id()
            )));
        }

        if name_taken(&teams, &team) {
            return Err(DomainError::conflict(format!(
                "Team name '{}' is already in use",
                team.name()
            )));
        }

        teams.insert(team.id().as_str().to_string(), team.clone());
        Ok(team)
    }

    async fn delete(&self, id: &TeamId) -> Result<bool, DomainError> {
        Ok(self.teams.write().await.remove(id.as_str()).is_some())
    }

    async fn list(&self) -> Result<Vec<Team>, DomainError> {
        let mut teams: Vec<Team> = self.teams.read().await.values().cloned().collect();
        teams.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(teams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: &str, name: &str) -> Team {
        Team::new(TeamId::new(id).unwrap(), name).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryTeamRepository::new();
        repo.create(team("platform", "Platform")).await.unwrap();

        let fetched = repo.get(&TeamId::new("platform").unwrap()).await.unwrap();
        assert_eq!(fetched.unwrap().name(), "Platform");
        assert!(repo.get_by_name("PLATFORM").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_name_uniqueness_ignores_case() {
        let repo = InMemoryTeamRepository::new();
        repo.create(team("team-a", "Mobile")).await.unwrap();

        let result = repo.create(team("team-b", "mobile")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_may_keep_own_name() {
        let repo = InMemoryTeamRepository::new();
        let mut existing = repo.create(team("team-a", "Mobile")).await.unwrap();
        repo.create(team("team-b", "Web")).await.unwrap();

        existing.set_description(Some("Apps".to_string())).unwrap();
        repo.update(existing.clone()).await.unwrap();

        existing.set_name("Web").unwrap();
        assert!(matches!(
            repo.update(existing).await,
            Err(DomainError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_missing() {
        let repo = InMemoryTeamRepository::new();
        let result = repo.update(team("ghost", "Ghost")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_sorted_and_delete() {
        let repo = InMemoryTeamRepository::new();
        repo.create(team("team-b", "Web")).await.unwrap();
        repo.create(team("team-a", "Api")).await.unwrap();

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["Api", "Web"]);

        assert!(repo.delete(&TeamId::new("team-a").unwrap()).await.unwrap());
        assert!(!repo.exists(&TeamId::new("team-a").unwrap()).await.unwrap());
    }
}
