//! Token subject to principal resolution

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::warn;

use crate::domain::auth::{Principal, ResolutionError};
use crate::domain::user::{UserId, UserRepository};

#[cfg(test)]
use mockall::automock;

/// Maps a verified token subject to a live principal
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PrincipalResolver: Send + Sync + Debug {
    async fn resolve(&self, subject: &str) -> Result<Principal, ResolutionError>;
}

/// Resolver backed by the user directory.
///
/// Looks the user up on every call so deletions, suspensions and role
/// changes take effect on the next request.
#[derive(Debug)]
pub struct DirectoryPrincipalResolver<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> DirectoryPrincipalResolver<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: UserRepository + 'static> PrincipalResolver for DirectoryPrincipalResolver<R> {
    async fn resolve(&self, subject: &str) -> Result<Principal, ResolutionError> {
        let id = UserId::new(subject).map_err(|_| ResolutionError::NotFound)?;

        let user = self.repository.get(&id).await.map_err(|e| {
            warn!(user_id = %id, error = %e, "Directory lookup failed during authentication");
            ResolutionError::Backend(e.to_string())
        })?;

        match user {
            Some(user) if user.is_active() => Ok(Principal::from(&user)),
            _ => Err(ResolutionError::NotFound),
        }
    }
}
