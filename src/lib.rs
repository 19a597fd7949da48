//! Team Directory API
//!
//! A user and team directory with:
//! - Stateless signed session tokens
//! - Server-side revocation on logout, swept once tokens expire
//! - Role-based access to directory operations

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AppState, UserServiceTrait};
use infrastructure::auth::{
    AuthenticationGate, CredentialVerifier, DirectoryPrincipalResolver, PrincipalResolver,
    RevocationStore, SessionLifecycle, TokenCodec,
};
use infrastructure::team::{InMemoryTeamRepository, TeamService};
use infrastructure::user::{Argon2Hasher, InMemoryUserRepository, SignupRequest, UserService};
use tracing::{info, warn};

/// Wire the directories, the token codec and the revocation store
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    config.auth.validate()?;

    let users = Arc::new(InMemoryUserRepository::new());
    let teams = Arc::new(InMemoryTeamRepository::new());

    let user_service = Arc::new(UserService::new(
        users.clone(),
        teams.clone(),
        Arc::new(Argon2Hasher::new()),
    ));
    let team_service = Arc::new(TeamService::new(teams, users.clone()));

    let codec = Arc::new(TokenCodec::new(config.auth.signing_secret()?));
    let revocations = Arc::new(RevocationStore::new());
    let resolver: Arc<dyn PrincipalResolver> = Arc::new(DirectoryPrincipalResolver::new(users));
    let verifier: Arc<dyn CredentialVerifier> = user_service.clone();

    let gate = AuthenticationGate::new(codec.clone(), revocations.clone(), resolver.clone())
        .with_token_prefix_logging(config.auth.log_token_prefix);

    let sessions = SessionLifecycle::new(
        verifier,
        resolver,
        codec,
        revocations.clone(),
        config.auth.token_ttl()?,
    );

    let state = AppState {
        user_service,
        team_service,
        sessions,
        gate,
        revocations,
        allow_query_token: config.auth.allow_query_token,
    };

    bootstrap_admin(state.user_service.as_ref(), config).await?;

    Ok(state)
}

/// Create the configured admin account when the directory is empty
async fn bootstrap_admin(
    user_service: &dyn UserServiceTrait,
    config: &AppConfig,
) -> anyhow::Result<()> {
    if user_service.count(None).await? > 0 {
        return Ok(());
    }

    let Some((username, email, password)) = config.bootstrap.admin() else {
        warn!("Directory is empty and no bootstrap admin is configured");
        return Ok(());
    };

    let admin = user_service
        .signup(SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            roles: vec!["admin".to_string()],
            ..Default::default()
        })
        .await?;

    info!(user_id = %admin.id(), username = %admin.username(), "Bootstrap admin created");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserStatus;

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("k".repeat(32));
        config
    }

    #[tokio::test]
    async fn test_state_requires_secret() {
        assert!(create_app_state(&AppConfig::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_directory_without_bootstrap() {
        let state = create_app_state(&config()).await.unwrap();
        assert_eq!(state.user_service.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_created() {
        let mut config = config();
        config.bootstrap.admin_username = Some("root".into());
        config.bootstrap.admin_email = Some("root@example.com".into());
        config.bootstrap.admin_password = Some("correct-horse-battery".into());

        let state = create_app_state(&config).await.unwrap();
        let users = state.user_service.list(Some(UserStatus::Active)).await.unwrap();

        assert_eq!(users.len(), 1);
        assert!(users[0].has_role(crate::domain::Role::Admin));
    }
}
