//! Login and logout orchestration

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::resolver::PrincipalResolver;
use super::revocation::RevocationStore;
use super::token_codec::{IssuedToken, TokenCodec};
use crate::domain::auth::{AuthError, Principal};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Checks a username/password pair against the directory
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync + Debug {
    /// Returns the user's id when the password matches an active account
    async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserId>, DomainError>;
}

/// Username and password presented at login
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[hidden]")
            .finish()
    }
}

/// Outcome of a successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: IssuedToken,
    pub principal: Principal,
}

/// Issues tokens on login and revokes them on logout
#[derive(Debug, Clone)]
pub struct SessionLifecycle {
    verifier: Arc<dyn CredentialVerifier>,
    resolver: Arc<dyn PrincipalResolver>,
    codec: Arc<TokenCodec>,
    revocations: Arc<RevocationStore>,
    ttl: Duration,
}

impl SessionLifecycle {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        resolver: Arc<dyn PrincipalResolver>,
        codec: Arc<TokenCodec>,
        revocations: Arc<RevocationStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            verifier,
            resolver,
            codec,
            revocations,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Verify credentials and mint a session token.
    ///
    /// Every credential failure is reported as
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginSession, AuthError> {
        let user_id = self
            .verifier
            .verify_password(&credentials.username, &credentials.password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Credential verification failed");
                AuthError::Internal(e.to_string())
            })?
            .ok_or_else(|| {
                debug!(username = %credentials.username, "Login rejected");
                AuthError::InvalidCredentials
            })?;

        let principal = self
            .resolver
            .resolve(user_id.as_str())
            .await?;

        let token = self.codec.issue(principal.id.as_str(), self.ttl)?;

        info!(
            user_id = %principal.id,
            username = %principal.username,
            expires_at = %token.expires_at,
            "User logged in"
        );

        Ok(LoginSession { token, principal })
    }

    pub async fn logout(&self, raw: Option<&str>) -> Result<(), AuthError> {
        self.logout_at(raw, Utc::now())
    }

    /// Revoke a token until its expiry.
    ///
    /// Idempotent. The recorded expiry is capped at `now + ttl` since the
    /// claims are read without signature validation.
    pub fn logout_at(&self, raw: Option<&str>, now: DateTime<Utc>) -> Result<(), AuthError> {
        let raw = raw
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.codec.claims(raw).map_err(|e| {
            debug!(error = %e, "Logout with unreadable token");
            AuthError::InvalidToken
        })?;

        let expires_at = claims
            .expires_at()
            .map_err(|_| AuthError::InvalidToken)?
            .min(now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC));

        self.revocations
            .revoke(TokenCodec::canonical_key(raw), expires_at);

        info!(user_id = %claims.subject(), "Session revoked");

        Ok(())
    }
}
