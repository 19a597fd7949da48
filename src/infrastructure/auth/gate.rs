//! Per-request authentication pipeline

use std::sync::Arc;

use axum::extract::Query;
use axum::http::{header, HeaderMap, Uri};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::resolver::PrincipalResolver;
use super::revocation::RevocationStore;
use super::token_codec::TokenCodec;
use crate::domain::auth::{Principal, RequestAuthContext, ResolutionError, TokenError};

const TOKEN_PREFIX_LEN: usize = 10;

#[derive(Debug, Deserialize)]
struct TokenParam {
    token: Option<String>,
}

/// Extract the candidate token of a request.
///
/// Sources, in order:
/// - Authorization header: `Bearer <token>`
/// - `token` query parameter, when `allow_query` is set
///
/// A header with another scheme is not a candidate and an empty bearer value
/// counts as absent.
pub fn extract_token(headers: &HeaderMap, uri: &Uri, allow_query: bool) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    if !allow_query {
        return None;
    }

    Query::<TokenParam>::try_from_uri(uri)
        .ok()
        .and_then(|Query(param)| param.token)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Why a presented token did not authenticate the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Token(TokenError),
    Revoked,
    UnknownPrincipal,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(e) => write!(f, "{}", e),
            Self::Revoked => write!(f, "token has been revoked"),
            Self::UnknownPrincipal => write!(f, "principal no longer exists"),
        }
    }
}

/// Result of running the gate on one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Principal),
    Rejected(RejectReason),
    /// No token was presented
    Anonymous,
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Context bound to the request; rejected and anonymous requests carry
    /// an unauthenticated one
    pub fn into_context(self) -> RequestAuthContext {
        match self {
            Self::Authenticated(principal) => RequestAuthContext::authenticated(principal),
            Self::Rejected(_) | Self::Anonymous => RequestAuthContext::anonymous(),
        }
    }
}

/// Verifies a candidate token and resolves its principal.
///
/// Reads the revocation store, never writes it.
#[derive(Debug, Clone)]
pub struct AuthenticationGate {
    codec: Arc<TokenCodec>,
    revocations: Arc<RevocationStore>,
    resolver: Arc<dyn PrincipalResolver>,
    log_token_prefix: bool,
}

impl AuthenticationGate {
    pub fn new(
        codec: Arc<TokenCodec>,
        revocations: Arc<RevocationStore>,
        resolver: Arc<dyn PrincipalResolver>,
    ) -> Self {
        Self {
            codec,
            revocations,
            resolver,
            log_token_prefix: false,
        }
    }

    /// Include a short token prefix in rejection logs
    pub fn with_token_prefix_logging(mut self, enabled: bool) -> Self {
        self.log_token_prefix = enabled;
        self
    }

    pub async fn authenticate(
        &self,
        candidate: Option<&str>,
    ) -> Result<AuthOutcome, ResolutionError> {
        self.authenticate_at(candidate, Utc::now()).await
    }

    /// Run the gate as of `now`.
    ///
    /// Only a directory backend failure is returned as an error; every token
    /// problem becomes [`AuthOutcome::Rejected`].
    pub async fn authenticate_at(
        &self,
        candidate: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AuthOutcome, ResolutionError> {
        let Some(raw) = candidate.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(AuthOutcome::Anonymous);
        };

        let claims = match self.codec.verify_at(raw, now) {
            Ok(claims) => claims,
            Err(e) => return Ok(self.reject(raw, RejectReason::Token(e))),
        };

        if self
            .revocations
            .is_revoked_at(&TokenCodec::canonical_key(raw), now)
        {
            return Ok(self.reject(raw, RejectReason::Revoked));
        }

        match self.resolver.resolve(claims.subject()).await {
            Ok(principal) => {
                debug!(user_id = %principal.id, "Request authenticated");
                Ok(AuthOutcome::Authenticated(principal))
            }
            Err(ResolutionError::NotFound) => {
                Ok(self.reject(raw, RejectReason::UnknownPrincipal))
            }
            Err(e) => Err(e),
        }
    }

    fn reject(&self, raw: &str, reason: RejectReason) -> AuthOutcome {
        if self.log_token_prefix {
            let prefix: String = raw.chars().take(TOKEN_PREFIX_LEN).collect();
            debug!(reason = %reason, token_prefix = %prefix, "Token rejected");
        } else {
            debug!(reason = %reason, "Token rejected");
        }

        AuthOutcome::Rejected(reason)
    }
}
