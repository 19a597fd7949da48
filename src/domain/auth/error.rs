//! Authentication error taxonomy

use thiserror::Error;

use crate::domain::DomainError;

/// Failure to mint or verify a session token
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad structure, bad encoding or a signature mismatch
    #[error("Token is malformed")]
    Malformed,

    #[error("Token has expired")]
    Expired,

    /// Signed with an algorithm other than the configured one
    #[error("Token uses an unsupported signing algorithm")]
    Unsupported,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Failure to map a token subject to a live principal
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The identity no longer exists or may not sign in
    #[error("Principal not found")]
    NotFound,

    #[error("Directory lookup failed: {0}")]
    Backend(String),
}

impl From<DomainError> for ResolutionError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => Self::NotFound,
            other => Self::Backend(other.to_string()),
        }
    }
}

/// Failure reported to login and logout callers.
///
/// Messages never reveal which credential was wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Internal authentication error: {0}")]
    Internal(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(message) => Self::Internal(message),
            _ => Self::InvalidToken,
        }
    }
}

impl From<ResolutionError> for AuthError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::NotFound => Self::InvalidCredentials,
            ResolutionError::Backend(message) => Self::Internal(message),
        }
    }
}
