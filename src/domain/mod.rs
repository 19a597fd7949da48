//! Domain layer - Core business logic and entities

pub mod auth;
pub mod error;
pub mod role;
pub mod team;
pub mod user;

pub use auth::{AuthError, Principal, RequestAuthContext, ResolutionError, TokenError};
pub use error::DomainError;
pub use role::Role;
pub use team::{Team, TeamId, TeamRepository, TeamValidationError};
pub use user::{User, UserId, UserRepository, UserStatus, UserValidationError};
