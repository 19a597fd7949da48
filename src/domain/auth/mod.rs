//! Authentication domain types
//!
//! The principal bound to a request, the request-scoped context that carries it,
//! and the error taxonomy shared by the token codec, the resolver and the
//! session lifecycle.

mod context;
mod error;
mod principal;

pub use context::RequestAuthContext;
pub use error::{AuthError, ResolutionError, TokenError};
pub use principal::Principal;
