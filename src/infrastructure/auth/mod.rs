//! Authentication infrastructure module
//!
//! Stateless session tokens with server-side revocation: the token codec,
//! the revocation store and its sweeper, principal resolution, the
//! per-request gate and the login/logout lifecycle.

mod gate;
mod resolver;
mod revocation;
mod session;
mod token_codec;

pub use gate::{extract_token, AuthOutcome, AuthenticationGate, RejectReason};
pub use resolver::{DirectoryPrincipalResolver, PrincipalResolver};
pub use revocation::{RevocationStore, RevocationSweeper};
pub use session::{CredentialVerifier, Credentials, LoginSession, SessionLifecycle};
pub use token_codec::{Claims, IssuedToken, TokenCodec};
