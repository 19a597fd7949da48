//! API middleware components

pub mod authentication;
pub mod authorization;
pub mod logging;

pub use authentication::{authentication_middleware, context_of};
pub use authorization::{require_any_role, require_self_or_any_role, CurrentAuth, RequireUser};
pub use logging::{logging_middleware, redact_query_token};
