//! API layer - HTTP endpoints and middleware

pub mod auth;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod teams;
pub mod test_content;
pub mod types;
pub mod users;

pub use middleware::{CurrentAuth, RequireUser};
pub use router::create_router;
pub use state::AppState;
