//! Infrastructure layer - Implementations of the domain seams

pub mod auth;
pub mod logging;
pub mod team;
pub mod user;
