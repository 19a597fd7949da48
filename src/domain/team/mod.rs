//! Team domain module
//!
//! Teams group directory users. A user belongs to at most one team.

mod entity;
mod repository;
mod validation;

pub use entity::{Team, TeamId};
pub use repository::TeamRepository;
pub use validation::{
    validate_team_description, validate_team_id, validate_team_name, TeamValidationError,
};
