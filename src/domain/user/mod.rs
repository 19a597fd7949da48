//! User domain
//!
//! Directory users, their validation rules and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId, UserStatus};
pub use repository::UserRepository;
pub use validation::{
    validate_email, validate_password, validate_user_id, validate_username, UserValidationError,
};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
