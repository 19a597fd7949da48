//! Shared API types

pub mod error;
pub mod json;
pub mod query;

use serde::{Deserialize, Serialize};

pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
pub use query::Query;

/// Plain `{message}` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
