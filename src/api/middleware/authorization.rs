//! Extractors and role predicates over the request's auth context

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::auth::{Principal, RequestAuthContext};
use crate::domain::role::Role;

/// Extractor that requires an authenticated principal
///
/// Rejects with 401 when the request is anonymous, including when the token
/// it carried was invalid, expired or revoked.
#[derive(Debug, Clone)]
pub struct RequireUser(pub Principal);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestAuthContext>()
            .and_then(RequestAuthContext::principal)
            .cloned()
            .map(RequireUser)
            .ok_or_else(|| {
                ApiError::unauthorized(
                    "Authentication required. Provide a token via 'Authorization: Bearer <token>'",
                )
                .with_code("unauthenticated")
            })
    }
}

/// Extractor for the auth context, anonymous or not. Never rejects.
#[derive(Debug, Clone)]
pub struct CurrentAuth(pub RequestAuthContext);

impl FromRequestParts<AppState> for CurrentAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentAuth(
            parts
                .extensions
                .get::<RequestAuthContext>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}

/// 403 unless the principal holds at least one of `roles`
pub fn require_any_role(principal: &Principal, roles: &[Role]) -> Result<(), ApiError> {
    if principal.has_any_role(roles) {
        return Ok(());
    }

    debug!(user_id = %principal.id, "Insufficient role");
    Err(ApiError::forbidden("Insufficient role for this operation").with_code("forbidden"))
}

/// 403 unless the principal is `user_id` or holds one of `roles`
pub fn require_self_or_any_role(
    principal: &Principal,
    user_id: &str,
    roles: &[Role],
) -> Result<(), ApiError> {
    if principal.id.as_str() == user_id {
        return Ok(());
    }

    require_any_role(principal, roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use crate::domain::user::UserId;

    fn principal(id: &str, roles: &[Role]) -> Principal {
        Principal::new(
            UserId::new(id).unwrap(),
            "jane",
            roles.iter().copied().collect(),
        )
    }

    #[test]
    fn test_require_any_role() {
        let member = principal("u-1", &[Role::TeamMember]);
        let owner = principal("u-2", &[Role::ProductOwner]);

        assert!(require_any_role(&owner, &Role::MANAGERS).is_ok());

        let err = require_any_role(&member, &Role::MANAGERS).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_require_self_or_any_role() {
        let member = principal("u-1", &[Role::TeamMember]);

        assert!(require_self_or_any_role(&member, "u-1", &[Role::Admin]).is_ok());
        assert!(require_self_or_any_role(&member, "u-2", &[Role::Admin]).is_err());
    }
}
