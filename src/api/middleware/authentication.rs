//! Per-request authentication
//!
//! Runs the [`AuthenticationGate`](crate::infrastructure::auth::AuthenticationGate)
//! on every request and stores the resulting [`RequestAuthContext`] in the
//! request extensions. Handlers read it back through the extractors in
//! [`super::authorization`].

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::auth::RequestAuthContext;
use crate::infrastructure::auth::extract_token;

/// Authenticate the request, if it carries a token.
///
/// Invalid, expired, revoked or orphaned tokens leave the request anonymous.
/// Only a directory backend failure short-circuits with a 500.
pub async fn authentication_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let candidate = extract_token(request.headers(), request.uri(), state.allow_query_token);

    let context = match state.gate.authenticate(candidate.as_deref()).await {
        Ok(outcome) => outcome.into_context(),
        Err(e) => return ApiError::internal(e).into_response(),
    };

    request.extensions_mut().insert(context);

    next.run(request).await
}

/// Read the context stored by [`authentication_middleware`].
///
/// A request that never went through the middleware is anonymous.
pub fn context_of<B>(request: &Request<B>) -> RequestAuthContext {
    request
        .extensions()
        .get::<RequestAuthContext>()
        .cloned()
        .unwrap_or_default()
}
