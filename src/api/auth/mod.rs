//! Authentication API endpoints
//!
//! Sign-in issues a bearer token, sign-out revokes the presented token until it
//! would have expired anyway, and sign-up registers a new directory user.

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, MessageResponse};
use crate::domain::auth::AuthError;
use crate::domain::role::Role;
use crate::infrastructure::auth::{extract_token, Credentials};
use crate::infrastructure::user::SignupRequest;

const TOKEN_TYPE: &str = "Bearer";

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signin", post(signin))
        .route("/signup", post(signup))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Sign-in request
#[derive(Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

/// Sign-in response
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<&'static str>,
    pub expires_at: String,
}

#[derive(Deserialize)]
pub struct SignupApiRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub team_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub roles: Vec<&'static str>,
}

/// POST /api/auth/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SigninRequest>,
) -> Result<Json<SigninResponse>, ApiError> {
    let credentials = Credentials::new(request.username, request.password);
    let session = state.sessions.login(&credentials).await?;

    let user = state
        .user_service
        .get(session.principal.id.as_str())
        .await?
        .ok_or_else(|| ApiError::from(AuthError::InvalidCredentials))?;

    Ok(Json(SigninResponse {
        token: session.token.token,
        token_type: TOKEN_TYPE,
        id: user.id().to_string(),
        username: user.username().to_string(),
        email: user.email().to_string(),
        roles: user.roles().iter().map(Role::authority).collect(),
        expires_at: session.token.expires_at.to_rfc3339(),
    }))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupApiRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .user_service
        .signup(SignupRequest {
            username: request.username,
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            roles: request.roles,
            team_id: request.team_id,
        })
        .await?;

    Ok(Json(MessageResponse::new("User registered successfully")))
}

/// POST /api/auth/logout
///
/// Revokes the presented token. Needs no valid session: a token that already
/// fails authentication can still be revoked as long as its claims are readable.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<MessageResponse>, ApiError> {
    let raw = extract_token(&headers, &uri, state.allow_query_token);
    state.sessions.logout(raw.as_deref()).await?;

    Ok(Json(MessageResponse::new("Logout successful")))
}

/// GET /api/auth/me
pub async fn me(RequireUser(principal): RequireUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: principal.id.to_string(),
        username: principal.username.clone(),
        roles: principal.authorities(),
    })
}

impl std::fmt::Debug for SigninRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigninRequest")
            .field("username", &self.username)
            .field("password", &"[hidden]")
            .finish()
    }
}
