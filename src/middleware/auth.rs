use crate::config::logging::secure_log;
use crate::entity::user::User;
use crate::error::{token_error::TokenError, AppError};
use crate::state::token_state::TokenState;
use axum::extract::{FromRequestParts, OriginalUri, State};
use axum::http::request::Parts;
use axum::{http, http::Request, middleware::Next, response::IntoResponse};
use tracing::info;

/// Paths reachable without a bearer token. Matched by prefix.
pub const PUBLIC_PATHS: [&str; 5] = [
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/refresh",
    "/api/auth/logout",
    "/api/health",
];

/// Per-request authentication result, stored in request extensions by [`auth`].
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub principal: Option<User>,
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|public| path.starts_with(public))
}

/// Session gate for the `/api` router.
pub async fn auth(
    State(state): State<TokenState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    // Nested routers see a stripped URI; the allow-list is written against the full path
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    if is_public_path(&path) {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            secure_log::secure_error!(format!("Missing bearer token for {path}"));
            TokenError::MissingToken
        })?
        .to_string();

    if !state.token_service.verify(&token) {
        secure_log::secure_error!(format!("Rejected invalid or expired token for {path}"));
        return Err(TokenError::InvalidToken.into());
    }

    let principal = state.token_service.principal_from_token(&token).await.ok_or_else(|| {
        secure_log::secure_error!(format!("Token for {path} does not resolve to a user"));
        TokenError::UnknownPrincipal
    })?;

    info!("SECURITY: Authenticated user ID: {} for {}", principal.id, path);
    req.extensions_mut().insert(RequestContext {
        principal: Some(principal),
    });

    Ok(next.run(req).await)
}

/// The authenticated user. Rejects with 401 when the session gate set no principal.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = TokenError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|context| context.principal.clone())
            .map(CurrentUser)
            .ok_or(TokenError::MissingToken)
    }
}
