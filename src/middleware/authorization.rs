use crate::error::{authorization_error::AuthorizationError, AppError};
use crate::middleware::auth::CurrentUser;
use axum::{http::Request, middleware::Next, response::IntoResponse};
use tracing::warn;

/// Route-level gate for admin endpoints. Runs after the session gate.
pub async fn require_admin(
    CurrentUser(current_user): CurrentUser,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    if !current_user.is_admin() {
        warn!(
            "SECURITY: User ID: {} denied access to admin route {}",
            current_user.id,
            req.uri().path()
        );
        return Err(AuthorizationError::AdminRequired.into());
    }

    Ok(next.run(req).await)
}
