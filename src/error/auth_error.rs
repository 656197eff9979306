use crate::response::app_response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Login failures. Unknown email and wrong password share `InvalidCredentials`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account is temporarily locked due to too many failed login attempts. Please try again later.")]
    AccountLocked,
    #[error("Account is disabled")]
    AccountDisabled,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status_code = match self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::AccountLocked => StatusCode::UNAUTHORIZED,
            AuthError::AccountDisabled => StatusCode::UNAUTHORIZED,
        };

        ErrorResponse::send(self.to_string()).with_status(status_code).into_response()
    }
}
