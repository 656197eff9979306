use crate::response::app_response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Authorization header is missing or invalid")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("User not found for the given token")]
    UnknownPrincipal,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Refresh token has expired. Please log in again.")]
    RefreshTokenExpired,
    #[error("Token error: {0}")]
    TokenCreationError(String),
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        let status_code = match self {
            TokenError::MissingToken => StatusCode::UNAUTHORIZED,
            TokenError::InvalidToken => StatusCode::UNAUTHORIZED,
            TokenError::UnknownPrincipal => StatusCode::UNAUTHORIZED,
            TokenError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            TokenError::RefreshTokenExpired => StatusCode::UNAUTHORIZED,
            TokenError::TokenCreationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self {
            // Signing failures are internal; the detail stays in the logs
            TokenError::TokenCreationError(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        };

        ErrorResponse::send(message).with_status(status_code).into_response()
    }
}
