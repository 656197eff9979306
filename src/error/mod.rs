pub(crate) mod address_error;
pub(crate) mod auth_error;
pub(crate) mod authorization_error;
pub(crate) mod db_error;
pub(crate) mod request_error;
pub(crate) mod token_error;
pub(crate) mod user_error;

use axum::response::{IntoResponse, Response};

// Unified application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] auth_error::AuthError),
    #[error(transparent)]
    Authorization(#[from] authorization_error::AuthorizationError),
    #[error(transparent)]
    Token(#[from] token_error::TokenError),
    #[error(transparent)]
    User(#[from] user_error::UserError),
    #[error(transparent)]
    Address(#[from] address_error::AddressError),
    #[error(transparent)]
    Db(#[from] db_error::DbError),
    #[error(transparent)]
    Request(#[from] request_error::RequestError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use crate::response::app_response::ErrorResponse;
        use axum::http::StatusCode;

        match self {
            AppError::Auth(error) => error.into_response(),
            AppError::Authorization(error) => error.into_response(),
            AppError::Token(error) => error.into_response(),
            AppError::User(error) => error.into_response(),
            AppError::Address(error) => error.into_response(),
            AppError::Db(error) => error.into_response(),
            AppError::Request(error) => error.into_response(),
            AppError::Internal(_) => ErrorResponse::send("An internal server error occurred")
                .with_status(StatusCode::INTERNAL_SERVER_ERROR)
                .into_response(),
        }
    }
}
