use crate::response::app_response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UserError {
    #[error("User not found")]
    UserNotFound,
    #[error("Email already exists")]
    EmailTaken,
    #[error("{0}")]
    WeakPassword(String),
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("Admin cannot delete their own account.")]
    CannotDeleteSelf,
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status_code = match self {
            UserError::UserNotFound => StatusCode::NOT_FOUND,
            UserError::EmailTaken => StatusCode::BAD_REQUEST,
            UserError::WeakPassword(_) => StatusCode::BAD_REQUEST,
            UserError::IncorrectPassword => StatusCode::BAD_REQUEST,
            UserError::CannotDeleteSelf => StatusCode::BAD_REQUEST,
        };

        ErrorResponse::send(self.to_string()).with_status(status_code).into_response()
    }
}
