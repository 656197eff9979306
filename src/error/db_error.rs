use crate::response::app_response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Storage failure. The message is for logs; clients get a generic 500.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("{0}")]
    SomethingWentWrong(String),
    #[error("Unique constraint violated: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error
            && db_error.is_unique_violation()
        {
            return DbError::Conflict(db_error.message().to_string());
        }
        DbError::SomethingWentWrong(error.to_string())
    }
}

impl IntoResponse for DbError {
    fn into_response(self) -> Response {
        let status_code = match self {
            DbError::SomethingWentWrong(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DbError::Conflict(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        ErrorResponse::send("An internal server error occurred")
            .with_status(status_code)
            .into_response()
    }
}
