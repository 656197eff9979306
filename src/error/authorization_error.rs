use crate::response::app_response::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Access denied. Admin role required.")]
    AdminRequired,
    #[error("You are not authorized to {action} this address")]
    NotOwner { action: &'static str },
}

impl IntoResponse for AuthorizationError {
    fn into_response(self) -> Response {
        ErrorResponse::send(self.to_string())
            .with_status(StatusCode::FORBIDDEN)
            .into_response()
    }
}
