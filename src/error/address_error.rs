use crate::response::app_response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address not found")]
    AddressNotFound,
}

impl IntoResponse for AddressError {
    fn into_response(self) -> Response {
        let status_code = match self {
            AddressError::AddressNotFound => StatusCode::NOT_FOUND,
        };

        ErrorResponse::send(self.to_string()).with_status(status_code).into_response()
    }
}
