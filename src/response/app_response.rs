use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Success envelope shared by every endpoint:
/// `{ "success": true, "message": ..., "data": ..., "status": 200 }`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub status: u16,
}

impl<T> SuccessResponse<T> {
    /// Create a success response with default 200 OK status
    pub fn send(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            status: StatusCode::OK.as_u16(),
        }
    }

    /// Set custom status code (builder pattern)
    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status = status_code.as_u16();
        self
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK)
    }
}

impl SuccessResponse<()> {
    /// Success without a payload; `data` is omitted from the body
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            status: StatusCode::OK.as_u16(),
        }
    }
}

impl<T> IntoResponse for SuccessResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Error envelope: `{ "success": false, "message": ..., "errors": {field: message}, "status": 400 }`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    pub status: u16,
}

impl ErrorResponse {
    /// Create an error response with default 400 Bad Request status
    pub fn send(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
            status: StatusCode::BAD_REQUEST.as_u16(),
        }
    }

    /// Create a 400 response carrying per-field validation messages
    pub fn with_validation_errors(
        message: impl Into<String>,
        errors: BTreeMap<String, String>,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: Some(errors),
            status: StatusCode::BAD_REQUEST.as_u16(),
        }
    }

    /// Set custom status code (builder pattern)
    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status = status_code.as_u16();
        self
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_omits_missing_data() {
        let body = serde_json::to_value(SuccessResponse::message_only("Logged out successfully")).unwrap();

        assert_eq!(
            body,
            json!({"success": true, "message": "Logged out successfully", "status": 200})
        );
    }

    #[test]
    fn success_status_is_mirrored_in_body() {
        let response = SuccessResponse::send("created", json!({"id": 1})).with_status(StatusCode::CREATED);

        assert_eq!(response.status, 201);
        assert_eq!(response.into_response().status(), StatusCode::CREATED);
    }

    #[test]
    fn error_envelope_carries_field_errors() {
        let mut errors = BTreeMap::new();
        errors.insert("email".to_string(), "Email format is invalid".to_string());
        let body = serde_json::to_value(ErrorResponse::with_validation_errors("Validation failed", errors)).unwrap();

        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Validation failed",
                "errors": {"email": "Email format is invalid"},
                "status": 400
            })
        );
    }
}
