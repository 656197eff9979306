use crate::config::logging::secure_log;
use crate::dto::user_dto::{UserReadDto, UserRegisterDto};
use crate::error::{request_error::ValidatedRequest, AppError};
use crate::response::app_response::SuccessResponse;
use crate::state::auth_state::AuthState;
use axum::extract::State;
use axum::http::StatusCode;

pub async fn register(
    State(state): State<AuthState>,
    ValidatedRequest(payload): ValidatedRequest<UserRegisterDto>,
) -> Result<SuccessResponse<UserReadDto>, AppError> {
    secure_log::sensitive_debug!("User registration attempt for email: {}", payload.email);

    match state.authentication_service.register(payload).await {
        Ok(user) => {
            secure_log::sensitive_debug!("User registration completed for email: {}", user.email);
            Ok(SuccessResponse::send("User registered successfully", UserReadDto::from(user))
                .with_status(StatusCode::CREATED))
        }
        Err(e) => {
            secure_log::secure_error!("User registration failed", e);
            Err(e)
        }
    }
}
