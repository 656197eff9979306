use crate::config::logging::secure_log;
use crate::dto::user_dto::{LoginResponseDto, UserLoginDto, UserReadDto};
use crate::error::{request_error::ValidatedRequest, AppError};
use crate::middleware::auth::CurrentUser;
use crate::response::app_response::SuccessResponse;
use crate::state::auth_state::AuthState;
use axum::extract::State;

pub async fn login(
    State(state): State<AuthState>,
    ValidatedRequest(payload): ValidatedRequest<UserLoginDto>,
) -> Result<SuccessResponse<LoginResponseDto>, AppError> {
    secure_log::sensitive_debug!("Login attempt for email: {}", payload.email);

    let user = state
        .authentication_service
        .authenticate(&payload.email, &payload.password)
        .await?;

    let access_token = state.token_service.issue_access_token(&user)?;
    let refresh_token = state.refresh_token_service.issue_refresh_token(&user).await?;

    Ok(SuccessResponse::send(
        "Login successful",
        LoginResponseDto {
            user: UserReadDto::from(user),
            access_token,
            refresh_token,
        },
    ))
}

/// Reaching this handler means the session gate accepted the token.
pub async fn verify(CurrentUser(current_user): CurrentUser) -> SuccessResponse<UserReadDto> {
    SuccessResponse::send("Token is valid", UserReadDto::from(current_user))
}
