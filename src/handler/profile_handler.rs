use crate::config::logging::secure_log;
use crate::dto::user_dto::{ChangePasswordDto, ProfileUpdateDto, UserReadDto};
use crate::error::{request_error::ValidatedRequest, AppError};
use crate::middleware::auth::CurrentUser;
use crate::response::app_response::SuccessResponse;
use crate::state::user_state::UserState;
use axum::extract::State;

pub async fn profile(
    State(state): State<UserState>,
    CurrentUser(current_user): CurrentUser,
) -> Result<SuccessResponse<UserReadDto>, AppError> {
    secure_log::sensitive_debug!("Profile accessed for email: {}", current_user.email);

    let user = state.user_service.get_profile(current_user.id).await?;
    Ok(SuccessResponse::send("Profile retrieved successfully", UserReadDto::from(user)))
}

pub async fn update_profile(
    State(state): State<UserState>,
    CurrentUser(current_user): CurrentUser,
    ValidatedRequest(payload): ValidatedRequest<ProfileUpdateDto>,
) -> Result<SuccessResponse<UserReadDto>, AppError> {
    let user = state.user_service.update_profile(current_user.id, payload).await?;
    Ok(SuccessResponse::send("Profile updated successfully", UserReadDto::from(user)))
}

pub async fn change_password(
    State(state): State<UserState>,
    CurrentUser(current_user): CurrentUser,
    ValidatedRequest(payload): ValidatedRequest<ChangePasswordDto>,
) -> Result<SuccessResponse<()>, AppError> {
    state
        .authentication_service
        .change_password(current_user.id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(SuccessResponse::message_only("Password changed successfully"))
}
