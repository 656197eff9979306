use crate::dto::user_dto::{AdminUserUpdateDto, UserReadDto};
use crate::error::{request_error::ValidatedRequest, AppError};
use crate::middleware::auth::CurrentUser;
use crate::response::app_response::SuccessResponse;
use crate::state::user_state::UserState;
use axum::extract::{Path, State};
use tracing::info;
use uuid::Uuid;

pub async fn list_users(State(state): State<UserState>) -> Result<SuccessResponse<Vec<UserReadDto>>, AppError> {
    let users = state.user_service.list_users().await?;

    Ok(SuccessResponse::send(
        "Users retrieved successfully",
        users.into_iter().map(UserReadDto::from).collect(),
    ))
}

pub async fn get_user(
    State(state): State<UserState>,
    Path(user_id): Path<Uuid>,
) -> Result<SuccessResponse<UserReadDto>, AppError> {
    let user = state.user_service.get_user(user_id).await?;
    Ok(SuccessResponse::send("User retrieved successfully", UserReadDto::from(user)))
}

pub async fn update_user(
    State(state): State<UserState>,
    CurrentUser(current_user): CurrentUser,
    Path(user_id): Path<Uuid>,
    ValidatedRequest(payload): ValidatedRequest<AdminUserUpdateDto>,
) -> Result<SuccessResponse<UserReadDto>, AppError> {
    info!("SECURITY: Admin user ID: {} updating user ID: {}", current_user.id, user_id);

    let user = state.user_service.admin_update_user(user_id, payload).await?;
    Ok(SuccessResponse::send("User updated successfully", UserReadDto::from(user)))
}

pub async fn delete_user(
    State(state): State<UserState>,
    CurrentUser(current_user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<SuccessResponse<()>, AppError> {
    state.user_service.delete_user(&current_user, user_id).await?;
    Ok(SuccessResponse::message_only("User deleted successfully"))
}
