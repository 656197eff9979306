use crate::dto::token_dto::{LogoutRequestDto, RefreshTokenRequestDto, RefreshTokenResponseDto};
use crate::error::{request_error::ValidatedRequest, AppError};
use crate::response::app_response::SuccessResponse;
use crate::state::auth_state::AuthState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

/// Exchange a refresh token for a new access token
pub async fn refresh_token(
    State(state): State<AuthState>,
    ValidatedRequest(payload): ValidatedRequest<RefreshTokenRequestDto>,
) -> Result<SuccessResponse<RefreshTokenResponseDto>, AppError> {
    let access_token = state.refresh_token_service.refresh(&payload.refresh_token).await?;

    Ok(SuccessResponse::send(
        "Token refreshed successfully",
        RefreshTokenResponseDto { access_token },
    ))
}

/// Always succeeds; a missing or malformed body is treated as an empty logout.
pub async fn logout(
    State(state): State<AuthState>,
    payload: Result<Json<LogoutRequestDto>, JsonRejection>,
) -> SuccessResponse<()> {
    let payload = payload.map(|Json(body)| body).unwrap_or_default();

    state
        .refresh_token_service
        .logout(payload.refresh_token.as_deref())
        .await;

    SuccessResponse::message_only("Logged out successfully")
}
