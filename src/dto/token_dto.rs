use crate::entity::user::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Access token claim set
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaimsDto {
    pub sub: String,
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequestDto {
    #[validate(length(
        min = 1,
        message = "Refresh token is required"
    ))]
    pub refresh_token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponseDto {
    pub access_token: String,
}

/// Logout body; a missing token is accepted and treated as a no-op.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequestDto {
    #[serde(default)]
    pub refresh_token: Option<String>,
}
