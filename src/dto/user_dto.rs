use crate::entity::user::{User, UserRole, UserStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserLoginDto {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    // Only presence is checked here; short or weak guesses still count as failed attempts
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRegisterDto {
    #[validate(custom(function = "crate::dto::not_blank", message = "Full name is required"))]
    #[validate(length(max = 100, message = "Full name cannot exceed 100 characters"))]
    pub full_name: String,
    #[validate(email(message = "Email format is invalid"))]
    #[validate(length(
        max = 254,
        message = "Email must not exceed 254 characters"
    ))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateDto {
    #[validate(custom(function = "crate::dto::not_blank", message = "Full name is required"))]
    #[validate(length(max = 100, message = "Full name cannot exceed 100 characters"))]
    pub full_name: String,
    #[validate(length(
        max = 20,
        message = "Phone number cannot be longer than 20 characters"
    ))]
    pub phone_number: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordDto {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Admin edit; absent fields are left unchanged.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserUpdateDto {
    #[validate(custom(function = "crate::dto::not_blank", message = "Full name is required"))]
    #[validate(length(max = 100, message = "Full name cannot exceed 100 characters"))]
    pub full_name: Option<String>,
    #[validate(length(
        max = 20,
        message = "Phone number cannot be longer than 20 characters"
    ))]
    pub phone_number: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReadDto {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserReadDto {
    fn from(model: User) -> UserReadDto {
        Self {
            id: model.id,
            full_name: model.full_name,
            email: model.email,
            phone_number: model.phone_number,
            role: model.role,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseDto {
    pub user: UserReadDto,
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for UserLoginDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLogin")
            .field("email", &self.email)
            .finish()
    }
}

impl std::fmt::Debug for UserRegisterDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRegister")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_full_name_fails_validation() {
        let profile = ProfileUpdateDto {
            full_name: "   ".to_string(),
            phone_number: None,
        };
        let errors = profile.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("full_name"));

        let admin = AdminUserUpdateDto {
            full_name: Some(" \t ".to_string()),
            ..Default::default()
        };
        let errors = admin.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("full_name"));

        let registration = UserRegisterDto {
            full_name: "  ".to_string(),
            email: "jane@example.com".to_string(),
            password: "Passw0rd".to_string(),
        };
        assert!(registration.validate().is_err());
    }

    #[test]
    fn admin_update_without_name_is_valid() {
        let admin = AdminUserUpdateDto {
            status: Some(UserStatus::Locked),
            ..Default::default()
        };
        assert!(admin.validate().is_ok());
    }
}
