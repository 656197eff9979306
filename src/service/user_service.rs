use crate::config::settings::LockoutPolicy;
use crate::dto::user_dto::{AdminUserUpdateDto, ProfileUpdateDto};
use crate::entity::user::{AdminUserChanges, User, UserStatus};
use crate::error::user_error::UserError;
use crate::error::AppError;
use crate::repository::user_repository::UserRepositoryTrait;
use crate::service::clock::Clock;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<dyn UserRepositoryTrait>,
    lockout: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepositoryTrait>, lockout: LockoutPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            lockout,
            clock,
        }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<User, AppError> {
        self.get_user(user_id).await
    }

    pub async fn update_profile(&self, user_id: Uuid, payload: ProfileUpdateDto) -> Result<User, AppError> {
        let phone_number = payload
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty());

        let user = self
            .user_repo
            .update_profile(user_id, payload.full_name.trim(), phone_number, self.clock.now())
            .await?
            .ok_or(UserError::UserNotFound)?;

        info!("Profile updated for user ID: {}", user.id);
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.user_repo.find_all().await?)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find(user_id)
            .await?
            .ok_or_else(|| UserError::UserNotFound.into())
    }

    /// Moving an account to `Active` clears its lockout state; moving it to `Locked`
    /// starts a fresh lock period.
    pub async fn admin_update_user(&self, user_id: Uuid, payload: AdminUserUpdateDto) -> Result<User, AppError> {
        let now = self.clock.now();
        let lock_until = match payload.status {
            Some(UserStatus::Locked) => Some(
                self.lockout
                    .lock_deadline(now)
                    .ok_or_else(|| AppError::Internal("Lock deadline calculation overflow".to_string()))?,
            ),
            _ => None,
        };
        let changes = AdminUserChanges {
            full_name: payload.full_name.map(|name| name.trim().to_string()),
            phone_number: payload.phone_number.map(|phone| phone.trim().to_string()),
            role: payload.role,
            status: payload.status,
            lock_until,
        };

        let user = self
            .user_repo
            .admin_update(user_id, &changes, now)
            .await?
            .ok_or(UserError::UserNotFound)?;

        info!("SECURITY: Admin updated user ID: {} (role: {}, status: {:?})", user.id, user.role.as_str(), user.status);
        Ok(user)
    }

    pub async fn delete_user(&self, acting_admin: &User, user_id: Uuid) -> Result<(), AppError> {
        if acting_admin.id == user_id {
            return Err(UserError::CannotDeleteSelf.into());
        }

        if !self.user_repo.delete(user_id).await? {
            return Err(UserError::UserNotFound.into());
        }

        info!("SECURITY: Admin {} deleted user ID: {}", acting_admin.id, user_id);
        Ok(())
    }
}
