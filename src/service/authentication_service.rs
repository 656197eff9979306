use crate::config::logging::secure_log;
use crate::config::settings::LockoutPolicy;
use crate::dto::user_dto::UserRegisterDto;
use crate::entity::user::{User, UserStatus};
use crate::error::auth_error::AuthError;
use crate::error::db_error::DbError;
use crate::error::user_error::UserError;
use crate::error::AppError;
use crate::repository::user_repository::UserRepositoryTrait;
use crate::service::clock::Clock;
use crate::service::password_service::{PasswordHasher, PasswordPolicy};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Credential checks, lockout bookkeeping, registration and password changes.
#[derive(Clone)]
pub struct AuthenticationService {
    user_repo: Arc<dyn UserRepositoryTrait>,
    hasher: PasswordHasher,
    lockout: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl AuthenticationService {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryTrait>,
        hasher: PasswordHasher,
        lockout: LockoutPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            lockout,
            clock,
        }
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let Some(mut user) = self.user_repo.find_by_email(email).await? else {
            warn!("SECURITY: Login failed for unknown account");
            secure_log::sensitive_debug!("Unknown login email: {}", email);
            return Err(AuthError::InvalidCredentials.into());
        };

        match user.status {
            UserStatus::Disabled => {
                warn!("SECURITY: Login rejected for disabled user ID: {}", user.id);
                return Err(AuthError::AccountDisabled.into());
            }
            UserStatus::Locked => {
                let now = self.clock.now();
                if user.locked_until.is_some_and(|until| until > now) {
                    warn!("SECURITY: Login rejected for locked user ID: {}", user.id);
                    return Err(AuthError::AccountLocked.into());
                }
                user = self
                    .user_repo
                    .unlock(user.id, now)
                    .await?
                    .ok_or(AuthError::InvalidCredentials)?;
                info!("SECURITY: Lock expired, user ID: {} unlocked", user.id);
            }
            UserStatus::Active => {}
        }

        if !self.hasher.verify(password, &user.password_hash).await? {
            let now = self.clock.now();
            let lock_until = self
                .lockout
                .lock_deadline(now)
                .ok_or_else(|| AppError::Internal("Lock deadline calculation overflow".to_string()))?;
            let updated = self
                .user_repo
                .record_failed_login(user.id, self.lockout.max_failed_attempts, lock_until, now)
                .await?
                .ok_or(AuthError::InvalidCredentials)?;

            if updated.status == UserStatus::Locked {
                warn!(
                    "SECURITY: User ID: {} locked after {} failed login attempts",
                    updated.id, updated.failed_login_attempts
                );
                return Err(AuthError::AccountLocked.into());
            }

            warn!(
                "SECURITY: Failed login for user ID: {} (attempt {})",
                updated.id, updated.failed_login_attempts
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        if user.failed_login_attempts > 0 {
            self.user_repo.reset_failed_attempts(user.id, self.clock.now()).await?;
            user.failed_login_attempts = 0;
            user.locked_until = None;
        }

        info!("SECURITY: Login successful for user ID: {}", user.id);
        Ok(user)
    }

    pub async fn register(&self, payload: UserRegisterDto) -> Result<User, AppError> {
        if !PasswordPolicy::is_valid(&payload.password) {
            return Err(UserError::WeakPassword(PasswordPolicy::validation_message().to_string()).into());
        }

        if self.user_repo.email_exists(&payload.email).await? {
            secure_log::sensitive_debug!("Registration attempted with existing email: {}", payload.email);
            return Err(UserError::EmailTaken.into());
        }

        let password_hash = self.hasher.hash(&payload.password).await?;
        let user = User::new(payload.full_name, payload.email, password_hash, self.clock.now());

        match self.user_repo.insert(&user).await {
            Ok(user) => {
                info!("User registered with ID: {}", user.id);
                Ok(user)
            }
            // Lost a race with a concurrent registration of the same email
            Err(DbError::Conflict(_)) => Err(UserError::EmailTaken.into()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn change_password(&self, user_id: Uuid, current_password: &str, new_password: &str) -> Result<(), AppError> {
        if !PasswordPolicy::is_valid(new_password) {
            return Err(UserError::WeakPassword(PasswordPolicy::validation_message().to_string()).into());
        }

        let user = self
            .user_repo
            .find(user_id)
            .await?
            .ok_or(UserError::UserNotFound)?;

        if !self.hasher.verify(current_password, &user.password_hash).await? {
            warn!("SECURITY: Password change rejected for user ID: {}, current password mismatch", user_id);
            return Err(UserError::IncorrectPassword.into());
        }

        let password_hash = self.hasher.hash(new_password).await?;
        if !self.user_repo.update_password(user_id, &password_hash, self.clock.now()).await? {
            return Err(UserError::UserNotFound.into());
        }

        info!("SECURITY: Password changed for user ID: {}", user_id);
        Ok(())
    }
}
