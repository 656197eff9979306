use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "USER",
            UserRole::Admin => "ADMIN",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Disabled,
    Locked,
}

#[derive(Clone, Deserialize, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub refresh_token_hash: Option<String>,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered account: active, regular role, no failed attempts.
    pub fn new(full_name: String, email: String, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            full_name,
            email,
            password_hash,
            phone_number: None,
            role: UserRole::User,
            status: UserStatus::Active,
            failed_login_attempts: 0,
            locked_until: None,
            refresh_token_hash: None,
            refresh_token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        match self.role {
            UserRole::Admin => true,
            UserRole::User => false,
        }
    }

    pub fn apply_admin_changes(&mut self, changes: &AdminUserChanges, now: DateTime<Utc>) {
        if let Some(full_name) = &changes.full_name {
            self.full_name = full_name.clone();
        }
        if let Some(phone_number) = &changes.phone_number {
            self.phone_number = Some(phone_number.clone());
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(status) = changes.status {
            self.status = status;
            match status {
                UserStatus::Active => {
                    self.failed_login_attempts = 0;
                    self.locked_until = None;
                }
                UserStatus::Locked => self.locked_until = changes.lock_until,
                UserStatus::Disabled => {}
            }
        }
        self.updated_at = now;
    }
}

/// Admin-side edits. `None` leaves a field unchanged.
///
/// Moving to `Active` clears lockout bookkeeping; moving to `Locked` uses `lock_until`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminUserChanges {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub lock_until: Option<DateTime<Utc>>,
}

// Keeps the password hash and refresh token digest out of logs
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("status", &self.status)
            .field("failed_login_attempts", &self.failed_login_attempts)
            .field("locked_until", &self.locked_until)
            .finish()
    }
}
