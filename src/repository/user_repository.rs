use crate::config::database::{Database, DatabaseTrait};
use crate::config::logging::secure_log;
use crate::entity::user::{AdminUserChanges, User, UserStatus};
use crate::error::db_error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, full_name, email, password_hash, phone_number, role, status, \
    failed_login_attempts, locked_until, refresh_token_hash, refresh_token_expires_at, created_at, updated_at";

/// Credential store. Every mutation is a single statement so concurrent requests
/// on the same row never observe a partial update.
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<User>, DbError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError>;
    async fn find_by_refresh_token_hash(&self, refresh_token_hash: &str) -> Result<Option<User>, DbError>;
    async fn email_exists(&self, email: &str) -> Result<bool, DbError>;
    async fn find_all(&self) -> Result<Vec<User>, DbError>;
    /// Fails with `DbError::Conflict` when the email is already registered.
    async fn insert(&self, user: &User) -> Result<User, DbError>;
    async fn update_profile(
        &self,
        id: Uuid,
        full_name: &str,
        phone_number: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbError>;
    async fn admin_update(
        &self,
        id: Uuid,
        changes: &AdminUserChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbError>;
    async fn update_password(&self, id: Uuid, password_hash: &str, now: DateTime<Utc>) -> Result<bool, DbError>;
    /// Increments the failed-attempt counter and locks the account once it reaches
    /// `max_attempts`. Returns the row as written.
    async fn record_failed_login(
        &self,
        id: Uuid,
        max_attempts: i32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbError>;
    /// Clears an expired lock: status back to active, counter and deadline reset.
    async fn unlock(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<User>, DbError>;
    async fn reset_failed_attempts(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), DbError>;
    async fn store_refresh_token(
        &self,
        id: Uuid,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DbError>;
    async fn clear_refresh_token(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), DbError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DbError>;
}

#[derive(Clone)]
pub struct UserRepository {
    pub(crate) db_conn: Arc<Database>,
}

impl UserRepository {
    pub fn new(db_conn: &Arc<Database>) -> Self {
        Self {
            db_conn: Arc::clone(db_conn),
        }
    }
}

/// Logs timing on success and the error on failure, then converts to `DbError`.
fn observe<T>(label: &str, start: Instant, result: Result<T, sqlx::Error>) -> Result<T, DbError> {
    match result {
        Ok(value) => {
            secure_log::sensitive_debug!("{} completed in {:?}", label, start.elapsed());
            Ok(value)
        }
        Err(e) => {
            secure_log::secure_error!(format!("{label} failed"), e);
            Err(e.into())
        }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn find(&self, id: Uuid) -> Result<Option<User>, DbError> {
        let start = Instant::now();
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.db_conn.get_pool())
            .await;

        observe("User lookup by ID", start, result)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let start = Instant::now();
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.db_conn.get_pool())
            .await;

        observe("User lookup by email", start, result)
    }

    async fn find_by_refresh_token_hash(&self, refresh_token_hash: &str) -> Result<Option<User>, DbError> {
        let start = Instant::now();
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE refresh_token_hash = $1");
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(refresh_token_hash)
            .fetch_optional(self.db_conn.get_pool())
            .await;

        observe("User lookup by refresh token", start, result)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DbError> {
        let start = Instant::now();
        let result = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(self.db_conn.get_pool())
            .await;

        observe("Email existence check", start, result)
    }

    async fn find_all(&self) -> Result<Vec<User>, DbError> {
        let start = Instant::now();
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC");
        let result = sqlx::query_as::<_, User>(&sql)
            .fetch_all(self.db_conn.get_pool())
            .await;

        observe("User listing", start, result)
    }

    async fn insert(&self, user: &User) -> Result<User, DbError> {
        let start = Instant::now();
        let sql = format!(
            "INSERT INTO users (id, full_name, email, password_hash, phone_number, role, status, \
             failed_login_attempts, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.phone_number)
            .bind(user.role)
            .bind(user.status)
            .bind(user.failed_login_attempts)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(self.db_conn.get_pool())
            .await;

        observe("User insert", start, result)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        full_name: &str,
        phone_number: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbError> {
        let start = Instant::now();
        let sql = format!(
            "UPDATE users SET full_name = $2, phone_number = $3, updated_at = $4 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(full_name)
            .bind(phone_number)
            .bind(now)
            .fetch_optional(self.db_conn.get_pool())
            .await;

        observe("Profile update", start, result)
    }

    async fn admin_update(
        &self,
        id: Uuid,
        changes: &AdminUserChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbError> {
        let start = Instant::now();
        // $5 is the new status (or NULL): ACTIVE clears lockout state, LOCKED takes the deadline in $6
        let sql = format!(
            "UPDATE users SET \
                full_name = COALESCE($2, full_name), \
                phone_number = COALESCE($3, phone_number), \
                role = COALESCE($4, role), \
                status = COALESCE($5, status), \
                failed_login_attempts = CASE WHEN $5 = 'ACTIVE'::user_status THEN 0 ELSE failed_login_attempts END, \
                locked_until = CASE \
                    WHEN $5 = 'ACTIVE'::user_status THEN NULL \
                    WHEN $5 = 'LOCKED'::user_status THEN $6 \
                    ELSE locked_until END, \
                updated_at = $7 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&changes.full_name)
            .bind(&changes.phone_number)
            .bind(changes.role)
            .bind(changes.status)
            .bind(changes.lock_until)
            .bind(now)
            .fetch_optional(self.db_conn.get_pool())
            .await;

        observe("Admin user update", start, result)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str, now: DateTime<Utc>) -> Result<bool, DbError> {
        let start = Instant::now();
        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .bind(now)
            .execute(self.db_conn.get_pool())
            .await
            .map(|done| done.rows_affected() > 0);

        observe("Password update", start, result)
    }

    async fn record_failed_login(
        &self,
        id: Uuid,
        max_attempts: i32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbError> {
        let start = Instant::now();
        // SET expressions read the pre-update row, so the increment and the lock decision agree
        let sql = format!(
            "UPDATE users SET \
                failed_login_attempts = failed_login_attempts + 1, \
                status = CASE WHEN failed_login_attempts + 1 >= $2 THEN $3 ELSE status END, \
                locked_until = CASE WHEN failed_login_attempts + 1 >= $2 THEN $4 ELSE locked_until END, \
                updated_at = $5 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(max_attempts)
            .bind(UserStatus::Locked)
            .bind(lock_until)
            .bind(now)
            .fetch_optional(self.db_conn.get_pool())
            .await;

        observe("Failed login bookkeeping", start, result)
    }

    async fn unlock(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<User>, DbError> {
        let start = Instant::now();
        let sql = format!(
            "UPDATE users SET status = $2, failed_login_attempts = 0, locked_until = NULL, updated_at = $3 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(UserStatus::Active)
            .bind(now)
            .fetch_optional(self.db_conn.get_pool())
            .await;

        observe("Account unlock", start, result)
    }

    async fn reset_failed_attempts(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), DbError> {
        let start = Instant::now();
        let result = sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, locked_until = NULL, updated_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(self.db_conn.get_pool())
        .await
        .map(|_| ());

        observe("Failed attempt reset", start, result)
    }

    async fn store_refresh_token(
        &self,
        id: Uuid,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let start = Instant::now();
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = $2, refresh_token_expires_at = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .bind(now)
        .execute(self.db_conn.get_pool())
        .await
        .map(|_| ());

        observe("Refresh token store", start, result)
    }

    async fn clear_refresh_token(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), DbError> {
        let start = Instant::now();
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = NULL, refresh_token_expires_at = NULL, updated_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(self.db_conn.get_pool())
        .await
        .map(|_| ());

        observe("Refresh token clear", start, result)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let start = Instant::now();
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.db_conn.get_pool())
            .await
            .map(|done| done.rows_affected() > 0);

        observe("User delete", start, result)
    }
}
