use crate::config::database::{Database, DatabaseTrait};
use crate::config::logging::secure_log;
use crate::entity::address::{Address, AddressFields};
use crate::error::db_error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const ADDRESS_COLUMNS: &str =
    "id, user_id, recipient_name, phone_number, street_address, city, is_default, created_at, updated_at";

/// Address book storage. Writes that touch the default flag run in one
/// transaction so a user never ends up with two default addresses.
#[async_trait]
pub trait AddressRepositoryTrait: Send + Sync {
    /// Default address first, then by creation time.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Address>, DbError>;
    async fn find(&self, id: Uuid) -> Result<Option<Address>, DbError>;
    async fn insert(&self, address: &Address) -> Result<Address, DbError>;
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        fields: &AddressFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Address>, DbError>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, DbError>;
    /// Returns `false` without changing anything when the address is not the user's.
    async fn set_default(&self, user_id: Uuid, address_id: Uuid, now: DateTime<Utc>) -> Result<bool, DbError>;
}

#[derive(Clone)]
pub struct AddressRepository {
    pub(crate) db_conn: Arc<Database>,
}

impl AddressRepository {
    pub fn new(db_conn: &Arc<Database>) -> Self {
        Self {
            db_conn: Arc::clone(db_conn),
        }
    }
}

fn log_failure(label: &str, e: sqlx::Error) -> DbError {
    secure_log::secure_error!(format!("{label} failed"), e);
    e.into()
}

async fn clear_default(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    keep: Uuid,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE addresses SET is_default = FALSE, updated_at = $3 WHERE user_id = $1 AND id <> $2 AND is_default")
        .bind(user_id)
        .bind(keep)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl AddressRepositoryTrait for AddressRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Address>, DbError> {
        let start = Instant::now();
        let sql = format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 \
             ORDER BY is_default DESC, created_at ASC, id ASC"
        );
        let addresses = sqlx::query_as::<_, Address>(&sql)
            .bind(user_id)
            .fetch_all(self.db_conn.get_pool())
            .await
            .map_err(|e| log_failure("Address listing", e))?;

        secure_log::sensitive_debug!("Listed {} addresses in {:?}", addresses.len(), start.elapsed());
        Ok(addresses)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Address>, DbError> {
        let sql = format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1");
        sqlx::query_as::<_, Address>(&sql)
            .bind(id)
            .fetch_optional(self.db_conn.get_pool())
            .await
            .map_err(|e| log_failure("Address lookup", e))
    }

    async fn insert(&self, address: &Address) -> Result<Address, DbError> {
        let mut tx = self
            .db_conn
            .get_pool()
            .begin()
            .await
            .map_err(|e| log_failure("Address insert", e))?;

        if address.is_default {
            clear_default(&mut tx, address.user_id, address.id, address.created_at)
                .await
                .map_err(|e| log_failure("Address insert", e))?;
        }

        let sql = format!(
            "INSERT INTO addresses (id, user_id, recipient_name, phone_number, street_address, city, \
             is_default, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {ADDRESS_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Address>(&sql)
            .bind(address.id)
            .bind(address.user_id)
            .bind(&address.recipient_name)
            .bind(&address.phone_number)
            .bind(&address.street_address)
            .bind(&address.city)
            .bind(address.is_default)
            .bind(address.created_at)
            .bind(address.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| log_failure("Address insert", e))?;

        tx.commit().await.map_err(|e| log_failure("Address insert", e))?;
        Ok(inserted)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        fields: &AddressFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Address>, DbError> {
        let mut tx = self
            .db_conn
            .get_pool()
            .begin()
            .await
            .map_err(|e| log_failure("Address update", e))?;

        if fields.is_default {
            clear_default(&mut tx, user_id, id, now)
                .await
                .map_err(|e| log_failure("Address update", e))?;
        }

        let sql = format!(
            "UPDATE addresses SET recipient_name = $3, phone_number = $4, street_address = $5, city = $6, \
             is_default = $7, updated_at = $8 \
             WHERE id = $1 AND user_id = $2 RETURNING {ADDRESS_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Address>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(&fields.recipient_name)
            .bind(&fields.phone_number)
            .bind(&fields.street_address)
            .bind(&fields.city)
            .bind(fields.is_default)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| log_failure("Address update", e))?;

        // Dropping the transaction rolls back the default reset
        if updated.is_some() {
            tx.commit().await.map_err(|e| log_failure("Address update", e))?;
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, DbError> {
        sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.db_conn.get_pool())
            .await
            .map(|done| done.rows_affected() > 0)
            .map_err(|e| log_failure("Address delete", e))
    }

    async fn set_default(&self, user_id: Uuid, address_id: Uuid, now: DateTime<Utc>) -> Result<bool, DbError> {
        let mut tx = self
            .db_conn
            .get_pool()
            .begin()
            .await
            .map_err(|e| log_failure("Default address swap", e))?;

        clear_default(&mut tx, user_id, address_id, now)
            .await
            .map_err(|e| log_failure("Default address swap", e))?;

        let rows = sqlx::query("UPDATE addresses SET is_default = TRUE, updated_at = $3 WHERE id = $2 AND user_id = $1")
            .bind(user_id)
            .bind(address_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| log_failure("Default address swap", e))?
            .rows_affected();

        if rows == 0 {
            tx.rollback().await.map_err(|e| log_failure("Default address swap", e))?;
            return Ok(false);
        }

        tx.commit().await.map_err(|e| log_failure("Default address swap", e))?;
        Ok(true)
    }
}
