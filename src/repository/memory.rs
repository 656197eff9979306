use crate::entity::address::{Address, AddressFields};
use crate::entity::user::{AdminUserChanges, User, UserStatus};
use crate::error::db_error::DbError;
use crate::repository::address_repository::AddressRepositoryTrait;
use crate::repository::user_repository::UserRepositoryTrait;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Process-local storage backing both repositories.
///
/// Each user mutation happens under a single `DashMap` entry guard. Address
/// writes that can move the default flag are serialized by `address_lock`.
#[derive(Default)]
pub struct InMemoryStore {
    users: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
    addresses: DashMap<Uuid, Address>,
    address_lock: Mutex<()>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new instance wrapped in Arc for sharing across threads
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Runs `mutate` on the stored user and returns the updated copy.
    fn modify_user<F>(&self, id: Uuid, mutate: F) -> Option<User>
    where
        F: FnOnce(&mut User),
    {
        self.users.get_mut(&id).map(|mut user| {
            mutate(&mut user);
            user.clone()
        })
    }

    fn clear_default(&self, user_id: Uuid, keep: Uuid, now: DateTime<Utc>) {
        let current: Vec<Uuid> = self
            .addresses
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.is_default && entry.id != keep)
            .map(|entry| entry.id)
            .collect();

        for id in current {
            if let Some(mut address) = self.addresses.get_mut(&id) {
                address.is_default = false;
                address.updated_at = now;
            }
        }
    }
}

#[async_trait]
impl UserRepositoryTrait for InMemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<User>, DbError> {
        Ok(self.users.get(&id).map(|user| user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let id = match self.emails.get(email) {
            Some(id) => *id,
            None => return Ok(None),
        };
        UserRepositoryTrait::find(self, id).await
    }

    async fn find_by_refresh_token_hash(&self, refresh_token_hash: &str) -> Result<Option<User>, DbError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.refresh_token_hash.as_deref() == Some(refresh_token_hash))
            .map(|entry| entry.value().clone()))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DbError> {
        Ok(self.emails.contains_key(email))
    }

    async fn find_all(&self) -> Result<Vec<User>, DbError> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn insert(&self, user: &User) -> Result<User, DbError> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(DbError::Conflict(format!("email {} already registered", user.email))),
            Entry::Vacant(slot) => {
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(user.clone())
            }
        }
    }

    async fn update_profile(
        &self,
        id: Uuid,
        full_name: &str,
        phone_number: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbError> {
        Ok(self.modify_user(id, |user| {
            user.full_name = full_name.to_string();
            user.phone_number = phone_number.map(str::to_string);
            user.updated_at = now;
        }))
    }

    async fn admin_update(
        &self,
        id: Uuid,
        changes: &AdminUserChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbError> {
        Ok(self.modify_user(id, |user| user.apply_admin_changes(changes, now)))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str, now: DateTime<Utc>) -> Result<bool, DbError> {
        Ok(self
            .modify_user(id, |user| {
                user.password_hash = password_hash.to_string();
                user.updated_at = now;
            })
            .is_some())
    }

    async fn record_failed_login(
        &self,
        id: Uuid,
        max_attempts: i32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbError> {
        Ok(self.modify_user(id, |user| {
            user.failed_login_attempts += 1;
            if user.failed_login_attempts >= max_attempts {
                user.status = UserStatus::Locked;
                user.locked_until = Some(lock_until);
            }
            user.updated_at = now;
        }))
    }

    async fn unlock(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<User>, DbError> {
        Ok(self.modify_user(id, |user| {
            user.status = UserStatus::Active;
            user.failed_login_attempts = 0;
            user.locked_until = None;
            user.updated_at = now;
        }))
    }

    async fn reset_failed_attempts(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), DbError> {
        self.modify_user(id, |user| {
            user.failed_login_attempts = 0;
            user.locked_until = None;
            user.updated_at = now;
        });
        Ok(())
    }

    async fn store_refresh_token(
        &self,
        id: Uuid,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        self.modify_user(id, |user| {
            user.refresh_token_hash = Some(refresh_token_hash.to_string());
            user.refresh_token_expires_at = Some(expires_at);
            user.updated_at = now;
        });
        Ok(())
    }

    async fn clear_refresh_token(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), DbError> {
        self.modify_user(id, |user| {
            user.refresh_token_hash = None;
            user.refresh_token_expires_at = None;
            user.updated_at = now;
        });
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let Some((_, user)) = self.users.remove(&id) else {
            return Ok(false);
        };
        self.emails.remove(&user.email);

        let _guard = self.address_lock.lock().await;
        self.addresses.retain(|_, address| address.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl AddressRepositoryTrait for InMemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Address>, DbError> {
        let mut addresses: Vec<Address> = self
            .addresses
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        addresses.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(addresses)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Address>, DbError> {
        Ok(self.addresses.get(&id).map(|address| address.clone()))
    }

    async fn insert(&self, address: &Address) -> Result<Address, DbError> {
        let _guard = self.address_lock.lock().await;
        if address.is_default {
            self.clear_default(address.user_id, address.id, address.created_at);
        }
        self.addresses.insert(address.id, address.clone());
        Ok(address.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        fields: &AddressFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Address>, DbError> {
        let _guard = self.address_lock.lock().await;
        let owned = self
            .addresses
            .get(&id)
            .is_some_and(|address| address.is_owned_by(user_id));
        if !owned {
            return Ok(None);
        }

        if fields.is_default {
            self.clear_default(user_id, id, now);
        }

        Ok(self.addresses.get_mut(&id).map(|mut address| {
            address.recipient_name = fields.recipient_name.clone();
            address.phone_number = fields.phone_number.clone();
            address.street_address = fields.street_address.clone();
            address.city = fields.city.clone();
            address.is_default = fields.is_default;
            address.updated_at = now;
            address.clone()
        }))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, DbError> {
        let _guard = self.address_lock.lock().await;
        Ok(self
            .addresses
            .remove_if(&id, |_, address| address.is_owned_by(user_id))
            .is_some())
    }

    async fn set_default(&self, user_id: Uuid, address_id: Uuid, now: DateTime<Utc>) -> Result<bool, DbError> {
        let _guard = self.address_lock.lock().await;
        let owned = self
            .addresses
            .get(&address_id)
            .is_some_and(|address| address.is_owned_by(user_id));
        if !owned {
            return Ok(false);
        }

        self.clear_default(user_id, address_id, now);
        if let Some(mut address) = self.addresses.get_mut(&address_id) {
            address.is_default = true;
            address.updated_at = now;
        }
        Ok(true)
    }
}
