pub(crate) mod address_repository;
pub(crate) mod memory;
pub(crate) mod user_repository;

use crate::config::database::Database;
use address_repository::{AddressRepository, AddressRepositoryTrait};
use memory::InMemoryStore;
use std::sync::Arc;
use user_repository::{UserRepository, UserRepositoryTrait};

/// The storage backend selected at startup, shared by every service.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepositoryTrait>,
    pub addresses: Arc<dyn AddressRepositoryTrait>,
    /// Present only for the Postgres backend; used by the health check.
    pub database: Option<Arc<Database>>,
}

impl Stores {
    pub fn postgres(db_conn: Arc<Database>) -> Self {
        Self {
            users: Arc::new(UserRepository::new(&db_conn)),
            addresses: Arc::new(AddressRepository::new(&db_conn)),
            database: Some(db_conn),
        }
    }

    pub fn in_memory() -> Self {
        let store = InMemoryStore::new_shared();
        Self {
            users: store.clone(),
            addresses: store,
            database: None,
        }
    }
}
