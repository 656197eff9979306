use crate::dto::address_dto::AddressDto;
use crate::entity::address::{Address, AddressFields};
use crate::error::address_error::AddressError;
use crate::error::authorization_error::AuthorizationError;
use crate::error::AppError;
use crate::repository::address_repository::AddressRepositoryTrait;
use crate::service::clock::Clock;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Address book operations scoped to the calling user.
#[derive(Clone)]
pub struct AddressService {
    address_repo: Arc<dyn AddressRepositoryTrait>,
    clock: Arc<dyn Clock>,
}

impl AddressService {
    pub fn new(address_repo: Arc<dyn AddressRepositoryTrait>, clock: Arc<dyn Clock>) -> Self {
        Self { address_repo, clock }
    }

    pub async fn list_addresses(&self, user_id: Uuid) -> Result<Vec<Address>, AppError> {
        Ok(self.address_repo.find_by_user(user_id).await?)
    }

    pub async fn get_address(&self, user_id: Uuid, address_id: Uuid) -> Result<Address, AppError> {
        self.owned_address(user_id, address_id, "view").await
    }

    pub async fn create_address(&self, user_id: Uuid, payload: AddressDto) -> Result<Address, AppError> {
        let address = Address::new(user_id, AddressFields::from(payload), self.clock.now());
        let address = self.address_repo.insert(&address).await?;

        info!("Address {} created for user ID: {}", address.id, user_id);
        Ok(address)
    }

    pub async fn update_address(&self, user_id: Uuid, address_id: Uuid, payload: AddressDto) -> Result<Address, AppError> {
        self.owned_address(user_id, address_id, "update").await?;

        let fields = AddressFields::from(payload);
        self.address_repo
            .update(address_id, user_id, &fields, self.clock.now())
            .await?
            .ok_or_else(|| AddressError::AddressNotFound.into())
    }

    pub async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> Result<(), AppError> {
        self.owned_address(user_id, address_id, "delete").await?;

        if !self.address_repo.delete(address_id, user_id).await? {
            return Err(AddressError::AddressNotFound.into());
        }
        info!("Address {} deleted for user ID: {}", address_id, user_id);
        Ok(())
    }

    pub async fn set_default_address(&self, user_id: Uuid, address_id: Uuid) -> Result<Address, AppError> {
        self.owned_address(user_id, address_id, "modify").await?;

        if !self.address_repo.set_default(user_id, address_id, self.clock.now()).await? {
            return Err(AddressError::AddressNotFound.into());
        }
        self.owned_address(user_id, address_id, "modify").await
    }

    async fn owned_address(&self, user_id: Uuid, address_id: Uuid, action: &'static str) -> Result<Address, AppError> {
        let address = self
            .address_repo
            .find(address_id)
            .await?
            .ok_or(AddressError::AddressNotFound)?;

        if !address.is_owned_by(user_id) {
            warn!("SECURITY: User ID: {} tried to {} address {} owned by someone else", user_id, action, address_id);
            return Err(AuthorizationError::NotOwner { action }.into());
        }
        Ok(address)
    }
}
