use crate::entity::address::{Address, AddressFields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    #[validate(custom(function = "crate::dto::not_blank", message = "Recipient name is required"))]
    #[validate(length(max = 100, message = "Recipient name cannot exceed 100 characters"))]
    pub recipient_name: String,
    #[validate(custom(function = "crate::dto::not_blank", message = "Phone number is required"))]
    #[validate(length(max = 20, message = "Phone number cannot exceed 20 characters"))]
    pub phone_number: String,
    #[validate(custom(function = "crate::dto::not_blank", message = "Street address is required"))]
    #[validate(length(max = 255, message = "Street address cannot exceed 255 characters"))]
    pub street_address: String,
    #[validate(custom(function = "crate::dto::not_blank", message = "City is required"))]
    #[validate(length(max = 100, message = "City cannot exceed 100 characters"))]
    pub city: String,
    #[serde(default)]
    pub is_default: Option<bool>,
}

impl From<AddressDto> for AddressFields {
    fn from(dto: AddressDto) -> Self {
        Self {
            recipient_name: dto.recipient_name.trim().to_string(),
            phone_number: dto.phone_number.trim().to_string(),
            street_address: dto.street_address.trim().to_string(),
            city: dto.city.trim().to_string(),
            is_default: dto.is_default.unwrap_or(false),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetDefaultAddressDto {
    pub address_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressReadDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipient_name: String,
    pub phone_number: String,
    pub street_address: String,
    pub city: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Address> for AddressReadDto {
    fn from(model: Address) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            recipient_name: model.recipient_name,
            phone_number: model.phone_number,
            street_address: model.street_address,
            city: model.city,
            is_default: model.is_default,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
