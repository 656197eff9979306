use crate::dto::address_dto::{AddressDto, AddressReadDto, SetDefaultAddressDto};
use crate::error::{request_error::ValidatedRequest, AppError};
use crate::middleware::auth::CurrentUser;
use crate::response::app_response::SuccessResponse;
use crate::state::address_state::AddressState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

pub async fn list_addresses(
    State(state): State<AddressState>,
    CurrentUser(current_user): CurrentUser,
) -> Result<SuccessResponse<Vec<AddressReadDto>>, AppError> {
    let addresses = state.address_service.list_addresses(current_user.id).await?;

    Ok(SuccessResponse::send(
        "Addresses retrieved successfully",
        addresses.into_iter().map(AddressReadDto::from).collect(),
    ))
}

pub async fn get_address(
    State(state): State<AddressState>,
    CurrentUser(current_user): CurrentUser,
    Path(address_id): Path<Uuid>,
) -> Result<SuccessResponse<AddressReadDto>, AppError> {
    let address = state.address_service.get_address(current_user.id, address_id).await?;
    Ok(SuccessResponse::send("Address retrieved successfully", AddressReadDto::from(address)))
}

pub async fn create_address(
    State(state): State<AddressState>,
    CurrentUser(current_user): CurrentUser,
    ValidatedRequest(payload): ValidatedRequest<AddressDto>,
) -> Result<SuccessResponse<AddressReadDto>, AppError> {
    let address = state.address_service.create_address(current_user.id, payload).await?;

    Ok(SuccessResponse::send("Address created successfully", AddressReadDto::from(address))
        .with_status(StatusCode::CREATED))
}

pub async fn update_address(
    State(state): State<AddressState>,
    CurrentUser(current_user): CurrentUser,
    Path(address_id): Path<Uuid>,
    ValidatedRequest(payload): ValidatedRequest<AddressDto>,
) -> Result<SuccessResponse<AddressReadDto>, AppError> {
    let address = state
        .address_service
        .update_address(current_user.id, address_id, payload)
        .await?;
    Ok(SuccessResponse::send("Address updated successfully", AddressReadDto::from(address)))
}

pub async fn delete_address(
    State(state): State<AddressState>,
    CurrentUser(current_user): CurrentUser,
    Path(address_id): Path<Uuid>,
) -> Result<SuccessResponse<()>, AppError> {
    state.address_service.delete_address(current_user.id, address_id).await?;
    Ok(SuccessResponse::message_only("Address deleted successfully"))
}

pub async fn set_default_address(
    State(state): State<AddressState>,
    CurrentUser(current_user): CurrentUser,
    ValidatedRequest(payload): ValidatedRequest<SetDefaultAddressDto>,
) -> Result<SuccessResponse<AddressReadDto>, AppError> {
    let address = state
        .address_service
        .set_default_address(current_user.id, payload.address_id)
        .await?;
    Ok(SuccessResponse::send("Default address updated successfully", AddressReadDto::from(address)))
}
