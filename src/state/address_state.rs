use crate::service::address_service::AddressService;

#[derive(Clone)]
pub struct AddressState {
    pub address_service: AddressService,
}

impl AddressState {
    pub fn new(address_service: AddressService) -> Self {
        Self { address_service }
    }
}
