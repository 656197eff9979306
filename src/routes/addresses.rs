use crate::handler::address_handler;
use crate::state::address_state::AddressState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn routes() -> Router<AddressState> {
    Router::new()
        .route(
            "/addresses",
            get(address_handler::list_addresses).post(address_handler::create_address),
        )
        .route("/addresses/set-default", post(address_handler::set_default_address))
        .route(
            "/addresses/{id}",
            get(address_handler::get_address)
                .put(address_handler::update_address)
                .delete(address_handler::delete_address),
        )
}
