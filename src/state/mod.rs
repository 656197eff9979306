pub(crate) mod address_state;
pub(crate) mod auth_state;
pub(crate) mod health_state;
pub(crate) mod token_state;
pub(crate) mod user_state;
