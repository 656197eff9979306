pub(crate) mod address_service;
pub(crate) mod authentication_service;
pub(crate) mod clock;
pub(crate) mod password_service;
pub(crate) mod refresh_token_service;
pub(crate) mod token_service;
pub(crate) mod user_service;
