pub(crate) mod addresses;
pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod health;
pub(crate) mod profile;
pub(crate) mod root;
