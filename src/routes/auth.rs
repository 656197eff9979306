use crate::handler::{auth_handler, refresh_handler, register_handler};
use crate::state::auth_state::AuthState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn routes() -> Router<AuthState> {
    Router::<AuthState>::new()
        .route("/auth/register", post(register_handler::register))
        .route("/auth/login", post(auth_handler::login))
        .route("/auth/refresh", post(refresh_handler::refresh_token))
        .route("/auth/logout", post(refresh_handler::logout))
        .route("/auth/verify", get(auth_handler::verify))
}
