use crate::handler::profile_handler;
use crate::state::user_state::UserState;
use axum::{
    routing::{get, put},
    Router,
};

pub fn routes() -> Router<UserState> {
    Router::new()
        .route(
            "/users/profile",
            get(profile_handler::profile).put(profile_handler::update_profile),
        )
        .route("/users/change-password", put(profile_handler::change_password))
}
