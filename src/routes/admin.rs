use crate::handler::admin_handler::{delete_user, get_user, list_users, update_user};
use crate::middleware::authorization::require_admin;
use crate::state::user_state::UserState;
use axum::{middleware, routing::get, Router};

pub fn routes() -> Router<UserState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route_layer(middleware::from_fn(require_admin))
}
