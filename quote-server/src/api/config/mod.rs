//! User Config API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/config", config_routes())
}

fn config_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).delete(handler::wipe))
        .route("/{key}", get(handler::get_by_key).put(handler::set_by_key))
}
