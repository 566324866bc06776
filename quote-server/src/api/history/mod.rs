//! Price History API 模块

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/history", history_routes())
}

fn history_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).delete(handler::delete_all))
        .route("/{id}", delete(handler::delete_by_id))
        .route("/by-product/{product_id}", delete(handler::delete_by_product))
}
