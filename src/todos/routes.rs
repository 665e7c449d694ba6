use axum::{
    Router,
    routing::{delete, get, post},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(handler::list_todos))
        .route("/todos", post(handler::create_todo))
        .route("/todos/:id/complete", post(handler::complete_todo))
        .route("/todos/:id", delete(handler::delete_todo))
}
