use axum::{
    Router,
    routing::{delete, get, post},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groceries", get(handler::list_groceries))
        .route("/groceries", post(handler::create_grocery))
        .route("/groceries/:id", delete(handler::delete_grocery))
}
