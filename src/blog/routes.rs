use axum::{
    Router,
    routing::{get, post},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(handler::list_posts))
        .route("/posts/sync", post(handler::sync_posts))
        .route("/posts/:slug", get(handler::get_post))
}
