use axum::{
    Router,
    routing::{get, post},
};

pub mod activity;
pub mod api;
pub mod blog;
pub mod config;
pub mod db;
pub mod error;
pub mod groceries;
pub mod handler;
pub mod sync;
pub mod todos;

use handler::AppState;

/// Assembles the full application router; `main` layers CORS on top.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handler::healthcheck))
        .route("/voice-input", post(handler::voice_input))
        .merge(todos::routes())
        .merge(groceries::routes())
        .merge(blog::routes())
        .merge(activity::routes());

    Router::new()
        .route("/", get(handler::serve_index))
        .nest("/api", api)
        .with_state(state)
}
