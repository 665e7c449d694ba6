use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::activity::ActivityLog;
use crate::api::{bad_request, internal_error, ok};
use crate::db::Database;
use crate::groceries::{CreateGrocery, Groceries, GroceryItem};
use crate::todos::{CreateTodo, Todos};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub posts_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    success: bool,
    status: String,
    timestamp: String,
    message: String,
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(HealthResponse {
        success: true,
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        message: "daybook server is running".to_string(),
    })
}

pub async fn serve_index() -> Html<&'static str> {
    Html(
        r#"
        <!doctype html>
        <html>
            <head><title>daybook</title></head>
            <body style="font-family: system-ui; max-width: 600px; margin: 50px auto; padding: 20px;">
                <h1>daybook</h1>
                <ul>
                    <li><a href="/api/health">API health check</a></li>
                    <li><a href="/api/todos">Todos</a></li>
                    <li><a href="/api/groceries">Groceries</a></li>
                    <li><a href="/api/posts">Blog posts</a></li>
                </ul>
            </body>
        </html>
        "#,
    )
}

/// Intake endpoint for dictated capture (phone shortcuts post here). One
/// request adds a single grocery item, a batch of grocery items, or a todo,
/// chosen by the `type` field.
#[derive(Debug, Deserialize)]
pub struct VoiceInputRequest {
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    pub item: Option<String>,
    pub items: Option<Vec<String>>,
    pub text: Option<String>,
    pub quantity: Option<i64>,
    pub priority: Option<i64>,
}

#[derive(Debug, Serialize)]
struct VoiceMessageResponse {
    success: bool,
    message: String,
}

#[derive(Debug, Serialize)]
struct VoiceBatchResponse {
    success: bool,
    message: String,
    items: Vec<GroceryItem>,
}

pub async fn voice_input(
    State(state): State<AppState>,
    Json(payload): Json<VoiceInputRequest>,
) -> Response {
    match payload.input_type.as_deref() {
        Some("grocery") => {
            let item_name = match payload.item {
                Some(name) if !name.trim().is_empty() => name,
                _ => return bad_request("Item name is required"),
            };
            let groceries = Groceries::new(state.db.connection());
            let input = CreateGrocery {
                item_name: item_name.clone(),
                quantity: payload.quantity.unwrap_or(1),
                notes: None,
            };

            match groceries.create(input).await {
                Ok(grocery) => {
                    voice_activity(
                        &state,
                        "grocery_added_voice",
                        "grocery",
                        serde_json::json!({ "item_name": &grocery.item_name }),
                    )
                    .await;
                    ok(VoiceMessageResponse {
                        success: true,
                        message: format!("Added {} to grocery list", item_name),
                    })
                }
                Err(e) => {
                    tracing::error!("Failed to add voice grocery item: {}", e);
                    internal_error("Failed to process voice input")
                }
            }
        }
        Some("groceries") => {
            let items = payload.items.unwrap_or_default();
            let groceries = Groceries::new(state.db.connection());
            let mut added = Vec::new();

            for item_name in &items {
                let input = CreateGrocery {
                    item_name: item_name.clone(),
                    quantity: 1,
                    notes: None,
                };
                match groceries.create(input).await {
                    Ok(grocery) => added.push(grocery),
                    Err(e) => {
                        tracing::error!("Failed to add voice grocery item {}: {}", item_name, e);
                        return internal_error("Failed to process voice input");
                    }
                }
            }

            voice_activity(
                &state,
                "groceries_added_voice",
                "grocery",
                serde_json::json!({ "count": added.len() }),
            )
            .await;

            ok(VoiceBatchResponse {
                success: true,
                message: format!("Added {} items to grocery list", added.len()),
                items: added,
            })
        }
        Some("todo") => {
            let text = match payload.text {
                Some(t) if !t.trim().is_empty() => t,
                _ => return bad_request("Text is required"),
            };
            let todos = Todos::new(state.db.connection());
            let input = CreateTodo {
                text: text.clone(),
                priority: payload.priority.unwrap_or(0),
            };

            match todos.create(input).await {
                Ok(todo) => {
                    voice_activity(
                        &state,
                        "todo_added_voice",
                        "todo",
                        serde_json::json!({ "text": &todo.text }),
                    )
                    .await;
                    ok(VoiceMessageResponse {
                        success: true,
                        message: format!("Added TODO: {}", text),
                    })
                }
                Err(e) => {
                    tracing::error!("Failed to add voice todo: {}", e);
                    internal_error("Failed to process voice input")
                }
            }
        }
        _ => bad_request("Unknown input type"),
    }
}

async fn voice_activity(state: &AppState, action: &str, entity_type: &str, details: serde_json::Value) {
    let log = ActivityLog::new(state.db.connection());
    if let Err(e) = log.log(action, Some(entity_type), None, Some(details)).await {
        tracing::warn!("Failed to record {} activity: {}", action, e);
    }
}
