use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use serde::{Deserialize, Serialize};

use super::{CreateTodo, Todo, Todos};
use crate::activity::ActivityLog;
use crate::api::{bad_request, created, internal_error, ok};
use crate::handler::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub text: Option<String>,
    pub priority: Option<i64>,
}

#[derive(Debug, Serialize)]
struct TodoListResponse {
    success: bool,
    todos: Vec<Todo>,
}

#[derive(Debug, Serialize)]
struct TodoResponse {
    success: bool,
    todo: Todo,
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    success: bool,
}

pub async fn list_todos(State(state): State<AppState>) -> Response {
    let todos = Todos::new(state.db.connection());

    match todos.get_all().await {
        Ok(todos) => ok(TodoListResponse {
            success: true,
            todos,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch todos: {}", e);
            internal_error("Failed to fetch todos")
        }
    }
}

pub async fn create_todo(
    State(state): State<AppState>,
    Json(payload): Json<CreateTodoRequest>,
) -> Response {
    let text = match payload.text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return bad_request("Text is required"),
    };
    let priority = payload.priority.unwrap_or(0);

    let todos = Todos::new(state.db.connection());

    match todos.create(CreateTodo { text, priority }).await {
        Ok(todo) => {
            record_activity(
                &state,
                "todo_added",
                &todo.id.to_string(),
                serde_json::json!({ "text": &todo.text, "priority": todo.priority }),
            )
            .await;
            created(TodoResponse {
                success: true,
                todo,
            })
        }
        Err(e) => {
            tracing::error!("Failed to create todo: {}", e);
            internal_error("Failed to create todo")
        }
    }
}

pub async fn complete_todo(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let todos = Todos::new(state.db.connection());

    match todos.complete(id).await {
        Ok(todo) => {
            record_activity(
                &state,
                "todo_completed",
                &id.to_string(),
                serde_json::Value::Null,
            )
            .await;
            ok(TodoResponse {
                success: true,
                todo,
            })
        }
        Err(e) => {
            tracing::error!("Failed to complete todo {}: {}", id, e);
            internal_error("Failed to complete todo")
        }
    }
}

pub async fn delete_todo(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let todos = Todos::new(state.db.connection());

    match todos.delete(id).await {
        Ok(()) => {
            record_activity(
                &state,
                "todo_deleted",
                &id.to_string(),
                serde_json::Value::Null,
            )
            .await;
            ok(DeletedResponse { success: true })
        }
        Err(e) => {
            tracing::error!("Failed to delete todo {}: {}", id, e);
            internal_error("Failed to delete todo")
        }
    }
}

async fn record_activity(state: &AppState, action: &str, entity_id: &str, details: serde_json::Value) {
    let log = ActivityLog::new(state.db.connection());
    let details = if details.is_null() { None } else { Some(details) };

    if let Err(e) = log.log(action, Some("todo"), Some(entity_id), details).await {
        tracing::warn!("Failed to record {} activity: {}", action, e);
    }
}
