use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use serde::{Deserialize, Serialize};

use super::{CreateGrocery, Groceries, GroceryItem};
use crate::activity::ActivityLog;
use crate::api::{bad_request, created, internal_error, ok};
use crate::handler::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateGroceryRequest {
    pub item_name: Option<String>,
    pub quantity: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct GroceryListResponse {
    success: bool,
    groceries: Vec<GroceryItem>,
}

#[derive(Debug, Serialize)]
struct GroceryResponse {
    success: bool,
    grocery: GroceryItem,
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    success: bool,
}

pub async fn list_groceries(State(state): State<AppState>) -> Response {
    let groceries = Groceries::new(state.db.connection());

    match groceries.get_all().await {
        Ok(groceries) => ok(GroceryListResponse {
            success: true,
            groceries,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch groceries: {}", e);
            internal_error("Failed to fetch groceries")
        }
    }
}

pub async fn create_grocery(
    State(state): State<AppState>,
    Json(payload): Json<CreateGroceryRequest>,
) -> Response {
    let item_name = match payload.item_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => return bad_request("Item name is required"),
    };
    let quantity = payload.quantity.unwrap_or(1);

    let groceries = Groceries::new(state.db.connection());
    let input = CreateGrocery {
        item_name,
        quantity,
        notes: payload.notes,
    };

    match groceries.create(input).await {
        Ok(grocery) => {
            let log = ActivityLog::new(state.db.connection());
            let details =
                serde_json::json!({ "item_name": &grocery.item_name, "quantity": grocery.quantity });
            if let Err(e) = log
                .log(
                    "grocery_added",
                    Some("grocery"),
                    Some(&grocery.id.to_string()),
                    Some(details),
                )
                .await
            {
                tracing::warn!("Failed to record grocery_added activity: {}", e);
            }

            created(GroceryResponse {
                success: true,
                grocery,
            })
        }
        Err(e) => {
            tracing::error!("Failed to create grocery item: {}", e);
            internal_error("Failed to create grocery item")
        }
    }
}

pub async fn delete_grocery(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let groceries = Groceries::new(state.db.connection());

    match groceries.delete(id).await {
        Ok(()) => {
            let log = ActivityLog::new(state.db.connection());
            if let Err(e) = log
                .log("grocery_deleted", Some("grocery"), Some(&id.to_string()), None)
                .await
            {
                tracing::warn!("Failed to record grocery_deleted activity: {}", e);
            }

            ok(DeletedResponse { success: true })
        }
        Err(e) => {
            tracing::error!("Failed to delete grocery item {}: {}", id, e);
            internal_error("Failed to delete grocery item")
        }
    }
}
