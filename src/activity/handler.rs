use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};

use super::{Activity, ActivityLog};
use crate::api::{internal_error, ok};
use crate::handler::AppState;

const DEFAULT_LIMIT: i32 = 50;
const MAX_LIMIT: i32 = 200;

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<i32>,
}

#[derive(Debug, Serialize)]
struct ActivityListResponse {
    success: bool,
    activities: Vec<Activity>,
}

pub async fn recent_activity(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> Response {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let log = ActivityLog::new(state.db.connection());

    match log.recent(limit).await {
        Ok(activities) => ok(ActivityListResponse {
            success: true,
            activities,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch activity: {}", e);
            internal_error("Failed to fetch activity")
        }
    }
}
