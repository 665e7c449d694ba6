use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};

use super::{Blog, Post, PostSummary};
use crate::activity::ActivityLog;
use crate::api::{internal_error, not_found, ok};
use crate::handler::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub tag: Option<String>,
}

#[derive(Debug, Serialize)]
struct PostListResponse {
    success: bool,
    posts: Vec<PostSummary>,
}

#[derive(Debug, Serialize)]
struct PostResponse {
    success: bool,
    post: Post,
}

#[derive(Debug, Serialize)]
struct SyncResponse {
    success: bool,
    message: String,
    count: i32,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    let blog = Blog::new(state.db.connection(), &state.posts_dir);

    match blog.get_all(params.tag.as_deref()).await {
        Ok(posts) => ok(PostListResponse {
            success: true,
            posts,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch posts: {}", e);
            internal_error("Failed to fetch blog posts")
        }
    }
}

pub async fn get_post(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let blog = Blog::new(state.db.connection(), &state.posts_dir);

    match blog.get_by_slug(&slug).await {
        Ok(Some(post)) => ok(PostResponse {
            success: true,
            post,
        }),
        Ok(None) => not_found("Post not found"),
        Err(e) => {
            tracing::error!("Failed to fetch post {}: {}", slug, e);
            internal_error("Failed to fetch blog post")
        }
    }
}

pub async fn sync_posts(State(state): State<AppState>) -> Response {
    let blog = Blog::new(state.db.connection(), &state.posts_dir);

    match blog.scan_and_sync().await {
        Ok(stats) => {
            let count = stats.synced();

            let log = ActivityLog::new(state.db.connection());
            if let Err(e) = log
                .log(
                    "posts_synced",
                    Some("post"),
                    None,
                    Some(serde_json::json!({ "count": count })),
                )
                .await
            {
                tracing::warn!("Failed to record posts_synced activity: {}", e);
            }

            ok(SyncResponse {
                success: true,
                message: format!("Synced {} posts", count),
                count,
            })
        }
        Err(e) => {
            tracing::error!("Failed to sync posts: {}", e);
            internal_error("Failed to sync posts")
        }
    }
}
