use std::sync::Arc;

use axum::Router;
use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use daybook::db::Database;
use daybook::handler::AppState;

async fn test_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let posts_dir = dir.path().join("posts");
    std::fs::create_dir_all(&posts_dir).unwrap();

    let db = Database::new(&dir.path().join("test.db")).await.unwrap();
    let state = AppState {
        db: Arc::new(db),
        posts_dir,
    };

    (daybook::app(state), dir)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn delete_request(uri: &str) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn write_post(dir: &std::path::Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

// --- health ---

#[tokio::test]
async fn health_returns_ok() {
    let (app, _dir) = test_app().await;
    let resp = app.oneshot(get_request("/api/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "ok");
}

// --- groceries ---

#[tokio::test]
async fn list_groceries_empty() {
    let (app, _dir) = test_app().await;
    let resp = app.oneshot(get_request("/api/groceries")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["groceries"], serde_json::json!([]));
}

#[tokio::test]
async fn create_grocery_returns_201() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/groceries",
            r#"{"item_name":"eggs","quantity":12}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["grocery"]["item_name"], "eggs");
    assert_eq!(body["grocery"]["quantity"], 12);
}

#[tokio::test]
async fn create_grocery_defaults_quantity_to_one() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(json_request("POST", "/api/groceries", r#"{"item_name":"milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["grocery"]["quantity"], 1);
}

#[tokio::test]
async fn create_grocery_missing_name_returns_400() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(json_request("POST", "/api/groceries", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Item name is required");
}

#[tokio::test]
async fn delete_grocery_is_idempotent() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(delete_request("/api/groceries/999"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn grocery_lifecycle() {
    let (app, _dir) = test_app().await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/groceries",
            r#"{"item_name":"coffee","notes":"the good kind"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let id = created["grocery"]["id"].as_i64().unwrap();
    assert_eq!(created["grocery"]["notes"], "the good kind");

    let resp = app.clone().oneshot(get_request("/api/groceries")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["groceries"].as_array().unwrap().len(), 1);
    assert_eq!(body["groceries"][0]["id"], id);

    let resp = app
        .clone()
        .oneshot(delete_request(&format!("/api/groceries/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.clone().oneshot(get_request("/api/groceries")).await.unwrap();
    let body = body_json(resp).await;
    assert!(body["groceries"].as_array().unwrap().is_empty());
}

// --- todos ---

#[tokio::test]
async fn create_todo_returns_201_with_defaults() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(json_request("POST", "/api/todos", r#"{"text":"buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["todo"]["text"], "buy milk");
    assert_eq!(body["todo"]["priority"], 0);
    assert_eq!(body["todo"]["completed"], false);
}

#[tokio::test]
async fn create_todo_missing_text_returns_400() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(json_request("POST", "/api/todos", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Text is required");
}

#[tokio::test]
async fn list_todos_orders_by_priority() {
    let (app, _dir) = test_app().await;

    for payload in [
        r#"{"text":"low"}"#,
        r#"{"text":"high","priority":5}"#,
    ] {
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/api/todos", payload))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = app.clone().oneshot(get_request("/api/todos")).await.unwrap();
    let body = body_json(resp).await;
    let todos = body["todos"].as_array().unwrap();
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0]["text"], "high");
    assert_eq!(todos[1]["text"], "low");
}

#[tokio::test]
async fn complete_todo_marks_it_done() {
    let (app, _dir) = test_app().await;

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/todos", r#"{"text":"walk dog"}"#))
        .await
        .unwrap();
    let created = body_json(resp).await;
    let id = created["todo"]["id"].as_i64().unwrap();

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/todos/{id}/complete"),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["todo"]["completed"], true);
    assert!(body["todo"]["completed_at"].is_string());
}

#[tokio::test]
async fn complete_missing_todo_returns_generic_500() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(json_request("POST", "/api/todos/424242/complete", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to complete todo");
}

#[tokio::test]
async fn delete_todo_is_idempotent() {
    let (app, _dir) = test_app().await;
    let resp = app.oneshot(delete_request("/api/todos/999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
}

// --- posts ---

const PUBLISHED_POST: &str = "---\ntitle: First Post\nslug: first-post\nexcerpt: A first post\ntags: [notes]\ndate: 2025-06-01\npublished: true\n---\n# Hello\n\nSome *markdown* here.\n";

#[tokio::test]
async fn sync_empty_posts_dir_returns_zero() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(json_request("POST", "/api/posts/sync", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
    assert_eq!(body["message"], "Synced 0 posts");
}

#[tokio::test]
async fn sync_skips_drafts_and_readme() {
    let (app, dir) = test_app().await;
    let posts = dir.path().join("posts");

    write_post(&posts, "first-post.md", PUBLISHED_POST);
    write_post(&posts, "draft.md", "---\ntitle: Draft\n---\nnot ready\n");
    write_post(
        &posts,
        "README.md",
        "---\ntitle: Readme\npublished: true\n---\nabout this directory\n",
    );

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/posts/sync", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["message"], "Synced 1 posts");

    let resp = app.clone().oneshot(get_request("/api/posts")).await.unwrap();
    let body = body_json(resp).await;
    let posts_list = body["posts"].as_array().unwrap();
    assert_eq!(posts_list.len(), 1);
    assert_eq!(posts_list[0]["slug"], "first-post");
    assert_eq!(posts_list[0]["title"], "First Post");
    assert_eq!(posts_list[0]["tags"], serde_json::json!(["notes"]));
}

#[tokio::test]
async fn get_post_renders_markdown() {
    let (app, dir) = test_app().await;
    write_post(&dir.path().join("posts"), "first-post.md", PUBLISHED_POST);

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/posts/sync", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(get_request("/api/posts/first-post"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["post"]["slug"], "first-post");
    let content = body["post"]["content"].as_str().unwrap();
    assert!(content.contains("<h1>Hello</h1>"));
    assert!(content.contains("<em>markdown</em>"));
}

#[tokio::test]
async fn get_unknown_post_returns_404() {
    let (app, _dir) = test_app().await;
    let resp = app.oneshot(get_request("/api/posts/nope")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Post not found");
}

#[tokio::test]
async fn get_post_with_missing_file_returns_404() {
    let (app, dir) = test_app().await;
    let posts = dir.path().join("posts");
    write_post(&posts, "first-post.md", PUBLISHED_POST);

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/posts/sync", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    std::fs::remove_file(posts.join("first-post.md")).unwrap();

    let resp = app
        .clone()
        .oneshot(get_request("/api/posts/first-post"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn resync_counts_unchanged_and_updated_posts() {
    let (app, dir) = test_app().await;
    let posts = dir.path().join("posts");
    write_post(&posts, "first-post.md", PUBLISHED_POST);

    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/api/posts/sync", ""))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["count"], 1);
    }

    write_post(
        &posts,
        "first-post.md",
        "---\ntitle: Retitled\nslug: first-post\npublished: true\n---\nnew body\n",
    );

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/posts/sync", ""))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["count"], 1);

    let resp = app.clone().oneshot(get_request("/api/posts")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["posts"][0]["title"], "Retitled");
}

#[tokio::test]
async fn list_posts_filters_by_tag() {
    let (app, dir) = test_app().await;
    let posts = dir.path().join("posts");
    write_post(&posts, "a.md", "---\ntitle: A\ntags: [rust]\npublished: true\n---\na\n");
    write_post(&posts, "b.md", "---\ntitle: B\ntags: [cooking]\npublished: true\n---\nb\n");

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/posts/sync", ""))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["count"], 2);

    let resp = app
        .clone()
        .oneshot(get_request("/api/posts?tag=rust"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let filtered = body["posts"].as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["title"], "A");
}

// --- voice input ---

#[tokio::test]
async fn voice_input_adds_grocery() {
    let (app, _dir) = test_app().await;
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/voice-input",
            r#"{"type":"grocery","item":"bananas"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Added bananas to grocery list");

    let resp = app.clone().oneshot(get_request("/api/groceries")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["groceries"][0]["item_name"], "bananas");
}

#[tokio::test]
async fn voice_input_adds_grocery_batch() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/voice-input",
            r#"{"type":"groceries","items":["bread","butter","jam"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Added 3 items to grocery list");
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn voice_input_adds_todo() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/voice-input",
            r#"{"type":"todo","text":"call mom"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Added TODO: call mom");
}

#[tokio::test]
async fn voice_input_unknown_type_returns_400() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/voice-input",
            r#"{"type":"laundry"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Unknown input type");
}

// --- activity ---

#[tokio::test]
async fn mutations_leave_an_activity_trail() {
    let (app, _dir) = test_app().await;

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/todos", r#"{"text":"buy milk"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/groceries", r#"{"item_name":"milk"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.clone().oneshot(get_request("/api/activity")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);

    let actions: Vec<&str> = body["activities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"todo_added"));
    assert!(actions.contains(&"grocery_added"));
}
