use std::sync::Arc;

use axum::http::Method;
use clap::Parser;
use daybook::blog::Blog;
use daybook::config::{Cli, Config, default_config_dir, default_config_path};
use daybook::db::Database;
use daybook::handler::AppState;
use tokio::{signal, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let args = Cli::parse();

    // Determine config path and data directory
    // If --config is provided, use its parent directory for data (database, posts)
    // Otherwise use ~/.daybook/ for both
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir)
        }
        None => {
            let dir = default_config_dir();
            (default_config_path(), dir)
        }
    };

    // Ensure data directory exists
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    tracing_subscriber::fmt().json().init();
    tracing::info!("daybook.svc starting");

    let cfg = Config::new(config_path.to_str().unwrap()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });

    let db_path = data_dir.join(cfg.app.get_db());
    let db = Arc::new(Database::new(&db_path).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup database");
        std::process::exit(1);
    }));

    let posts_dir = match &cfg.app.posts_dir {
        Some(dir) => std::path::PathBuf::from(dir),
        None => data_dir.join("posts"),
    };

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let sync_interval = std::time::Duration::from_secs(cfg.app.sync_interval_seconds);
    let cancellation_token = CancellationToken::new();
    let (shutdown_complete_tx, mut shutdown_complete_rx) = mpsc::channel::<()>(1);

    // Background task to re-sync posts from disk on an interval
    let sync_db = db.clone();
    let sync_posts_dir = posts_dir.clone();
    let sync_token = cancellation_token.clone();
    let sync_shutdown_tx = shutdown_complete_tx.clone();
    tokio::spawn(async move {
        let _shutdown = sync_shutdown_tx;
        let mut interval = tokio::time::interval(sync_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let blog = Blog::new(sync_db.connection(), &sync_posts_dir);
                    match blog.scan_and_sync().await {
                        Ok(stats) => {
                            tracing::debug!("background sync processed {} posts", stats.synced());
                        }
                        Err(e) => {
                            tracing::warn!("Background post sync failed: {}", e);
                        }
                    }
                }
                _ = sync_token.cancelled() => {
                    tracing::info!("post sync task shutting down");
                    break;
                }
            }
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let app = daybook::app(AppState { db, posts_dir }).layer(cors);

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("daybook.svc running on {}", &address);
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server exited with error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl+c signal received, preparing to shutdown");
            cancellation_token.cancel();
        }
    }

    drop(shutdown_complete_tx);
    shutdown_complete_rx.recv().await;
    tracing::info!("daybook.svc going off, graceful shutdown complete");
}
