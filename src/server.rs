//!
//! gallerium HTTP server
//! ---------------------
//! Thin Axum read surface over the finder. Routing stays deliberately small:
//! every handler delegates straight to a `GalleryFinder` operation and maps
//! the outcome to JSON, with errors folded through the common `AppError`
//! model. On first start against an empty catalog a small demo dataset is
//! seeded so the API is browsable out of the box.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::catalog::MemoryCatalog;
use crate::error::AppError;
use crate::finder::GalleryFinder;
use crate::model::{FileAsset, Gallery, MediaItem};

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub finder: Arc<GalleryFinder<MemoryCatalog>>,
}

/// Convenience entry point using the default port (7878) and env-driven
/// configuration.
pub async fn run() -> anyhow::Result<()> {
    let http_port = std::env::var("GALLERIUM_HTTP_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(7878);
    run_with_port(http_port).await
}

/// Start the gallerium HTTP server bound to the given port.
pub async fn run_with_port(http_port: u16) -> anyhow::Result<()> {
    let catalog = MemoryCatalog::new();

    // First run against an empty catalog: seed a browsable demo dataset
    // unless GALLERIUM_DEMO=false.
    let demo = std::env::var("GALLERIUM_DEMO").map(|v| v != "false").unwrap_or(true);
    if demo && catalog.is_empty() {
        seed_demo_catalog(&catalog);
        info!("Seeded demo catalog (set GALLERIUM_DEMO=false to disable)");
    }

    let state = AppState { finder: Arc::new(GalleryFinder::new(catalog)) };
    let app = router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Mount all routes over the given state. Split out so tests can drive the
/// router without binding a socket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "gallerium ok" }))
        .route("/api/media", get(list_media))
        .route("/api/media/all", get(list_all))
        .route("/api/groups", get(group_views))
        .route("/api/groups/{name}/media", get(group_media))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<u32>,
    size: Option<u32>,
    group: Option<String>,
}

async fn list_media(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    match state
        .finder
        .list(params.page, params.size, params.group.as_deref())
        .await
    {
        Ok(result) => (StatusCode::OK, Json(json!(result))),
        Err(e) => error_response(e),
    }
}

async fn list_all(State(state): State<AppState>) -> impl IntoResponse {
    match state.finder.list_all().await {
        Ok(entries) => (StatusCode::OK, Json(json!(entries))),
        Err(e) => error_response(e),
    }
}

async fn group_views(State(state): State<AppState>) -> impl IntoResponse {
    match state.finder.group_by().await {
        Ok(views) => (StatusCode::OK, Json(json!(views))),
        Err(e) => error_response(e),
    }
}

async fn group_media(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.finder.list_by(&name).await {
        Ok(entries) => (StatusCode::OK, Json(json!(entries))),
        Err(e) => error_response(e),
    }
}

fn error_response(e: anyhow::Error) -> (StatusCode, Json<serde_json::Value>) {
    error!("query error: {e}");
    let app = AppError::from(e);
    let status =
        StatusCode::from_u16(app.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({"status": "error", "code": app.code_str(), "error": app.message()})),
    )
}

/// Seed two native galleries, one folder-backed gallery and a handful of
/// records so every endpoint returns something on a fresh start.
fn seed_demo_catalog(catalog: &MemoryCatalog) {
    let now = Utc::now();

    catalog.insert_gallery(Gallery {
        name: "screenshots".into(),
        created: now - Duration::days(30),
        priority: Some(0),
        hidden: false,
        folder: Some("screens-2024".into()),
    });
    catalog.insert_gallery(Gallery {
        name: "landscapes".into(),
        created: now - Duration::days(20),
        priority: Some(1),
        hidden: false,
        folder: None,
    });
    catalog.insert_gallery(Gallery {
        name: "drafts".into(),
        created: now - Duration::days(10),
        priority: None,
        hidden: true,
        folder: None,
    });

    for (i, name) in ["dawn", "ridge", "estuary"].iter().enumerate() {
        catalog.insert_media(MediaItem {
            name: format!("landscape-{name}"),
            created: now - Duration::days(i as i64),
            display_name: format!("Landscape: {name}"),
            description: format!("{name} shot from the north trail"),
            url: format!("/media/{name}.jpg"),
            cover: format!("/media/{name}-cover.jpg"),
            priority: Some(i as i32),
            group: "landscapes".into(),
        });
    }
    catalog.insert_media(MediaItem {
        name: "draft-untitled".into(),
        created: now,
        display_name: "Untitled".into(),
        description: "unfinished".into(),
        url: "/media/untitled.jpg".into(),
        cover: "/media/untitled.jpg".into(),
        priority: None,
        group: "drafts".into(),
    });

    for i in 0..4 {
        catalog.insert_file(FileAsset {
            name: format!("screen-{i:03}"),
            created: now - Duration::hours(i),
            display_name: format!("Screen {i:03}"),
            permalink: Some(format!("/files/screens-2024/screen-{i:03}.png")),
            folder: "screens-2024".into(),
        });
    }
}
