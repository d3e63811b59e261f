//! Local image retrieval endpoint.
//!
//! Serves files the reassembler has written, so received images can be
//! opened in a browser: `GET /images/{filename}`.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use notehub_core::{AppError, AppResult};
use notehub_proto::markers;

use crate::store::FileStore;

/// Builds the retrieval router over the given store.
pub fn router(store: Arc<FileStore>) -> Router {
    Router::new()
        .route("/images/{filename}", get(get_image))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Binds and serves the retrieval endpoint until the process exits.
pub async fn serve(store: Arc<FileStore>, port: u16) -> AppResult<()> {
    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::transport(format!("failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "image endpoint listening");

    axum::serve(listener, router(store))
        .await
        .map_err(|e| AppError::transport(format!("image endpoint error: {e}")))
}

/// GET /images/{filename} — raw bytes with an image content type, or a
/// plain-text 404 when the name is unknown or unreadable.
async fn get_image(
    State(store): State<Arc<FileStore>>,
    Path(filename): Path<String>,
) -> Response {
    let Some(ext) = markers::image_extension(&filename) else {
        return not_found();
    };

    match store.read(&filename).await {
        Ok(data) => {
            let content_type = format!("image/{}", &ext[1..]);
            ([(header::CONTENT_TYPE, content_type)], data).into_response()
        }
        Err(e) => {
            debug!(filename = %filename, error = %e, "image not served");
            not_found()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "file not found").into_response()
}
