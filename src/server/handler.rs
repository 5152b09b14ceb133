// Axum handlers: planet image, Wi-Fi scan/join, and the static client files.

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::domain::model::JoinRequest;
use crate::domain::ports::{ImageSource, WifiManager};
use crate::utils::error::Result;

/// Body of every failed `/planetImage` response; details stay in the log.
pub const IMAGE_FAILURE_MESSAGE: &str = "Failed to Generate image";

#[derive(Clone)]
pub struct AppState {
    pub images: Arc<dyn ImageSource>,
    pub wifi: Arc<dyn WifiManager>,
    pub public_root: PathBuf,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/planetImage", get(planet_image_handler))
        .route("/access-points", get(access_points_handler))
        .route("/access-point", post(join_handler))
        .route("/", get(static_handler))
        .route("/{*path}", get(static_handler))
        .with_state(state)
}

pub struct KioskServer {
    addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl KioskServer {
    pub async fn start(state: AppState, bind: &str) -> Result<Self> {
        let listener = TcpListener::bind(bind).await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = router(state);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("Server terminated: {}", e);
            }
        });

        info!("🚀 Server running at: http://{}", addr);
        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Resolves once the server task exits.
    pub async fn wait(&mut self) {
        let _ = (&mut self.handle).await;
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

/// GET /planetImage — regenerate (if needed) and return the public path as text.
async fn planet_image_handler(State(state): State<AppState>) -> Response {
    match state.images.current_image().await {
        Ok(image) => (StatusCode::OK, image.public_path).into_response(),
        Err(e) => {
            error!("Image generation failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, IMAGE_FAILURE_MESSAGE).into_response()
        }
    }
}

/// GET /access-points
async fn access_points_handler(State(state): State<AppState>) -> Response {
    match state.wifi.scan().await {
        Ok(access_points) => Json(access_points).into_response(),
        Err(e) => {
            error!("Wi-Fi scan failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.user_friendly_message()).into_response()
        }
    }
}

/// POST /access-point — body is JSON even when sent as text/plain.
async fn join_handler(State(state): State<AppState>, body: String) -> Response {
    let request: JoinRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected join request: {}", e);
            return (StatusCode::BAD_REQUEST, "invalid access point").into_response();
        }
    };
    info!("Join requested for: {}", request.ssid);

    match state.wifi.join(&request.ssid, &request.password).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            error!("Wi-Fi join failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.user_friendly_message()).into_response()
        }
    }
}

async fn static_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let Some(relative) = resolve_request_path(uri.path()) else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };
    let full_path = state.public_root.join(&relative);
    debug!("Static request {} -> {}", uri.path(), full_path.display());

    match tokio::fs::read(&full_path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type_for(&full_path)),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

/// Percent-decodes the raw request path before sanitizing it.
fn resolve_request_path(raw_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(raw_path).decode_utf8().ok()?;
    sanitize_path(&decoded)
}

/// Maps a request path onto a relative file path, refusing anything that
/// could escape the public root.
fn sanitize_path(request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    let candidate = if trimmed.is_empty() || trimmed.ends_with('/') {
        format!("{}index.html", trimmed)
    } else {
        trimmed.to_string()
    };

    let mut clean = PathBuf::new();
    for component in Path::new(&candidate).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
