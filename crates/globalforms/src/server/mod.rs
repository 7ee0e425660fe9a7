//! HTTP API for form submissions.
//!
//! One router serves every [`FormKind`]: the slug in the path picks the
//! kind, so `/api/opt-requests/` and `/api/exit-forms/` share handlers.
//! Storage and upload work is synchronous and runs on the blocking pool.

mod handlers;

pub use handlers::DeleteReport;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::forms::FormKind;
use crate::storage::Storage;
use crate::uploads::UploadStore;

/// Shared state behind every handler.
#[derive(Debug)]
pub struct AppState {
    storage: Mutex<Storage>,
    uploads: UploadStore,
    config: Config,
}

impl AppState {
    /// Bundle already-opened storage with an upload store and config.
    #[must_use]
    pub fn new(storage: Storage, uploads: UploadStore, config: Config) -> Self {
        Self {
            storage: Mutex::new(storage),
            uploads,
            config,
        }
    }

    /// Open the database and upload root named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?;
        let uploads = UploadStore::new(config.upload_dir());
        Ok(Self::new(storage, uploads, config))
    }

    /// The upload store.
    #[must_use]
    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lock the database for one unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if a previous holder panicked.
    pub fn storage(&self) -> Result<MutexGuard<'_, Storage>> {
        self.storage
            .lock()
            .map_err(|_| Error::internal("storage lock poisoned"))
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = if state.config.server.allow_any_origin {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/", get(handlers::api_root))
        .route("/api/debug/", post(handlers::debug))
        .route("/api/forms/", get(handlers::forms))
        .route("/api/stats/", get(handlers::stats))
        .route(
            "/api/requests/",
            get(handlers::list_all).delete(handlers::delete_everything),
        )
        .route(
            "/api/{slug}/",
            post(handlers::create)
                .get(handlers::list_kind)
                .delete(handlers::delete_kind),
        )
        .route(
            "/api/{slug}/{id}",
            get(handlers::get_one).delete(handlers::delete_one),
        )
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the API until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, the address cannot be
/// bound, or the server fails.
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.bind_addr()?;
    info!(
        database = %config.database_path().display(),
        uploads = %config.upload_dir().display(),
        "Opening request store"
    );
    let state = Arc::new(AppState::open(config)?);

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Resolve a path slug or fail with 404.
fn kind_from_slug(slug: &str) -> Result<FormKind> {
    FormKind::from_slug(slug).ok_or_else(|| Error::UnknownKind(slug.to_string()))
}

// Extractor rejections carry axum's plain-text message. Rewrapping them keeps
// every error body JSON.

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::malformed(rejection.body_text())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::malformed(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::NotFound { .. } | Self::UnknownKind(_) => {
                (StatusCode::NOT_FOUND, json!({ "detail": self.to_string() }))
            }
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "detail": "Validation failed", "errors": errors }),
            ),
            Self::MalformedPayload(message) => {
                (StatusCode::BAD_REQUEST, json!({ "detail": message }))
            }
            Self::Upload { .. } => (StatusCode::BAD_REQUEST, json!({ "detail": self.to_string() })),
            _ => {
                error!("Request failed: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
