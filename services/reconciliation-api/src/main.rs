//! Bomline Reconciliation Service
//!
//! HTTP surface for the BOM reconciliation core: workbook uploads,
//! sheet analysis, and the reconcile endpoint that reports cleaning
//! results against the master reference table.

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    serve, Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use bomline_utils::{
    init_logging, AppConfig, ColumnMap, ReferenceLoader, SharedReferenceTable, SheetExtractor,
};

mod handlers;
mod state;
mod storage;

use state::AppState;
use storage::UploadStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|_| {
        eprintln!("Failed to load configuration, using defaults");
        AppConfig::default()
    });

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting Bomline Reconciliation Service");

    let columns = ColumnMap::with_synonyms(&config.reconciliation.column_synonyms);

    // A missing reference source is not fatal at boot: the service comes
    // up, health reports the table unavailable, and reconcile requests
    // fail until a reload succeeds.
    let reference = SharedReferenceTable::new();
    match ReferenceLoader::new(columns.clone()).load(&config.reference.path) {
        Ok(table) => {
            reference.swap(table);
        }
        Err(e) => {
            warn!(error = %e, "reference table unavailable at startup");
        }
    }

    let store = UploadStore::new(config.storage.clone())?;
    if let Err(e) = store.cleanup() {
        warn!(error = %e, "upload cleanup failed");
    }

    let state = AppState {
        extractor: SheetExtractor::new(columns),
        store,
        reference,
        config: config.clone(),
    };
    let app = create_app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(&addr).await?;
    info!("Reconciliation Service listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

fn create_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/v1/uploads",
            get(handlers::upload::list_uploads).post(handlers::upload::upload_workbook),
        )
        .route(
            "/api/v1/uploads/:id/sheets",
            get(handlers::sheets::analyze_sheets),
        )
        .route(
            "/api/v1/uploads/:id/sheets/:name/preview",
            get(handlers::sheets::preview_sheet),
        )
        .route(
            "/api/v1/uploads/:id/reconcile",
            post(handlers::reconcile::reconcile_upload),
        )
        .route(
            "/api/v1/reference",
            get(handlers::reference::reference_status),
        )
        .route(
            "/api/v1/reference/reload",
            post(handlers::reference::reload_reference),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(DefaultBodyLimit::max(config.server.max_request_size)),
        )
        .with_state(state)
}
