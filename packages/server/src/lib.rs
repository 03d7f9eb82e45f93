#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web remote authority for patrol reports.
//!
//! Extracts every submitted report authoritatively, persists it through a
//! [`ReportStore`], and keeps the running totals (global and per location)
//! that clients display. Totals are never stored; on start-up they are
//! rebuilt by folding every stored report.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use patrol_report_aggregate::ScopedTotals;
use patrol_report_database::memory::MemoryReportStore;
use patrol_report_database::sqlite::SqliteReportStore;
use patrol_report_database::{DEFAULT_DB_PATH, DbError, ReportStore, StoredReport};
use patrol_report_models::{AccumulatedTotals, Location};
use patrol_report_server_models::ApiError;
use tokio::sync::Mutex;

/// Value of `DATABASE_PATH` that selects the in-memory store.
pub const MEMORY_DATABASE: &str = ":memory:";

/// Largest accepted JSON request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Errors that can stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The report store could not be opened or read.
    #[error(transparent)]
    Db(#[from] DbError),

    /// The HTTP server failed to bind or run.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where reports are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// `SQLite` file at the given path.
    Sqlite(PathBuf),
    /// Process memory; lost on exit.
    Memory,
}

/// Server start-up configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            store: StoreConfig::Sqlite(PathBuf::from(DEFAULT_DB_PATH)),
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT` and `DATABASE_PATH`, falling back to the
    /// defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let store = std::env::var("DATABASE_PATH").map_or(defaults.store, |path| {
            if path == MEMORY_DATABASE {
                StoreConfig::Memory
            } else {
                StoreConfig::Sqlite(PathBuf::from(path))
            }
        });

        Self {
            bind_addr,
            port,
            store,
        }
    }
}

/// Shared application state.
///
/// The totals mutex is held across "persist then fold" so the totals
/// always equal the fold of the store's contents.
pub struct AppState {
    store: Arc<dyn ReportStore>,
    totals: Mutex<ScopedTotals>,
}

impl AppState {
    /// Builds the state, rebuilding the running totals from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored reports cannot be read.
    pub async fn load(store: Arc<dyn ReportStore>) -> Result<Self, DbError> {
        let reports = store.all().await?;
        let totals = ScopedTotals::from_records(reports.iter().map(|r| &r.record));

        log::info!(
            "Loaded {} stored report(s), {} inspection(s)",
            reports.len(),
            totals.global().total_inspections()
        );

        Ok(Self {
            store,
            totals: Mutex::new(totals),
        })
    }

    /// Extracts `text`, persists the record and folds it into the totals.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the record could not be persisted. The
    /// totals are unchanged in that case.
    pub async fn submit(&self, text: &str) -> Result<(StoredReport, AccumulatedTotals), DbError> {
        let record = patrol_report_extract::extract(text);

        let mut totals = self.totals.lock().await;
        let stored = self.store.insert(&record).await?;
        totals.fold(&stored.record);

        log::info!(
            "Stored report {} for {} ({} inspection(s))",
            stored.id,
            stored.record.location,
            stored.record.total_inspections()
        );

        Ok((stored, totals.global()))
    }

    /// Clears every stored report and zeroes the totals.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store could not be cleared. The totals
    /// are unchanged in that case.
    pub async fn reset(&self) -> Result<u64, DbError> {
        let mut totals = self.totals.lock().await;
        let removed = self.store.clear().await?;
        totals.reset();
        Ok(removed)
    }

    /// Current global totals.
    pub async fn totals(&self) -> AccumulatedTotals {
        self.totals.lock().await.global()
    }

    /// Current totals of every location with at least one report.
    pub async fn locations(&self) -> Vec<(Location, AccumulatedTotals)> {
        self.totals
            .lock()
            .await
            .by_location()
            .iter()
            .map(|(location, totals)| (*location, *totals))
            .collect()
    }
}

/// Opens the report store selected by `config`.
///
/// # Errors
///
/// Returns [`DbError`] if the `SQLite` database cannot be opened.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn ReportStore>, DbError> {
    Ok(match config {
        StoreConfig::Sqlite(path) => {
            log::info!("Opening report database at {}...", path.display());
            Arc::new(SqliteReportStore::open(path).await?)
        }
        StoreConfig::Memory => {
            log::warn!("Using in-memory report store, reports will not survive a restart");
            Arc::new(MemoryReportStore::new())
        }
    })
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
            actix_web::error::InternalError::from_response(err, response).into()
        });

    cfg.service(
        web::scope("/api")
            .app_data(json_config)
            .route("/health", web::get().to(handlers::health))
            .route("/analyze", web::post().to(handlers::analyze))
            .route("/reset", web::post().to(handlers::reset))
            .route("/totals", web::get().to(handlers::totals))
            .route("/reports/by-location", web::get().to(handlers::by_location)),
    );
}

/// Starts the patrol report API server.
///
/// Opens the configured store, rebuilds the running totals and starts the
/// Actix-Web HTTP server. The caller is responsible for providing the
/// async runtime (e.g. via `#[actix_web::main]`) and for initialising
/// logging.
///
/// # Errors
///
/// Returns [`ServerError`] if the store cannot be opened or the HTTP
/// server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let store = open_store(&config.store).await?;
    let state = web::Data::new(AppState::load(store).await?);

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await?;

    Ok(())
}
