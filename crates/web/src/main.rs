//! Qaima web server.
//!
//! Serves the public menu API and the admin API on port 3000.
//!
//! # Startup
//!
//! 1. Load configuration, initialise Sentry and tracing
//! 2. Open the store (`PostgreSQL`, or in-memory for `memory:` URLs)
//! 3. Write default data into an empty store when enabled
//! 4. Warm the menu cache and serve until SIGINT/SIGTERM
//!
//! Migrations are NOT run on startup. Run them explicitly via
//! `qaima migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qaima_web::config::WebConfig;
use qaima_web::db::{self, MenuStore, RepositoryError};
use qaima_web::routes;
use qaima_web::services::seed::{self, SeedOutcome};
use qaima_web::state::AppState;

#[derive(Debug, Error)]
enum StartupError {
    #[error("Failed to open store: {0}")]
    Store(#[from] sqlx::Error),
    #[error("Store is not reachable: {0}")]
    Unreachable(#[from] RepositoryError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &WebConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qaima_web=info,tower_http=debug".into());

    let (json, text) = if log_json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(text)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match WebConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().init();
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialised before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_json);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: WebConfig) -> Result<(), StartupError> {
    let store = db::open_store(&config.database_url).await?;
    store.ping().await?;
    tracing::info!("Store connected");

    if config.seed_on_startup {
        match seed::ensure_default_data(store.as_ref()).await {
            Ok(SeedOutcome::Seeded(counts)) => {
                tracing::info!(?counts, "Default data written");
            }
            Ok(SeedOutcome::Skipped(counts)) => {
                tracing::debug!(?counts, "Store not empty, default data skipped");
            }
            Err(e) => tracing::error!(error = %e, "Default data could not be written"),
        }
    }

    let state = AppState::new(config.clone(), store);
    if let Err(e) = state.menu().warm().await {
        tracing::warn!(error = %e, "Cache warm-up failed");
    }

    let app = routes::app(state.clone());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("qaima-web listening on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    state.menu().shutdown().await;
    tracing::info!("Store closed");
    served.map_err(StartupError::from)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
