//! Pit Tracker - tool-loan tracking for a robotics pit.
//!
//! This binary serves the tracker on port 3000 by default.
//!
//! # Storage
//!
//! - With `PIT_TRACKER_DATABASE_URL` (or `DATABASE_URL`) set: `PostgreSQL`
//!   for accounts, loans and sessions
//! - Without: everything in memory, lost on restart (local trials only)
//!
//! # Architecture
//!
//! - Axum web framework
//! - Askama templates for server-side rendering
//! - tower-sessions for cookie sessions
//! - Argon2id password hashes

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use secrecy::ExposeSecret;
use sentry::integrations::tracing as sentry_tracing;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::MemoryStore;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pit_tracker_web::config::TrackerConfig;
use pit_tracker_web::middleware::create_session_layer;
use pit_tracker_web::services::{DirectoryError, SeedOutcome};
use pit_tracker_web::state::AppState;
use pit_tracker_web::{build_router, db};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &TrackerConfig) -> Option<sentry::ClientInitGuard> {
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
            send_default_pii: false,
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
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(config: &TrackerConfig) {
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pit_tracker_web=info,tower_http=debug".into());

    // JSON for log shippers, text for terminals
    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!config.log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Create the configured bootstrap admin if it does not exist yet.
///
/// Only storage failures are fatal.
async fn seed_admin(state: &AppState) -> Result<(), DirectoryError> {
    let Some(seed) = &state.config().seed_admin else {
        return Ok(());
    };

    let outcome = match state
        .directory()
        .ensure_admin_seed(&seed.email, &seed.username, seed.password.expose_secret())
        .await
    {
        Ok(outcome) => outcome,
        // A bad seed identity must not keep the tracker from serving
        Err(DirectoryError::Validation(errors)) => {
            tracing::warn!(%errors, "Bootstrap admin not created, seed values rejected");
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    match outcome {
        SeedOutcome::Created(account) => {
            tracing::info!(username = %account.username, "Bootstrap admin created");
        }
        SeedOutcome::AlreadyExists(account) => {
            tracing::info!(username = %account.username, "Bootstrap admin already present");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration from environment (needed for Sentry init)
    let config = match TrackerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing(&config);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: TrackerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.socket_addr();

    let app = if let Some(database_url) = &config.database_url {
        let pool = db::create_pool(database_url).await?;
        tracing::info!("Database pool created");

        // NOTE: Migrations are NOT run automatically on startup.
        // Run them explicitly via: cargo run -p pit-tracker-cli -- migrate
        let session_layer = create_session_layer(PostgresStore::new(pool.clone()), &config);
        let state = AppState::postgres(config, pool);
        seed_admin(&state).await?;
        build_router(state, session_layer)
    } else {
        tracing::warn!("No database configured, using in-memory storage");
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let state = AppState::in_memory(config);
        seed_admin(&state).await?;
        build_router(state, session_layer)
    };

    let app = app
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    tracing::info!("pit tracker listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
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
