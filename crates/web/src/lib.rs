//! Pit Tracker web application.
//!
//! Server-rendered tool-loan tracking for a robotics team's pit: staff sign
//! in, record which team borrowed which tool, and mark tools returned.
//! Admins additionally manage staff accounts.
//!
//! The crate is a library so the router can be driven in-process by tests;
//! the `pit-tracker` binary wires it to `PostgreSQL`, Sentry and a TCP
//! listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::services::ServeDir;
use tower_sessions::{SessionManagerLayer, SessionStore};

use state::AppState;

/// Directory holding the stylesheet, resolved at compile time.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the complete application router around `state`.
///
/// Tracing and Sentry layers are left to the caller so tests can run the
/// router bare.
pub fn build_router<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    routes::routes()
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .with_state(state)
}
