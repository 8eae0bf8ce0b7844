//! Pit Tracker Core - Shared types library.
//!
//! This crate provides common types used across all Pit Tracker components:
//! - `web` - Server-rendered tool-loan tracker
//! - `cli` - Command-line tools for migrations and the admin seed
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, roles, loan status and form validation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
