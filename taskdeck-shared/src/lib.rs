//! # TaskDeck Shared Library
//!
//! This crate contains the domain types, persistence layer, and business
//! logic behind the TaskDeck API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migration runner
//! - `models`: Database models and their queries
//! - `auth`: Password hashing, short tokens, session tokens, ownership checks
//! - `notify`: Outbound email (fire-and-forget dispatcher)
//! - `services`: Authentication, project, task, and label services

pub mod auth;
pub mod db;
pub mod models;
pub mod notify;
pub mod services;

/// Current version of the TaskDeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
