//! # TaskDeck API Server Library
//!
//! HTTP surface of TaskDeck: routing, request validation, and the mapping
//! from service errors to JSON responses.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `response`: Success envelope
//! - `routes`: API route handlers
//! - `validation`: Field rules shared by request bodies

pub mod app;
pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod validation;
