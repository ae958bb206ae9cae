//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the burn, health, version and debug endpoints
//! - Multipart upload streaming to the upload directory
//! - JSON error payloads
//! - CORS middleware

pub mod handlers;
pub mod routes;
pub mod upload;

pub use routes::create_router;
