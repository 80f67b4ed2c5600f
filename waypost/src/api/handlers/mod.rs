//! Axum route handlers.

pub mod markers;
