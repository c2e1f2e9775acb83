//! HTTP surface of the badge service.
//!
//! This module provides:
//! - Configuration types and loading (`config`)
//! - The axum router and its handlers (`routes`)

pub mod config;
pub mod routes;

pub use routes::{AppState, router};
