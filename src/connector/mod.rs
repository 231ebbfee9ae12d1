//! # Connector Layer
//!
//! Implementations of the application interfaces:
//! - HTTP adapters for the booking backend (reqwest)
//! - In-memory adapters for offline runs and tests
//! - The dependency container, router and controllers behind the CLI

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
