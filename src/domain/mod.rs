//! # Domain Layer
//!
//! Booking models, the error taxonomy, and pure scheduling rules.
//! This layer performs no I/O.

mod error;
pub mod models;
pub mod services;

pub use error::*;
pub use models::*;
pub use services::*;
