//! # Application Layer
//!
//! Collaborator interfaces and the use cases that coordinate them with the
//! domain rules.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
