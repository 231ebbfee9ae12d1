//! Pure scheduling and payment rules.

mod payment_policy;
mod slot_generator;

pub use payment_policy::*;
pub use slot_generator::*;
