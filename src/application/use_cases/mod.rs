mod booking_coordinator;
mod selection_resolver;

#[cfg(test)]
mod fixtures;

pub use booking_coordinator::*;
pub use selection_resolver::*;
