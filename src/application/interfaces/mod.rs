mod booking_store;
mod business_directory;
mod payment_gateway;

pub use booking_store::*;
pub use business_directory::*;
pub use payment_gateway::*;
