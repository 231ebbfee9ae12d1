mod api_client;
mod http_booking_store;
mod http_business_directory;
mod http_payment_gateway;
mod in_memory_booking_store;
mod in_memory_business_directory;
mod in_memory_payment_gateway;
pub mod wire;

pub use api_client::*;
pub use http_booking_store::*;
pub use http_business_directory::*;
pub use http_payment_gateway::*;
pub use in_memory_booking_store::*;
pub use in_memory_business_directory::*;
pub use in_memory_payment_gateway::*;
