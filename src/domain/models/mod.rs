mod booking;
mod business;
mod payment;
mod selection;
mod service;
mod session;
mod time_slot;
mod worker;

pub use booking::*;
pub use business::*;
pub use payment::*;
pub use selection::*;
pub use service::*;
pub use session::*;
pub use time_slot::*;
pub use worker::*;
