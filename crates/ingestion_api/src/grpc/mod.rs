pub mod auth_gate;
pub mod meter_reading_handler;
pub mod server;

pub use auth_gate::*;
pub use meter_reading_handler::*;
pub use server::*;
