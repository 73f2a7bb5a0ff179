pub mod agent;
pub mod client;
pub mod collector_agent;
pub mod error;
pub mod generator;
pub mod grpc_client;
pub mod session;
pub mod settings;

pub use agent::*;
pub use client::*;
pub use collector_agent::*;
pub use error::*;
pub use generator::*;
pub use grpc_client::*;
pub use session::*;
pub use settings::*;
