mod error;
mod logging;
mod method_path;
mod otel_tracing;
mod rejection;
mod server;

pub use error::*;
pub use logging::*;
pub use method_path::*;
pub use otel_tracing::*;
pub use rejection::*;
pub use server::*;
