mod config;
mod context;
mod credential_store;
mod jwt;
mod password;
mod traits;

pub use config::*;
pub use context::*;
pub use credential_store::*;
pub use jwt::*;
pub use password::*;
pub use traits::*;
