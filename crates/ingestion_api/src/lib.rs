pub mod domain;
pub mod grpc;
pub mod ingestion_api;

pub use domain::*;
pub use grpc::*;
pub use ingestion_api::*;
