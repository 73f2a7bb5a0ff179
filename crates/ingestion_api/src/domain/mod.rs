pub mod diagnostics;
pub mod in_memory_reading_repository;
pub mod reading_ingestion_service;
pub mod reading_validator;
pub mod token_service;

pub use diagnostics::*;
pub use in_memory_reading_repository::*;
pub use reading_ingestion_service::*;
pub use reading_validator::*;
pub use token_service::*;
