//! gRPC protocol definitions for meter reading ingestion
//!
//! Generated Protobuf and gRPC code for the exchange between collector agents
//! and the ingestion service.
//!
//! # Example
//!
//! ```ignore
//! use meter_proto::meter_reading::v1::meter_reading_service_client::MeterReadingServiceClient;
//! use meter_proto::meter_reading::v1::TokenRequest;
//!
//! let mut client = MeterReadingServiceClient::connect("http://localhost:50051").await?;
//! let response = client
//!     .create_token(TokenRequest {
//!         username: "collector".to_string(),
//!         password: "secret".to_string(),
//!     })
//!     .await?;
//! ```

#![allow(missing_docs)] // Generated code doesn't have docs

pub mod meter_reading {
    pub mod v1 {
        tonic::include_proto!("meter_reading.v1");

        /// Encoded file descriptor set for gRPC reflection
        pub const FILE_DESCRIPTOR_SET: &[u8] =
            include_bytes!(concat!(env!("OUT_DIR"), "/meter_reading_descriptor.bin"));

        /// Fully qualified path of the token issuance method
        pub const CREATE_TOKEN_PATH: &str = "/meter_reading.v1.MeterReadingService/CreateToken";
    }
}
