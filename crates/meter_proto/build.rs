use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    // Compile proto files, keeping the descriptor set for server reflection
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(out_dir.join("meter_reading_descriptor.bin"))
        .compile_protos(&["proto/meter_reading/v1/meter_reading.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/meter_reading/v1/meter_reading.proto");

    Ok(())
}
