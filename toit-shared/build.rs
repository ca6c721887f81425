fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(gen_proto)]
    {
        println!("cargo:warning=Config 'gen_proto' enabled: Running protobuf codegen");

        let config = tonic_build::configure()
            .build_client(true)
            .build_server(true)
            .server_mod_attribute("toit.api", r#"#[cfg(feature = "server")]"#)
            .out_dir("src/proto")
            .include_file("mod.rs")
            .emit_rerun_if_changed(false); // See https://github.com/hyperium/tonic/issues/1070

        config.compile_protos(
            &[
                "proto/toit/api/auth.proto",
                "proto/toit/api/device.proto",
                "proto/toit/model/device.proto",
            ],
            &["proto"],
        )?;

        println!("cargo:rerun-if-changed=proto");
    }
    #[cfg(not(gen_proto))]
    {
        println!("cargo:debug=Config 'gen_proto' not enabled: Skipping protobuf codegen");
    }

    Ok(())
}
