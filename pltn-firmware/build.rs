//! Build script for pltn-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Parses and validates node.toml, then embeds it as postcard

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use pltn_core::config::{ConfigError, NodeConfig, Role, MAX_ENCODED_CONFIG};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    setup_linker(&out_dir);
    embed_config(&out_dir);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse node.toml and write the validated blob to OUT_DIR
fn embed_config(out_dir: &Path) {
    println!("cargo:rerun-if-changed=node.toml");

    let config_path = Path::new("node.toml");
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: node.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a node.toml configuration file.           ║\n\
            ║  Please create one in the pltn-firmware directory.               ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read node.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: NodeConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid node.toml                                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    if let Err(e) = config.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: node.toml failed validation                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(describe(e))
        );
    }

    let mut buffer = [0u8; MAX_ENCODED_CONFIG];
    let encoded = match config.to_postcard(&mut buffer) {
        Ok(encoded) => encoded,
        Err(e) => panic!("node.toml does not fit the embedded config blob: {:?}", e),
    };

    fs::write(out_dir.join("node_config.bin"), &encoded[..]).unwrap();

    let role = match config.role {
        Role::Generation => "generation",
        Role::Visualizer => "visualizer",
    };
    println!(
        "cargo:warning=node.toml validated ({} role, {} bytes)",
        role,
        encoded.len()
    );
}

fn describe(error: ConfigError) -> &'static str {
    match error {
        ConfigError::ThresholdOrder => {
            "[generation.thresholds]: each rod needs min <= high <= alarm"
        }
        ConfigError::ZeroPeriod => "A period, delay or baudrate is zero",
        ConfigError::LevelOutOfRange => "A motor level or ramp brightness is above 100",
        ConfigError::InvalidWatchKey => {
            "[visualizer] watch_key must be 1-16 chars without < > ; : or newline"
        }
        ConfigError::LayoutTooLarge => {
            "[visualizer] blocks * block_len must be between 1 and 16"
        }
        ConfigError::RampTooShort => "[visualizer] ramp needs at least block_len entries",
        ConfigError::Decode => "Configuration could not be serialized",
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
