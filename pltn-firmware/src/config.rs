//! Embedded node configuration
//!
//! build.rs validates node.toml and stores it as postcard in OUT_DIR. The
//! blob is decoded and checked again at boot.

use defmt::*;
use pltn_core::config::NodeConfig;

static EMBEDDED_CONFIG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/node_config.bin"));

/// Decode the embedded configuration, falling back to defaults
pub fn load() -> NodeConfig {
    match NodeConfig::from_postcard(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Config loaded: {} baud, broadcast every {} ms",
                config.link.baudrate, config.link.broadcast_period_ms
            );
            config
        }
        Err(e) => {
            warn!("Embedded config rejected ({}), using defaults", e);
            NodeConfig::default()
        }
    }
}
