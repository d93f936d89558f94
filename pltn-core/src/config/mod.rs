//! Node configuration
//!
//! Configuration is written as TOML on the host, validated and serialized
//! to postcard at build time, and embedded in the firmware image.

pub mod types;

pub use types::{
    GenerationConfig, LevelProfile, LinkConfig, NodeConfig, Role, Thresholds, VisualizerConfig,
    LED_COUNT, MAX_RAMP_LEN,
};

/// Upper bound on the postcard encoding of a [`NodeConfig`]
pub const MAX_ENCODED_CONFIG: usize = 256;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// min > high or high > alarm for a rod
    ThresholdOrder,
    /// A period, delay or baud rate is zero
    ZeroPeriod,
    /// A level or brightness exceeds 100 percent
    LevelOutOfRange,
    /// Watch key is empty, too long or contains a wire delimiter
    InvalidWatchKey,
    /// Blocks do not fit on the LED bar
    LayoutTooLarge,
    /// Block is longer than the brightness ramp
    RampTooShort,
    /// Postcard blob could not be (de)serialized
    Decode,
}

impl From<postcard::Error> for ConfigError {
    fn from(_: postcard::Error) -> Self {
        ConfigError::Decode
    }
}

impl NodeConfig {
    /// Decode an embedded postcard blob and validate it
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: NodeConfig = postcard::from_bytes(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize into `buffer`, returning the used prefix
    pub fn to_postcard<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        Ok(postcard::to_slice(self, buffer)?)
    }
}
