//! Configuration type definitions
//!
//! Defaults reproduce the plant as built: the thresholds, stage window,
//! profiles and animation timing the controllers shipped with.

use heapless::Vec;
use pltn_protocol::{is_valid_key, Key, OverflowPolicy, KEY_PUMP_PRIMARY};
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Number of LEDs on a visualizer bar
pub const LED_COUNT: usize = 16;

/// Maximum brightness ramp length
pub const MAX_RAMP_LEN: usize = 8;

/// What a node does with the frames it receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Rod positions in, staged plant actuation, power level out
    #[default]
    Generation,
    /// Pump status in, LED flow animation
    Visualizer,
}

/// Serial link parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct LinkConfig {
    /// UART baud rate (8N1)
    pub baudrate: u32,
    /// Period between outbound status frames
    pub broadcast_period_ms: u32,
    /// Sleep between loop iterations
    pub idle_delay_ms: u32,
    /// Period between decoder statistics reports
    pub diagnostics_period_ms: u32,
    /// Handling of payload bytes beyond decoder capacity
    pub overflow: OverflowPolicy,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baudrate: 115_200,
            broadcast_period_ms: 500,
            idle_delay_ms: 10,
            diagnostics_period_ms: 10_000,
            overflow: OverflowPolicy::DropIncoming,
        }
    }
}

impl LinkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baudrate == 0
            || self.broadcast_period_ms == 0
            || self.diagnostics_period_ms == 0
        {
            return Err(ConfigError::ZeroPeriod);
        }
        Ok(())
    }
}

/// Rod position thresholds (positions are 0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct Thresholds {
    /// Below this rod 2 position the plant is off
    pub rod2_min: u32,
    /// Below this rod 3 position the plant is off
    pub rod3_min: u32,
    /// Rod 2 position required (with rod 3) for maximum power
    pub rod2_high: u32,
    /// Rod 3 position required (with rod 2) for maximum power
    pub rod3_high: u32,
    /// Rod 2 position that arms the over-power alarm
    pub rod2_alarm: u32,
    /// Rod 3 position that arms the over-power alarm
    pub rod3_alarm: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rod2_min: 21,
            rod3_min: 16,
            rod2_high: 41,
            rod3_high: 31,
            rod2_alarm: 70,
            rod3_alarm: 55,
        }
    }
}

impl Thresholds {
    /// Both rods withdrawn far enough to sound the alarm
    pub fn alarm_armed(&self, rod2: u32, rod3: u32) -> bool {
        rod2 >= self.rod2_alarm && rod3 >= self.rod3_alarm
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.rod2_min <= self.rod2_high
            && self.rod3_min <= self.rod3_high
            && self.rod2_high <= self.rod2_alarm
            && self.rod3_high <= self.rod3_alarm;
        if ordered {
            Ok(())
        } else {
            Err(ConfigError::ThresholdOrder)
        }
    }
}

/// Steady-state actuation for one power level
///
/// Primary humidifiers are always on while running; only the secondary
/// ones vary by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LevelProfile {
    pub steam_fan: u8,
    pub turbine: u8,
    pub condenser_pump: u8,
    pub cooling_tower_fan: u8,
    pub steam_humidifier_2: bool,
    pub cooling_tower_humidifier_2: bool,
}

impl LevelProfile {
    pub const NORMAL: LevelProfile = LevelProfile {
        steam_fan: 50,
        turbine: 40,
        condenser_pump: 60,
        cooling_tower_fan: 60,
        steam_humidifier_2: false,
        cooling_tower_humidifier_2: false,
    };

    pub const MAX: LevelProfile = LevelProfile {
        steam_fan: 100,
        turbine: 100,
        condenser_pump: 100,
        cooling_tower_fan: 100,
        steam_humidifier_2: true,
        cooling_tower_humidifier_2: true,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        let levels = [
            self.steam_fan,
            self.turbine,
            self.condenser_pump,
            self.cooling_tower_fan,
        ];
        if levels.iter().any(|&l| l > 100) {
            return Err(ConfigError::LevelOutOfRange);
        }
        Ok(())
    }
}

/// Generation node settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct GenerationConfig {
    pub thresholds: Thresholds,
    /// Time between staged startup/shutdown steps
    pub sequence_window_ms: u32,
    /// Buzzer toggle period while the alarm is armed
    pub alarm_toggle_ms: u32,
    /// Profile at normal power; its motor levels are also the startup levels
    pub normal: LevelProfile,
    /// Profile at maximum power
    pub max: LevelProfile,
    /// Humidifier relays energise on a low pin
    pub relay_active_low: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            sequence_window_ms: 5000,
            alarm_toggle_ms: 500,
            normal: LevelProfile::NORMAL,
            max: LevelProfile::MAX,
            relay_active_low: true,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if self.sequence_window_ms == 0 || self.alarm_toggle_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        self.normal.validate()?;
        self.max.validate()
    }
}

/// Visualizer node settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct VisualizerConfig {
    /// Field carrying the pump status this bar mirrors
    pub watch_key: Key,
    /// Frame delay while the pump is starting
    pub starting_delay_ms: u32,
    /// Frame delay while the pump is on
    pub on_delay_ms: u32,
    /// Frame delay while the pump is shutting down
    pub shutting_down_delay_ms: u32,
    /// Number of moving blocks, equally spaced around the bar
    pub blocks: u8,
    /// LEDs per block
    pub block_len: u8,
    /// Brightness (percent) from the tail to the head of a block
    pub ramp: Vec<u8, MAX_RAMP_LEN>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        let mut watch_key = Key::new();
        let _ = watch_key.push_str(KEY_PUMP_PRIMARY);

        // 8-bit duty 10/80/150/255 expressed in percent
        let mut ramp = Vec::new();
        let _ = ramp.extend_from_slice(&[4, 31, 59, 100]);

        Self {
            watch_key,
            starting_delay_ms: 500,
            on_delay_ms: 200,
            shutting_down_delay_ms: 600,
            blocks: 4,
            block_len: 4,
            ramp,
        }
    }
}

impl VisualizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_key(&self.watch_key) {
            return Err(ConfigError::InvalidWatchKey);
        }
        if self.starting_delay_ms == 0 || self.on_delay_ms == 0 || self.shutting_down_delay_ms == 0
        {
            return Err(ConfigError::ZeroPeriod);
        }

        let blocks = usize::from(self.blocks);
        let block_len = usize::from(self.block_len);
        if blocks == 0 || block_len == 0 || blocks * block_len > LED_COUNT {
            return Err(ConfigError::LayoutTooLarge);
        }
        if block_len > self.ramp.len() {
            return Err(ConfigError::RampTooShort);
        }
        if self.ramp.iter().any(|&p| p > 100) {
            return Err(ConfigError::LevelOutOfRange);
        }
        Ok(())
    }
}

/// Complete node configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct NodeConfig {
    pub role: Role,
    pub link: LinkConfig,
    pub generation: GenerationConfig,
    pub visualizer: VisualizerConfig,
}

impl NodeConfig {
    /// Check cross-field invariants of every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.link.validate()?;
        self.generation.validate()?;
        self.visualizer.validate()
    }
}
