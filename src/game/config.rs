//! Configuration loader and validator
//!
//! Loads runtime settings from TOML files in the configs/ directory. Game
//! rules are fixed; only timing, device and system-integration settings are
//! configurable.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default configuration file
pub const DEFAULT_CONFIG_PATH: &str = "configs/default.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub runtime: RuntimeSettings,

    #[serde(default)]
    pub pairing: PairingSettings,

    #[serde(default)]
    pub bootstrap: BootstrapSettings,

    #[serde(default)]
    pub device: DeviceSettings,
}

/// Main loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Sleep between ticks (milliseconds)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Consecutive failed reads before a controller is dropped
    #[serde(default = "default_max_read_failures")]
    pub max_read_failures: u32,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_read_failures: default_max_read_failures(),
        }
    }
}

impl RuntimeSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// External pairing utility, run when a controller is plugged in over USB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_pair_command")]
    pub command: String,

    #[serde(default = "default_pair_args")]
    pub args: Vec<String>,

    #[serde(default = "default_pair_timeout_secs")]
    pub timeout_secs: u64,

    /// Text in the utility's output that means pairing worked
    #[serde(default = "default_success_marker")]
    pub success_marker: String,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_pair_command(),
            args: default_pair_args(),
            timeout_secs: default_pair_timeout_secs(),
            success_marker: default_success_marker(),
        }
    }
}

impl PairingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One-off startup checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapSettings {
    /// Refuse to start without root (needed for hidraw and pairing)
    #[serde(default = "default_true")]
    pub require_root: bool,

    #[serde(default = "default_true")]
    pub unblock_radio: bool,

    #[serde(default = "default_rfkill_command")]
    pub rfkill_command: String,

    #[serde(default = "default_rfkill_args")]
    pub rfkill_args: Vec<String>,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            require_root: true,
            unblock_radio: true,
            rfkill_command: default_rfkill_command(),
            rfkill_args: default_rfkill_args(),
        }
    }
}

/// hidraw driver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// How often the scanner looks for new controllers (milliseconds)
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,

    /// Command that drops a Bluetooth link; the controller id is appended
    #[serde(default = "default_disconnect_command")]
    pub disconnect_command: String,

    #[serde(default = "default_disconnect_args")]
    pub disconnect_args: Vec<String>,

    /// Resend unchanged feedback this often so the LED doesn't time out
    #[serde(default = "default_led_keepalive_ms")]
    pub led_keepalive_ms: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            scan_interval_ms: default_scan_interval_ms(),
            disconnect_command: default_disconnect_command(),
            disconnect_args: default_disconnect_args(),
            led_keepalive_ms: default_led_keepalive_ms(),
        }
    }
}

fn default_true() -> bool { true }
fn default_tick_interval_ms() -> u64 { 10 }
fn default_max_read_failures() -> u32 { 100 }
fn default_pair_command() -> String { "psmove".to_string() }
fn default_pair_args() -> Vec<String> { vec!["pair".to_string()] }
fn default_pair_timeout_secs() -> u64 { 10 }
fn default_success_marker() -> String { "succeeded".to_string() }
fn default_rfkill_command() -> String { "rfkill".to_string() }
fn default_rfkill_args() -> Vec<String> { vec!["unblock".to_string(), "bluetooth".to_string()] }
fn default_scan_interval_ms() -> u64 { 1000 }
fn default_disconnect_command() -> String { "hcitool".to_string() }
fn default_disconnect_args() -> Vec<String> { vec!["dc".to_string()] }
fn default_led_keepalive_ms() -> u64 { 1000 }

impl GameConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        info!("Loading configuration from: {}", path_ref.display());

        let content = std::fs::read_to_string(path_ref)?;
        let config = Self::from_toml(&content)?;

        info!("✓ Config validation passed");
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;

        debug!("  - Tick interval: {} ms", config.runtime.tick_interval_ms);
        debug!(
            "  - Pairing: {} (timeout {} s)",
            config.pairing.enabled, config.pairing.timeout_secs
        );

        config.validate()?;
        Ok(config)
    }

    /// Load configs/default.toml, or the built-in defaults if it doesn't exist
    pub fn load_default() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load(DEFAULT_CONFIG_PATH)
        } else {
            info!("No {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.tick_interval_ms == 0 || self.runtime.tick_interval_ms > 1000 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be between 1 and 1000".into()
            ));
        }

        if self.runtime.max_read_failures == 0 {
            return Err(ConfigError::Invalid(
                "max_read_failures must be positive".into()
            ));
        }

        if self.pairing.enabled {
            if self.pairing.command.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "pairing command must not be empty".into()
                ));
            }

            if self.pairing.timeout_secs == 0 {
                return Err(ConfigError::Invalid(
                    "pairing timeout_secs must be positive".into()
                ));
            }

            if self.pairing.success_marker.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "pairing success_marker must not be empty".into()
                ));
            }
        }

        if self.bootstrap.unblock_radio && self.bootstrap.rfkill_command.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "rfkill_command must not be empty".into()
            ));
        }

        if self.device.scan_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "scan_interval_ms must be positive".into()
            ));
        }

        if self.device.disconnect_command.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "disconnect_command must not be empty".into()
            ));
        }

        Ok(())
    }
}
