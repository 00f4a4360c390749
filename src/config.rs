//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{IbusError, Result};
use crate::ibus::protocol::{SensorKind, IBUS_BAUD_RATE, MAX_SENSORS};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Delay after opening before line noise is discarded
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

/// Protocol engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_poll_interval_us")]
    pub poll_interval_us: u64,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default = "default_status_interval_s")]
    pub status_interval_s: u64,
}

/// A sensor to serve, with its initial reading
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SensorConfig {
    pub kind: SensorKind,

    /// Reading in the sensor's unit (V, °C or rpm)
    pub value: f32,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { IBUS_BAUD_RATE }
fn default_settle_ms() -> u64 { 100 }

fn default_poll_interval_us() -> u64 { 500 }
fn default_status_interval_s() -> u64 { 10 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_us: default_poll_interval_us(),
            verbose: false,
            status_interval_s: default_status_interval_s(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ibus_telemetry::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if ![9600, 19200, 38400, 57600, 115200, 230400, 460800].contains(&self.serial.baud_rate) {
            return Err(invalid(
                "baud_rate must be one of: 9600, 19200, 38400, 57600, 115200, 230400, 460800",
            ));
        }

        if self.serial.settle_ms > 5000 {
            return Err(invalid("settle_ms must be between 0 and 5000"));
        }

        // The master polls every few milliseconds per sensor
        if self.engine.poll_interval_us == 0 || self.engine.poll_interval_us > 5000 {
            return Err(invalid("poll_interval_us must be between 1 and 5000"));
        }

        if self.engine.status_interval_s == 0 || self.engine.status_interval_s > 3600 {
            return Err(invalid("status_interval_s must be between 1 and 3600"));
        }

        if self.sensors.len() > MAX_SENSORS {
            return Err(invalid(format!("at most {} sensors can be configured", MAX_SENSORS)));
        }

        let mut seen = HashSet::new();
        for sensor in &self.sensors {
            if !seen.insert(sensor.kind) {
                return Err(invalid(format!("sensor {:?} is configured more than once", sensor.kind)));
            }

            let (min, max) = sensor.kind.value_range();
            if !sensor.value.is_finite() || sensor.value < min || sensor.value > max {
                return Err(invalid(format!(
                    "{:?} value {} must be between {} and {}",
                    sensor.kind, sensor.value, min, max
                )));
            }
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> IbusError {
    IbusError::Config(toml::de::Error::custom(msg))
}
