//! # iBUS Protocol Constants and Types
//!
//! Core protocol definitions for the iBUS sensor (telemetry) bus.
//!
//! ```text
//! Request  (master -> sensor): [0x04][CMD|ADDR][CHK_L][CHK_H]
//! Response (sensor -> master): [LEN][CMD|ADDR][PAYLOAD...][CHK_L][CHK_H]
//! ```

use serde::Deserialize;

/// iBUS serial baud rate (115200 8N1)
pub const IBUS_BAUD_RATE: u32 = 115_200;

/// Length byte of every request frame (and of the discovery echo)
pub const IBUS_REQUEST_LENGTH: u8 = 0x04;

/// Length byte of type and measurement responses
pub const IBUS_RESPONSE_LENGTH: u8 = 0x06;

/// Request frame size in bytes
pub const IBUS_REQUEST_FRAME_SIZE: usize = 4;

/// Type / measurement response frame size in bytes
pub const IBUS_RESPONSE_FRAME_SIZE: usize = 6;

/// Upper nibble: command
pub const IBUS_COMMAND_MASK: u8 = 0xF0;

/// Lower nibble: sensor address
pub const IBUS_ADDRESS_MASK: u8 = 0x0F;

/// Discovery command
pub const IBUS_CMD_DISCOVER: u8 = 0x80;

/// Sensor type query command
pub const IBUS_CMD_TYPE: u8 = 0x90;

/// Measurement query command
pub const IBUS_CMD_MEASUREMENT: u8 = 0xA0;

/// Second payload byte of a type response (2-byte measurement size)
pub const IBUS_TYPE_VALUE_SIZE: u8 = 0x02;

/// Number of sensor slots this responder serves
pub const MAX_SENSORS: usize = 4;

/// Sensor type codes
pub const IBUS_SENSOR_INTERNAL_VOLTAGE: u8 = 0x00;
pub const IBUS_SENSOR_TEMPERATURE: u8 = 0x01;
pub const IBUS_SENSOR_RPM: u8 = 0x02;
pub const IBUS_SENSOR_EXTERNAL_VOLTAGE: u8 = 0x03;

/// Command carried in the upper nibble of the second frame byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Is there a sensor at this address?
    Discover,
    /// What type is the sensor at this address?
    Type,
    /// What is the current value of the sensor at this address?
    Measurement,
}

impl Command {
    /// Decode the command nibble; `None` for commands this responder ignores.
    pub fn from_byte(command_address: u8) -> Option<Self> {
        match command_address & IBUS_COMMAND_MASK {
            IBUS_CMD_DISCOVER => Some(Self::Discover),
            IBUS_CMD_TYPE => Some(Self::Type),
            IBUS_CMD_MEASUREMENT => Some(Self::Measurement),
            _ => None,
        }
    }

    /// Command nibble as sent on the wire
    pub fn code(self) -> u8 {
        match self {
            Self::Discover => IBUS_CMD_DISCOVER,
            Self::Type => IBUS_CMD_TYPE,
            Self::Measurement => IBUS_CMD_MEASUREMENT,
        }
    }
}

/// A validated request: command plus sensor address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub command: Command,

    /// Sensor address (1..=MAX_SENSORS)
    pub address: u8,
}

/// Sensor kinds with a known unit conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Supply voltage in volts (0.01 V units)
    InternalVoltage,
    /// Temperature in °C (0.1 °C units, offset -40 °C)
    Temperature,
    /// Revolutions per minute (raw)
    Rpm,
    /// External (battery) voltage in volts (0.01 V units)
    ExternalVoltage,
}

impl SensorKind {
    /// iBUS sensor type code
    pub fn type_code(self) -> u8 {
        match self {
            Self::InternalVoltage => IBUS_SENSOR_INTERNAL_VOLTAGE,
            Self::Temperature => IBUS_SENSOR_TEMPERATURE,
            Self::Rpm => IBUS_SENSOR_RPM,
            Self::ExternalVoltage => IBUS_SENSOR_EXTERNAL_VOLTAGE,
        }
    }

    /// Range of unit values that fit the 16-bit raw encoding
    pub fn value_range(self) -> (f32, f32) {
        match self {
            Self::InternalVoltage | Self::ExternalVoltage => (0.0, 655.35),
            Self::Temperature => (-40.0, 6513.5),
            Self::Rpm => (0.0, 65535.0),
        }
    }
}
