//! # Serial Communication Module
//!
//! Handles the serial link to the receiver's sensor port.
//!
//! This module handles:
//! - Opening the serial port at 115,200 baud, 8N1
//! - Non-blocking byte reads for the protocol engine
//! - Writing responses and draining the transmit buffer

pub mod port_trait;

pub use port_trait::Transport;

use crate::config::SerialConfig;
use crate::error::{IbusError, Result};
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Read timeout; reads are only issued for bytes already buffered
const READ_TIMEOUT_MS: u64 = 10;

/// iBUS sensor port handler
///
/// Wraps a synchronous serial port so that polling never waits on the line.
pub struct IbusSerial {
    /// Serial port handle
    port: Box<dyn tokio_serial::SerialPort>,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl std::fmt::Debug for IbusSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IbusSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl IbusSerial {
    /// Open the configured serial port
    ///
    /// The caller should let the line settle (see `SerialConfig::settle_ms`)
    /// before handing the port to the engine, which discards whatever noise
    /// arrived in the meantime.
    ///
    /// # Errors
    ///
    /// Returns `IbusError::Serial` if the port cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ibus_telemetry::config::SerialConfig;
    /// use ibus_telemetry::serial::IbusSerial;
    ///
    /// let serial = IbusSerial::open(&SerialConfig::default())?;
    /// println!("Connected to: {}", serial.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self> {
        debug!("Opening serial port {} at {} baud", config.port, config.baud_rate);

        let port = tokio_serial::new(&config.port, config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .open()
            .map_err(|e| IbusError::Serial(format!("Failed to open {}: {}", config.port, e)))?;

        info!("Opened iBUS sensor port at {}", config.port);

        Ok(Self {
            port,
            device_path: config.port.clone(),
        })
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

impl Transport for IbusSerial {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let count = self.port.bytes_to_read()?;
        Ok(count as usize)
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.port.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.port.write_all(&[byte])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}
