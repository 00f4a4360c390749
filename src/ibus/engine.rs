//! # iBUS Protocol Engine
//!
//! Sensor-side request/response state machine.
//!
//! Each [`ProtocolEngine::poll`] handles at most one 4-byte request:
//!
//! 1. Wait (without blocking) until a whole request frame is buffered
//! 2. Read it, count it, validate length and checksum
//! 3. Answer discovery, type and measurement requests for registered sensors
//! 4. Discard everything else still buffered, so a garbled or partial frame
//!    can never shift the framing of the next request
//!
//! Bad frames, unknown commands, unregistered addresses and transport failures
//! are absorbed silently; the only trace they leave is in the counters and,
//! with verbose output on, the log.

use tracing::{debug, info, warn};

use super::decoder::{parse_request, validate, RequestFrame};
use super::encoder::{
    encode_discovery_response, encode_measurement_response, encode_type_response,
};
use super::protocol::*;
use super::registry::{Registration, SensorRegistry};
use super::units;
use crate::serial::Transport;

/// Snapshot of engine counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    /// 4-byte groups read from the bus, valid or not
    pub frames_received: u64,
    /// Responses written and flushed
    pub responses_sent: u64,
    /// Whether the master has discovered any of our sensors
    pub discovered: bool,
    /// Registered sensors
    pub sensors: usize,
}

/// iBUS sensor responder bound to one bus
pub struct ProtocolEngine<T: Transport> {
    transport: T,
    registry: SensorRegistry,
    frames_received: u64,
    responses_sent: u64,
    discovered: bool,
    verbose: bool,
}

impl<T: Transport> std::fmt::Debug for ProtocolEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolEngine")
            .field("registry", &self.registry)
            .field("frames_received", &self.frames_received)
            .field("responses_sent", &self.responses_sent)
            .field("discovered", &self.discovered)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> ProtocolEngine<T> {
    /// Create an engine on an open transport
    ///
    /// Bytes already buffered (boot-time line noise) are discarded.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ibus_telemetry::config::SerialConfig;
    /// use ibus_telemetry::ibus::engine::ProtocolEngine;
    /// use ibus_telemetry::serial::IbusSerial;
    ///
    /// let serial = IbusSerial::open(&SerialConfig::default())?;
    /// let mut engine = ProtocolEngine::new(serial);
    /// engine.set_rpm(4294);
    /// loop {
    ///     engine.poll();
    /// }
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(transport: T) -> Self {
        let mut engine = Self {
            transport,
            registry: SensorRegistry::new(),
            frames_received: 0,
            responses_sent: 0,
            discovered: false,
            verbose: false,
        };
        engine.discard_pending();
        engine
    }

    /// Handle at most one request frame
    ///
    /// Returns immediately if fewer than 4 bytes are buffered.
    ///
    /// # Returns
    ///
    /// * `bool` - `true` if a response was sent
    pub fn poll(&mut self) -> bool {
        if self.bytes_available() < IBUS_REQUEST_FRAME_SIZE {
            return false;
        }

        let responded = match self.read_frame() {
            Some(frame) => {
                self.frames_received += 1;

                if self.verbose {
                    info!("RX: {:02X?}", frame);
                }

                if validate(&frame) {
                    self.dispatch(&frame)
                } else {
                    if self.verbose {
                        info!("Dropped malformed frame {:02X?}", frame);
                    }
                    false
                }
            }
            None => false,
        };

        let discarded = self.discard_pending();
        if self.verbose && discarded > 0 {
            info!("Discarded {} trailing bytes", discarded);
        }

        responded
    }

    /// Answer a request frame whose checksum has already been checked
    ///
    /// Requests for unknown commands, addresses outside `1..=4` or empty slots
    /// get no reply; on the bus, silence is the negative acknowledgement.
    ///
    /// # Returns
    ///
    /// * `bool` - `true` if a response was sent
    pub fn dispatch(&mut self, frame: &RequestFrame) -> bool {
        let Some(request) = parse_request(frame) else {
            return false;
        };

        let Some(sensor) = self.registry.get(request.address).copied() else {
            if self.verbose {
                info!("{:?} for address {}: no sensor", request.command, request.address);
            }
            return false;
        };

        let sent = match request.command {
            Command::Discover => {
                let sent = self.send(&encode_discovery_response(request.address));
                if sent {
                    self.discovered = true;
                }
                sent
            }
            Command::Type => {
                self.send(&encode_type_response(request.address, sensor.sensor_type))
            }
            Command::Measurement => {
                self.send(&encode_measurement_response(request.address, sensor.value))
            }
        };

        if sent && self.verbose {
            info!("{:?} for address {}: sent", request.command, request.address);
        }

        sent
    }

    /// Set a sensor's raw protocol value, registering the type if it is new
    ///
    /// A full registry drops the value; the returned `Registration::Full` is
    /// the only report.
    pub fn set_sensor_value(&mut self, sensor_type: u8, raw_value: u16) -> Registration {
        let registration = self.registry.set_value(sensor_type, raw_value);

        if self.verbose {
            match registration {
                Registration::Added { address } => {
                    info!("Added sensor type {} at address {}", sensor_type, address);
                }
                Registration::Full => {
                    warn!("No free sensor slots, dropped value for sensor type {}", sensor_type);
                }
                Registration::Updated { .. } => {}
            }
        }

        registration
    }

    /// Set a sensor value in its real-world unit
    pub fn set_sensor(&mut self, kind: SensorKind, value: f32) -> Registration {
        self.set_sensor_value(kind.type_code(), units::to_raw(kind, value))
    }

    /// Set the internal (supply) voltage in volts
    pub fn set_internal_voltage(&mut self, volts: f32) -> Registration {
        self.set_sensor(SensorKind::InternalVoltage, volts)
    }

    /// Set the external (battery) voltage in volts
    pub fn set_external_voltage(&mut self, volts: f32) -> Registration {
        self.set_sensor(SensorKind::ExternalVoltage, volts)
    }

    /// Set the temperature in °C
    pub fn set_temperature(&mut self, celsius: f32) -> Registration {
        self.set_sensor(SensorKind::Temperature, celsius)
    }

    /// Set the RPM reading
    pub fn set_rpm(&mut self, rpm: u16) -> Registration {
        self.set_sensor_value(IBUS_SENSOR_RPM, rpm)
    }

    /// Enable or disable frame-level diagnostic logging
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    pub fn responses_sent(&self) -> u64 {
        self.responses_sent
    }

    /// Whether any sensor has answered a discovery request
    pub fn is_discovered(&self) -> bool {
        self.discovered
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            frames_received: self.frames_received,
            responses_sent: self.responses_sent,
            discovered: self.discovered,
            sensors: self.registry.len(),
        }
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the engine and return its transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn bytes_available(&mut self) -> usize {
        match self.transport.bytes_available() {
            Ok(count) => count,
            Err(e) => {
                debug!("Failed to query receive buffer: {}", e);
                0
            }
        }
    }

    fn read_frame(&mut self) -> Option<RequestFrame> {
        let mut frame = [0u8; IBUS_REQUEST_FRAME_SIZE];

        for byte in frame.iter_mut() {
            match self.transport.read_byte() {
                Ok(b) => *byte = b,
                Err(e) => {
                    debug!("Failed to read request frame: {}", e);
                    return None;
                }
            }
        }

        Some(frame)
    }

    fn send(&mut self, packet: &[u8]) -> bool {
        let result = packet
            .iter()
            .try_for_each(|&byte| self.transport.write_byte(byte))
            .and_then(|()| self.transport.flush());

        match result {
            Ok(()) => {
                self.responses_sent += 1;
                true
            }
            Err(e) => {
                debug!("Failed to send response: {}", e);
                false
            }
        }
    }

    /// Drop every byte currently buffered, returning how many were dropped
    fn discard_pending(&mut self) -> usize {
        let mut discarded = 0;

        loop {
            let available = self.bytes_available();
            if available == 0 {
                return discarded;
            }

            for _ in 0..available {
                if self.transport.read_byte().is_err() {
                    return discarded;
                }
                discarded += 1;
            }
        }
    }
}
