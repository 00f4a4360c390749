//! # iBUS Telemetry Library
//!
//! Serve sensor telemetry to a FlySky receiver over the iBUS sensor port.
//!
//! This library provides the sensor-side protocol engine, a fixed-size sensor
//! registry, and the serial transport and configuration used to run it.

pub mod config;
pub mod error;
pub mod ibus;
pub mod serial;
