//! # iBUS Protocol Module
//!
//! Implementation of the sensor side of the FlySky iBUS telemetry bus.
//!
//! This module handles:
//! - Request frame validation (length marker and 16-bit checksum)
//! - Discovery, type and measurement responses
//! - The fixed-size sensor registry and its address assignment
//! - Conversion of real-world readings to raw protocol values

pub mod protocol;
pub mod checksum;
pub mod encoder;
pub mod decoder;
pub mod registry;
pub mod units;
pub mod engine;
