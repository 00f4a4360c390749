//! # iBUS Request Decoder
//!
//! Validates and decodes 4-byte request frames from the bus master.

use super::checksum::request_checksum_matches;
use super::protocol::*;

/// A raw request frame as read from the wire
pub type RequestFrame = [u8; IBUS_REQUEST_FRAME_SIZE];

/// Check the length byte and checksum of a request frame
///
/// # Arguments
///
/// * `frame` - Raw 4-byte frame
///
/// # Returns
///
/// * `bool` - `true` if the frame is well formed
///
/// # Examples
///
/// ```
/// use ibus_telemetry::ibus::decoder::validate;
///
/// assert!(validate(&[0x04, 0x81, 0x7A, 0xFF]));
/// assert!(!validate(&[0x04, 0x81, 0x7A, 0xFE]));
/// ```
pub fn validate(frame: &RequestFrame) -> bool {
    if frame[0] != IBUS_REQUEST_LENGTH {
        return false;
    }

    let received = u16::from_le_bytes([frame[2], frame[3]]);
    request_checksum_matches(frame[0], frame[1], received)
}

/// Extract command and address from a frame without checking its checksum
///
/// # Returns
///
/// * `Option<Request>` - `None` for unknown commands or addresses outside
///   `1..=MAX_SENSORS`
pub fn parse_request(frame: &RequestFrame) -> Option<Request> {
    let command = Command::from_byte(frame[1])?;
    let address = frame[1] & IBUS_ADDRESS_MASK;

    if address == 0 || usize::from(address) > MAX_SENSORS {
        return None;
    }

    Some(Request { command, address })
}

/// Validate and parse a request frame
pub fn decode_request(frame: &RequestFrame) -> Option<Request> {
    if !validate(frame) {
        return None;
    }

    parse_request(frame)
}
