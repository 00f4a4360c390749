//! # iBUS Frame Encoder
//!
//! Builds response frames for the bus master, plus request frames for
//! exercising a responder.

use super::checksum::checksum;
use super::protocol::*;

/// A type or measurement response frame
pub type ResponseFrame = [u8; IBUS_RESPONSE_FRAME_SIZE];

/// Encode a request frame as a bus master would send it
///
/// # Arguments
///
/// * `command` - Request command
/// * `address` - Sensor address (lower nibble)
///
/// # Returns
///
/// * `[u8; 4]` - Complete request frame
///
/// # Examples
///
/// ```
/// use ibus_telemetry::ibus::encoder::encode_request;
/// use ibus_telemetry::ibus::protocol::Command;
///
/// assert_eq!(encode_request(Command::Discover, 1), [0x04, 0x81, 0x7A, 0xFF]);
/// ```
pub fn encode_request(command: Command, address: u8) -> [u8; IBUS_REQUEST_FRAME_SIZE] {
    encode_short_frame(command.code() | (address & IBUS_ADDRESS_MASK))
}

/// Encode the discovery echo for `address`
///
/// The echo is byte-for-byte the request a master sends for that address.
pub fn encode_discovery_response(address: u8) -> [u8; IBUS_REQUEST_FRAME_SIZE] {
    encode_request(Command::Discover, address)
}

/// Encode a type response: `[0x06][0x90|addr][type][0x02][chk]`
pub fn encode_type_response(address: u8, sensor_type: u8) -> ResponseFrame {
    encode_long_frame(
        Command::Type,
        address,
        [sensor_type, IBUS_TYPE_VALUE_SIZE],
    )
}

/// Encode a measurement response: `[0x06][0xA0|addr][value LE][chk]`
pub fn encode_measurement_response(address: u8, value: u16) -> ResponseFrame {
    encode_long_frame(Command::Measurement, address, value.to_le_bytes())
}

fn encode_short_frame(command_address: u8) -> [u8; IBUS_REQUEST_FRAME_SIZE] {
    let [lo, hi] = checksum(&[IBUS_REQUEST_LENGTH, command_address]).to_le_bytes();
    [IBUS_REQUEST_LENGTH, command_address, lo, hi]
}

fn encode_long_frame(command: Command, address: u8, payload: [u8; 2]) -> ResponseFrame {
    let mut frame = [0u8; IBUS_RESPONSE_FRAME_SIZE];
    frame[0] = IBUS_RESPONSE_LENGTH;
    frame[1] = command.code() | (address & IBUS_ADDRESS_MASK);
    frame[2..4].copy_from_slice(&payload);

    let crc = checksum(&frame[..4]);
    frame[4..].copy_from_slice(&crc.to_le_bytes());

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibus::decoder::validate;

    #[test]
    fn test_encode_request_validates() {
        for command in [Command::Discover, Command::Type, Command::Measurement] {
            for address in 1..=MAX_SENSORS as u8 {
                assert!(validate(&encode_request(command, address)));
            }
        }
    }

    #[test]
    fn test_encode_discovery_response() {
        assert_eq!(encode_discovery_response(1), [0x04, 0x81, 0x7A, 0xFF]);
        assert_eq!(encode_discovery_response(4), [0x04, 0x84, 0x77, 0xFF]);
    }

    #[test]
    fn test_encode_type_response() {
        assert_eq!(
            encode_type_response(1, IBUS_SENSOR_RPM),
            [0x06, 0x91, 0x02, 0x02, 0x64, 0xFF]
        );
    }

    #[test]
    fn test_encode_measurement_response() {
        assert_eq!(
            encode_measurement_response(2, 0x10E8),
            [0x06, 0xA2, 0xE8, 0x10, 0x5F, 0xFE]
        );
        assert_eq!(
            encode_measurement_response(1, 4294),
            [0x06, 0xA1, 0xC6, 0x10, 0x82, 0xFE]
        );
    }

    #[test]
    fn test_encode_response_checksum_covers_payload() {
        let frame = encode_measurement_response(3, 0xFFFF);
        let crc = u16::from_le_bytes([frame[4], frame[5]]);
        assert_eq!(crc, checksum(&frame[..4]));
        assert_ne!(crc, checksum(&frame[..2]));
    }
}
