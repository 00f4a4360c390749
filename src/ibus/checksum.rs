//! # iBUS Checksum
//!
//! 16-bit complement-of-sum checksum: `0xFFFF - sum(bytes)`, summed with
//! 16-bit wraparound and sent little-endian after the payload.

/// Checksum seed; the sum of all covered bytes is subtracted from it
const CHECKSUM_SEED: u16 = 0xFFFF;

/// Calculate the iBUS checksum over `data`
///
/// # Arguments
///
/// * `data` - Every frame byte preceding the checksum
///
/// # Returns
///
/// * `u16` - Checksum value (send as `to_le_bytes()`)
///
/// # Examples
///
/// ```
/// use ibus_telemetry::ibus::checksum::checksum;
///
/// // Discovery request for sensor 1
/// assert_eq!(checksum(&[0x04, 0x81]), 0xFF7A);
/// ```
pub fn checksum(data: &[u8]) -> u16 {
    let sum = data
        .iter()
        .fold(0u16, |acc, &byte| acc.wrapping_add(u16::from(byte)));

    CHECKSUM_SEED.wrapping_sub(sum)
}

/// Check a request frame checksum.
///
/// Request checksums cover only the length and command/address bytes, which
/// is what bus masters send, so this does not re-sum the whole frame.
pub fn request_checksum_matches(length: u8, command_address: u8, received: u16) -> bool {
    checksum(&[length, command_address]) == received
}
