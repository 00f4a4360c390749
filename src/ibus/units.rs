//! # Unit Conversion
//!
//! Converts real-world sensor readings to iBUS raw values.
//!
//! | Sensor      | Unit | Raw encoding            |
//! |-------------|------|-------------------------|
//! | Voltage     | V    | 0.01 V steps            |
//! | Temperature | °C   | 0.1 °C steps, 0 = -40 °C |
//! | RPM         | rpm  | as is                   |
//!
//! Values are rounded to the nearest step and saturate at the ends of the
//! 16-bit range.

use super::protocol::SensorKind;

/// Temperature offset: raw 0 is -40 °C
const TEMPERATURE_OFFSET_C: f32 = 40.0;

/// Raw temperature steps per °C
const TEMPERATURE_SCALE: f32 = 10.0;

/// Raw voltage steps per volt
const VOLTAGE_SCALE: f32 = 100.0;

/// Convert volts to raw 0.01 V units
///
/// # Examples
///
/// ```
/// use ibus_telemetry::ibus::units::volts_to_raw;
///
/// assert_eq!(volts_to_raw(5.08), 508);
/// ```
pub fn volts_to_raw(volts: f32) -> u16 {
    saturate(volts * VOLTAGE_SCALE)
}

/// Convert °C to raw 0.1 °C units offset by -40 °C
///
/// # Examples
///
/// ```
/// use ibus_telemetry::ibus::units::celsius_to_raw;
///
/// assert_eq!(celsius_to_raw(21.12), 611);
/// ```
pub fn celsius_to_raw(celsius: f32) -> u16 {
    saturate((celsius + TEMPERATURE_OFFSET_C) * TEMPERATURE_SCALE)
}

/// Convert a reading in the unit of `kind` to its raw value
pub fn to_raw(kind: SensorKind, value: f32) -> u16 {
    match kind {
        SensorKind::InternalVoltage | SensorKind::ExternalVoltage => volts_to_raw(value),
        SensorKind::Temperature => celsius_to_raw(value),
        SensorKind::Rpm => saturate(value),
    }
}

fn saturate(scaled: f32) -> u16 {
    if scaled.is_nan() {
        return 0;
    }
    scaled.round().clamp(0.0, f32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volts_to_raw() {
        assert_eq!(volts_to_raw(5.08), 508);
        assert_eq!(volts_to_raw(12.41), 1241);
        assert_eq!(volts_to_raw(0.0), 0);
    }

    #[test]
    fn test_celsius_to_raw() {
        assert_eq!(celsius_to_raw(21.12), 611);
        assert_eq!(celsius_to_raw(-40.0), 0);
        assert_eq!(celsius_to_raw(0.0), 400);
    }

    #[test]
    fn test_saturation() {
        assert_eq!(volts_to_raw(-1.0), 0);
        assert_eq!(volts_to_raw(1000.0), u16::MAX);
        assert_eq!(celsius_to_raw(-100.0), 0);
        assert_eq!(to_raw(SensorKind::Rpm, 70000.0), u16::MAX);
        assert_eq!(to_raw(SensorKind::Rpm, f32::NAN), 0);
    }

    #[test]
    fn test_to_raw_by_kind() {
        assert_eq!(to_raw(SensorKind::InternalVoltage, 5.08), 508);
        assert_eq!(to_raw(SensorKind::ExternalVoltage, 12.41), 1241);
        assert_eq!(to_raw(SensorKind::Temperature, 21.12), 611);
        assert_eq!(to_raw(SensorKind::Rpm, 4294.0), 4294);
    }

    #[test]
    fn test_value_range_ends_map_to_raw_ends() {
        for kind in [
            SensorKind::InternalVoltage,
            SensorKind::Temperature,
            SensorKind::Rpm,
            SensorKind::ExternalVoltage,
        ] {
            let (min, max) = kind.value_range();
            assert_eq!(to_raw(kind, min), 0, "{:?} min", kind);
            assert_eq!(to_raw(kind, max), u16::MAX, "{:?} max", kind);
        }
    }
}
