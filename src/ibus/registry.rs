//! # Sensor Registry
//!
//! Fixed-capacity table of sensors served on the bus.
//!
//! Each distinct sensor type takes the first free slot the first time a value
//! is set for it; its bus address is `slot index + 1` from then on. Slots are
//! never released, so addresses stay stable for the life of the registry.

use super::protocol::MAX_SENSORS;

/// One occupied registry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSlot {
    /// iBUS sensor type code
    pub sensor_type: u8,

    /// Current raw value in protocol units
    pub value: u16,
}

/// Outcome of [`SensorRegistry::set_value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// New sensor placed at `address`
    Added { address: u8 },
    /// Existing sensor at `address` updated in place
    Updated { address: u8 },
    /// No free slot; the value was dropped
    Full,
}

/// Fixed-size sensor table
#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    slots: [Option<SensorSlot>; MAX_SENSORS],
}

impl SensorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw value of a sensor type, registering it if needed
    ///
    /// # Arguments
    ///
    /// * `sensor_type` - iBUS sensor type code
    /// * `value` - Raw value in protocol units
    ///
    /// # Returns
    ///
    /// * `Registration` - Where the value went; `Full` leaves the table untouched
    ///
    /// # Examples
    ///
    /// ```
    /// use ibus_telemetry::ibus::registry::{Registration, SensorRegistry};
    ///
    /// let mut registry = SensorRegistry::new();
    /// assert_eq!(registry.set_value(0x02, 4294), Registration::Added { address: 1 });
    /// assert_eq!(registry.set_value(0x02, 4300), Registration::Updated { address: 1 });
    /// ```
    pub fn set_value(&mut self, sensor_type: u8, value: u16) -> Registration {
        if let Some(index) = self.find(sensor_type) {
            if let Some(slot) = self.slots[index].as_mut() {
                slot.value = value;
            }
            return Registration::Updated { address: index_to_address(index) };
        }

        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(SensorSlot { sensor_type, value });
                Registration::Added { address: index_to_address(index) }
            }
            None => Registration::Full,
        }
    }

    /// Slot index of the sensor with `sensor_type`, if registered
    pub fn find(&self, sensor_type: u8) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(s) if s.sensor_type == sensor_type))
    }

    /// Sensor at a 1-based bus address, if that slot is occupied
    pub fn get(&self, address: u8) -> Option<&SensorSlot> {
        let index = usize::from(address).checked_sub(1)?;
        self.slots.get(index)?.as_ref()
    }

    /// Number of registered sensors
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over `(address, sensor)` for every registered sensor
    pub fn iter(&self) -> impl Iterator<Item = (u8, &SensorSlot)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|s| (index_to_address(index), s)))
    }
}

fn index_to_address(index: usize) -> u8 {
    // MAX_SENSORS is far below u8::MAX
    (index + 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibus::protocol::*;

    #[test]
    fn test_new_registry_is_empty() {
        let registry = SensorRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        for address in 0..=MAX_SENSORS as u8 + 1 {
            assert!(registry.get(address).is_none());
        }
    }

    #[test]
    fn test_addresses_follow_registration_order() {
        let mut registry = SensorRegistry::new();
        assert_eq!(
            registry.set_value(IBUS_SENSOR_RPM, 4294),
            Registration::Added { address: 1 }
        );
        assert_eq!(
            registry.set_value(IBUS_SENSOR_INTERNAL_VOLTAGE, 508),
            Registration::Added { address: 2 }
        );

        assert_eq!(registry.get(1).unwrap().sensor_type, IBUS_SENSOR_RPM);
        assert_eq!(registry.get(2).unwrap().sensor_type, IBUS_SENSOR_INTERNAL_VOLTAGE);
        assert!(registry.get(3).is_none());
    }

    #[test]
    fn test_update_is_idempotent_on_address() {
        let mut registry = SensorRegistry::new();
        registry.set_value(IBUS_SENSOR_TEMPERATURE, 100);
        registry.set_value(IBUS_SENSOR_RPM, 200);

        assert_eq!(
            registry.set_value(IBUS_SENSOR_TEMPERATURE, 611),
            Registration::Updated { address: 1 }
        );

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find(IBUS_SENSOR_TEMPERATURE), Some(0));
        assert_eq!(
            registry.get(1),
            Some(&SensorSlot { sensor_type: IBUS_SENSOR_TEMPERATURE, value: 611 })
        );
        assert_eq!(registry.iter().filter(|(_, s)| s.sensor_type == IBUS_SENSOR_TEMPERATURE).count(), 1);
    }

    #[test]
    fn test_capacity_bound() {
        let mut registry = SensorRegistry::new();
        for sensor_type in 0..MAX_SENSORS as u8 {
            registry.set_value(sensor_type, 1000 + u16::from(sensor_type));
        }

        assert_eq!(registry.set_value(0x41, 9999), Registration::Full);
        assert_eq!(registry.len(), MAX_SENSORS);
        assert_eq!(registry.find(0x41), None);
        for (address, slot) in registry.iter() {
            assert_eq!(slot.sensor_type, address - 1);
            assert_eq!(slot.value, 1000 + u16::from(address - 1));
        }
    }

    #[test]
    fn test_updates_still_work_when_full() {
        let mut registry = SensorRegistry::new();
        for sensor_type in 0..MAX_SENSORS as u8 {
            registry.set_value(sensor_type, 0);
        }

        assert_eq!(registry.set_value(3, 42), Registration::Updated { address: 4 });
        assert_eq!(registry.get(4).unwrap().value, 42);
    }

    #[test]
    fn test_get_out_of_range() {
        let mut registry = SensorRegistry::new();
        for sensor_type in 0..MAX_SENSORS as u8 {
            registry.set_value(sensor_type, 0);
        }

        assert!(registry.get(0).is_none());
        assert!(registry.get(MAX_SENSORS as u8 + 1).is_none());
        assert!(registry.get(0x0F).is_none());
    }

    #[test]
    fn test_find_missing_type() {
        let mut registry = SensorRegistry::new();
        registry.set_value(IBUS_SENSOR_RPM, 1);
        assert_eq!(registry.find(IBUS_SENSOR_TEMPERATURE), None);
    }

    #[test]
    fn test_type_ff_is_an_ordinary_type() {
        let mut registry = SensorRegistry::new();
        assert_eq!(registry.set_value(0xFF, 7), Registration::Added { address: 1 });
        assert_eq!(registry.find(0xFF), Some(0));
    }
}
