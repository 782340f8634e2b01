//! Register map of the thermocouple HAT firmware.
//!
//! Every offset is derived from the previous one plus that register's width,
//! so the layout below is the byte-for-byte memory image the board exposes.

/// I2C address of the board at stack position 0.
pub const BASE_ADDRESS: u8 = 0x16;

/// Highest stack position selectable with the address jumpers.
pub const MAX_STACK: u8 = 7;

pub const CHANNEL_COUNT: u8 = 8;

pub const TEMPERATURE_SIZE: u8 = 2;
pub const MILLIVOLT_SIZE: u8 = 2;

/// Temperature registers hold tenths of a degree Celsius.
pub const TEMPERATURE_SCALE: f32 = 10.0;

/// Millivolt registers hold hundredths of a millivolt.
pub const MILLIVOLT_SCALE: f32 = 100.0;

pub const TEMPERATURE_1: u8 = 0;
pub const SENSOR_TYPE_1: u8 = TEMPERATURE_1 + TEMPERATURE_SIZE * CHANNEL_COUNT;

pub mod diag {
    use super::{CHANNEL_COUNT, SENSOR_TYPE_1};

    /// Board temperature, whole degrees.
    pub const TEMPERATURE: u8 = SENSOR_TYPE_1 + CHANNEL_COUNT;
    /// 5V rail, millivolts.
    pub const SUPPLY_5V: u8 = TEMPERATURE + 1;
}

pub mod watchdog {
    use super::diag;

    pub const RESET: u8 = diag::SUPPLY_5V + 2;
    pub const INTERVAL_SET: u8 = RESET + 1;
    pub const INTERVAL_GET: u8 = INTERVAL_SET + 2;
    pub const INIT_INTERVAL_SET: u8 = INTERVAL_GET + 2;
    pub const INIT_INTERVAL_GET: u8 = INIT_INTERVAL_SET + 2;
    pub const RESET_COUNT: u8 = INIT_INTERVAL_GET + 2;
    pub const CLEAR_RESET_COUNT: u8 = RESET_COUNT + 2;
    pub const POWER_OFF_INTERVAL_SET: u8 = CLEAR_RESET_COUNT + 1;
    pub const POWER_OFF_INTERVAL_GET: u8 = POWER_OFF_INTERVAL_SET + 4;
}

pub mod revision {
    use super::watchdog;

    pub const HW_MAJOR: u8 = watchdog::POWER_OFF_INTERVAL_GET + 4;
    pub const HW_MINOR: u8 = HW_MAJOR + 1;
    pub const FW_MAJOR: u8 = HW_MINOR + 1;
    pub const FW_MINOR: u8 = FW_MAJOR + 1;
}

pub const MILLIVOLTS_1: u8 = revision::FW_MINOR + 1;

pub mod misc {
    use super::{CHANNEL_COUNT, MILLIVOLTS_1, MILLIVOLT_SIZE};

    pub const REINIT_COUNT: u8 = MILLIVOLTS_1 + MILLIVOLT_SIZE * CHANNEL_COUNT;
    pub const SPS_1: u8 = REINIT_COUNT + 4;
    pub const SPS_2: u8 = SPS_1 + 2;
    pub const CARD_TYPE: u8 = SPS_2 + 2;
    pub const HOST_VOLTAGE: u8 = CARD_TYPE + 1;
    pub const MODBUS_SETTINGS: u8 = HOST_VOLTAGE + 2;
    pub const LEDS_FUNCTION: u8 = MODBUS_SETTINGS + 5;
    pub const LED_THRESHOLD_1: u8 = LEDS_FUNCTION + 2;
    pub const CALIBRATION_VALUE: u8 = LED_THRESHOLD_1 + 2 * CHANNEL_COUNT;
    pub const CALIBRATION_CHANNEL: u8 = CALIBRATION_VALUE + 4;
    pub const SENSORS_TYPE: u8 = CALIBRATION_CHANNEL + 1;
    pub const ADC_SAMPLE_SWITCH: u8 = SENSORS_TYPE + 1;
    pub const THERMISTOR_1: u8 = ADC_SAMPLE_SWITCH + 2;
    pub const THERMISTOR_END: u8 = THERMISTOR_1 + 20;
}

/// Bus address of the board at `stack`. Positions past [`MAX_STACK`]
/// saturate to the last board.
pub const fn address(stack: u8) -> u8 {
    let stack = if stack > MAX_STACK { MAX_STACK } else { stack };
    BASE_ADDRESS + stack
}

/// A per-channel register family.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Quantity {
    /// Signed tenths of a degree Celsius.
    Temperature,

    /// Signed hundredths of a millivolt, straight from the thermocouple.
    Millivolts,

    /// Thermocouple type code, see [`super::sensor_type::ThermocoupleType`].
    SensorType,
}

impl Quantity {
    pub const fn base(self) -> u8 {
        match self {
            Quantity::Temperature => TEMPERATURE_1,
            Quantity::Millivolts => MILLIVOLTS_1,
            Quantity::SensorType => SENSOR_TYPE_1,
        }
    }

    pub const fn width(self) -> u8 {
        match self {
            Quantity::Temperature => TEMPERATURE_SIZE,
            Quantity::Millivolts => MILLIVOLT_SIZE,
            Quantity::SensorType => 1,
        }
    }

    /// Offset of the register for a 1-indexed `channel`. The channel must
    /// already be validated.
    pub const fn offset(self, channel: u8) -> u8 {
        self.base() + (channel - 1) * self.width()
    }

    /// Divisor turning the raw register value into engineering units.
    pub const fn scale(self) -> f32 {
        match self {
            Quantity::Temperature => TEMPERATURE_SCALE,
            Quantity::Millivolts => MILLIVOLT_SCALE,
            Quantity::SensorType => 1.0,
        }
    }

    /// Byte range covered by the whole family.
    pub const fn span(self) -> (u8, u8) {
        (self.base(), self.base() + self.width() * CHANNEL_COUNT)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const FAMILIES: [Quantity; 3] = [
        Quantity::Temperature,
        Quantity::SensorType,
        Quantity::Millivolts,
    ];

    #[test]
    fn firmware_layout() {
        assert_eq!(SENSOR_TYPE_1, 16);
        assert_eq!(diag::TEMPERATURE, 24);
        assert_eq!(watchdog::RESET, 27);
        assert_eq!(revision::FW_MAJOR, 49);
        assert_eq!(MILLIVOLTS_1, 51);
        assert_eq!(misc::REINIT_COUNT, 67);
        assert_eq!(misc::CALIBRATION_VALUE, 101);
        assert_eq!(misc::THERMISTOR_END, 129);
    }

    #[test]
    fn channel_offsets() {
        assert_eq!(Quantity::Temperature.offset(1), 0);
        assert_eq!(Quantity::Temperature.offset(8), 14);
        assert_eq!(Quantity::SensorType.offset(3), 18);
        assert_eq!(Quantity::Millivolts.offset(1), 51);
        assert_eq!(Quantity::Millivolts.offset(8), 65);
    }

    #[test]
    fn families_do_not_overlap() {
        for (i, a) in FAMILIES.iter().enumerate() {
            for b in &FAMILIES[i + 1..] {
                let (a_start, a_end) = a.span();
                let (b_start, b_end) = b.span();
                assert!(a_end <= b_start || b_end <= a_start, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn families_avoid_reserved_registers() {
        let reserved = [
            diag::TEMPERATURE,
            diag::SUPPLY_5V,
            watchdog::RESET,
            watchdog::POWER_OFF_INTERVAL_GET,
            revision::HW_MAJOR,
            revision::FW_MAJOR,
            revision::FW_MINOR,
            misc::REINIT_COUNT,
        ];

        for family in FAMILIES {
            let (start, end) = family.span();
            for reg in reserved {
                assert!(!(start..end).contains(&reg), "{family:?} covers {reg}");
            }
        }
    }

    #[test]
    fn offsets_strictly_increase() {
        for family in FAMILIES {
            for channel in 2..=CHANNEL_COUNT {
                assert!(family.offset(channel) > family.offset(channel - 1));
            }
        }
    }

    #[test]
    fn stack_address() {
        assert_eq!(address(0), 0x16);
        assert_eq!(address(2), 0x18);
        assert_eq!(address(7), 0x1D);
        assert_eq!(address(8), 0x1D);
        assert_eq!(address(u8::MAX), 0x1D);
    }
}
