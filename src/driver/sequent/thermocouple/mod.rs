//! Driver for the Sequent Microsystems eight-thermocouple stackable HAT.
//!
//! Up to eight boards share one I2C bus, each answering at
//! [`registers::BASE_ADDRESS`] plus its stack position. The driver keeps no
//! handle to the bus; each operation borrows it, so one bus serves every board
//! in the stack.

use bytes::Buf;
use embedded_hal::blocking::i2c::{Read, Write};
use num_traits::FromPrimitive;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

pub mod registers;
pub mod sensor_type;

use registers::{Quantity, CHANNEL_COUNT};
pub use sensor_type::ThermocoupleType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The board did not acknowledge or returned too few bytes. An absent
    /// board looks exactly like a bus error.
    #[error("i2c error")]
    I2c,
    #[error("invalid channel {0}, expected 1..=8")]
    InvalidChannel(u8),
    #[error("invalid sensor type code {0}, expected 0..=7")]
    InvalidSensorType(u8),
    #[error("board reported unknown sensor type code {0}")]
    UnknownSensorType(u8),
}

/// A `major.minor` revision pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

#[derive(Debug, Clone)]
pub struct ThermocoupleHat {
    stack: u8,
    address: u8,
    detected: bool,
}

fn check_channel(channel: u8) -> Result<(), Error> {
    if channel == 0 || channel > CHANNEL_COUNT {
        return Err(Error::InvalidChannel(channel));
    }

    Ok(())
}

impl ThermocoupleHat {
    /// Board at stack position `stack`. Positions above 7 are treated as 7.
    pub fn new(stack: u8) -> Self {
        let stack = stack.min(registers::MAX_STACK);

        Self {
            stack,
            address: registers::address(stack),
            detected: false,
        }
    }

    pub fn stack(&self) -> u8 {
        self.stack
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    fn write<I2C: Write>(&self, i2c: &mut I2C, offset: u8, value: u8) -> Result<(), Error> {
        trace!(address = self.address, offset, value, "write register");

        i2c.write(self.address, &[offset, value])
            .map_err(|_| Error::I2c)
    }

    fn read<I2C: Read + Write, const N: usize>(
        &self,
        i2c: &mut I2C,
        offset: u8,
    ) -> Result<[u8; N], Error> {
        trace!(address = self.address, offset, len = N, "read register");

        let mut buf = [0u8; N];
        i2c.write(self.address, &[offset])
            .map_err(|_| Error::I2c)?;
        i2c.read(self.address, &mut buf)
            .map_err(|_| Error::I2c)?;
        Ok(buf)
    }

    fn read_scaled<I2C: Read + Write>(
        &self,
        i2c: &mut I2C,
        quantity: Quantity,
        channel: u8,
    ) -> Result<f32, Error> {
        check_channel(channel)?;

        let buf: [u8; 2] = self.read(i2c, quantity.offset(channel))?;
        let raw = (&buf[..]).get_i16_le();
        Ok(raw as f32 / quantity.scale())
    }

    /// Check whether the board answers by reading its firmware revision.
    ///
    /// Once a probe succeeds the board stays detected; later failures do not
    /// clear it.
    pub fn probe<I2C: Read + Write>(&mut self, i2c: &mut I2C) -> bool {
        match self.read::<_, 1>(i2c, registers::revision::FW_MAJOR) {
            Ok([major]) => {
                debug!(stack = self.stack, address = self.address, major, "board detected");
                self.detected = true;
            }
            Err(err) => {
                debug!(stack = self.stack, address = self.address, "probe failed: {err}");
            }
        }

        self.detected
    }

    /// Whether a probe has ever succeeded. Does not touch the bus.
    pub fn is_alive(&self) -> bool {
        self.detected
    }

    /// Set the thermocouple type of a channel (1-8) from its raw code (0-7).
    pub fn set_sensor_type<I2C: Write>(
        &self,
        i2c: &mut I2C,
        channel: u8,
        code: u8,
    ) -> Result<(), Error> {
        check_channel(channel)?;
        if code > ThermocoupleType::MAX_CODE {
            return Err(Error::InvalidSensorType(code));
        }

        self.write(i2c, Quantity::SensorType.offset(channel), code)
    }

    pub fn set_thermocouple_type<I2C: Write>(
        &self,
        i2c: &mut I2C,
        channel: u8,
        ty: ThermocoupleType,
    ) -> Result<(), Error> {
        self.set_sensor_type(i2c, channel, ty.code())
    }

    /// Read back the thermocouple type configured on a channel.
    pub fn sensor_type<I2C: Read + Write>(
        &self,
        i2c: &mut I2C,
        channel: u8,
    ) -> Result<ThermocoupleType, Error> {
        check_channel(channel)?;

        let [code] = self.read::<_, 1>(i2c, Quantity::SensorType.offset(channel))?;
        ThermocoupleType::from_u8(code).ok_or(Error::UnknownSensorType(code))
    }

    /// Temperature of a channel (1-8) in degrees Celsius.
    pub fn read_temperature<I2C: Read + Write>(
        &self,
        i2c: &mut I2C,
        channel: u8,
    ) -> Result<f32, Error> {
        self.read_scaled(i2c, Quantity::Temperature, channel)
    }

    /// Raw thermocouple voltage of a channel (1-8) in millivolts.
    pub fn read_millivolts<I2C: Read + Write>(
        &self,
        i2c: &mut I2C,
        channel: u8,
    ) -> Result<f32, Error> {
        self.read_scaled(i2c, Quantity::Millivolts, channel)
    }

    /// Read every channel in order. The first failure is returned and the
    /// readings gathered so far are dropped.
    pub fn read_all_temperatures<I2C: Read + Write>(
        &self,
        i2c: &mut I2C,
    ) -> Result<[f32; CHANNEL_COUNT as usize], Error> {
        let mut temperatures = [0f32; CHANNEL_COUNT as usize];

        for (channel, temperature) in (1..=CHANNEL_COUNT).zip(temperatures.iter_mut()) {
            *temperature = self.read_temperature(i2c, channel)?;
        }

        Ok(temperatures)
    }

    pub fn firmware_version<I2C: Read + Write>(&self, i2c: &mut I2C) -> Result<Version, Error> {
        let [major, minor] = self.read::<_, 2>(i2c, registers::revision::FW_MAJOR)?;
        Ok(Version { major, minor })
    }

    pub fn hardware_version<I2C: Read + Write>(&self, i2c: &mut I2C) -> Result<Version, Error> {
        let [major, minor] = self.read::<_, 2>(i2c, registers::revision::HW_MAJOR)?;
        Ok(Version { major, minor })
    }
}
