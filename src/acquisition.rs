use std::thread::JoinHandle;

use anyhow::Context;
use embedded_hal::blocking::i2c::{Read, Write};
use rppal::i2c::I2c;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{
    config::MonitorConfig,
    driver::sequent::thermocouple::{registers::CHANNEL_COUNT, Error, ThermocoupleHat, Version},
    util::Interval,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub stack: u8,
    pub channel: u8,
    pub celsius: f32,
    pub millivolts: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Detected {
        stack: u8,
        address: u8,
        firmware: Option<Version>,
    },
    Missing {
        stack: u8,
        address: u8,
    },
    Reading(Reading),
    ReadFailed {
        stack: u8,
        channel: u8,
        error: Error,
    },
}

/// Returned when the event receiver has hung up.
#[derive(Debug)]
pub struct Disconnected;

pub struct Acquisition {
    config: MonitorConfig,
    boards: Vec<ThermocoupleHat>,
}

impl Acquisition {
    pub fn new(config: MonitorConfig) -> Self {
        let boards = config
            .boards
            .iter()
            .map(|board| ThermocoupleHat::new(board.stack))
            .collect();

        Self { config, boards }
    }

    pub fn boards(&self) -> &[ThermocoupleHat] {
        &self.boards
    }

    /// Probe every configured board and push the configured sensor types to
    /// the ones that answer.
    pub fn start<I2C: Read + Write>(
        &mut self,
        i2c: &mut I2C,
        evt_tx: &flume::Sender<Event>,
    ) -> Result<(), Disconnected> {
        for (hat, board) in self.boards.iter_mut().zip(&self.config.boards) {
            if !hat.probe(i2c) {
                warn!("no board at stack {} (address {:#04x})", hat.stack(), hat.address());

                evt_tx
                    .send(Event::Missing {
                        stack: hat.stack(),
                        address: hat.address(),
                    })
                    .map_err(|_| Disconnected)?;
                continue;
            }

            let firmware = match hat.firmware_version(i2c) {
                Ok(version) => Some(version),
                Err(err) => {
                    warn!("failed to read firmware version of board {}: {err}", hat.stack());
                    None
                }
            };

            evt_tx
                .send(Event::Detected {
                    stack: hat.stack(),
                    address: hat.address(),
                    firmware,
                })
                .map_err(|_| Disconnected)?;

            for ch in &board.channels {
                match hat.set_thermocouple_type(i2c, ch.channel, ch.sensor_type) {
                    Ok(()) => debug!(
                        "board {} channel {} set to type {}",
                        hat.stack(),
                        ch.channel,
                        ch.sensor_type
                    ),
                    Err(err) => warn!(
                        "failed to set type of board {} channel {}: {err}",
                        hat.stack(),
                        ch.channel
                    ),
                }
            }
        }

        Ok(())
    }

    /// Sample every channel of every detected board once.
    pub fn poll<I2C: Read + Write>(
        &self,
        i2c: &mut I2C,
        evt_tx: &flume::Sender<Event>,
    ) -> Result<(), Disconnected> {
        for hat in self.boards.iter().filter(|hat| hat.is_alive()) {
            for channel in 1..=CHANNEL_COUNT {
                let evt = match self.sample(hat, i2c, channel) {
                    Ok(reading) => Event::Reading(reading),
                    Err(error) => Event::ReadFailed {
                        stack: hat.stack(),
                        channel,
                        error,
                    },
                };

                trace!("sampled {evt:?}");
                evt_tx.send(evt).map_err(|_| Disconnected)?;
            }
        }

        Ok(())
    }

    fn sample<I2C: Read + Write>(
        &self,
        hat: &ThermocoupleHat,
        i2c: &mut I2C,
        channel: u8,
    ) -> Result<Reading, Error> {
        let celsius = hat.read_temperature(i2c, channel)?;
        let millivolts = if self.config.read_millivolts {
            Some(hat.read_millivolts(i2c, channel)?)
        } else {
            None
        };

        Ok(Reading {
            stack: hat.stack(),
            channel,
            celsius,
            millivolts,
        })
    }
}

pub fn spawn_thread(
    ct: CancellationToken,
    config: MonitorConfig,
    evt_tx: flume::Sender<Event>,
) -> JoinHandle<anyhow::Result<()>> {
    std::thread::spawn(move || {
        let mut i2c = I2c::with_bus(config.bus)
            .with_context(|| format!("failed to open i2c bus {}", config.bus))?;
        let mut interval = Interval::new(config.poll_interval());
        let mut acquisition = Acquisition::new(config);

        if acquisition.start(&mut i2c, &evt_tx).is_err() {
            return Ok(());
        }

        if !acquisition.boards().iter().any(ThermocoupleHat::is_alive) {
            anyhow::bail!("none of the configured boards responded");
        }

        debug!("polling every {:?}", interval.period());

        while !ct.is_cancelled() {
            if acquisition.poll(&mut i2c, &evt_tx).is_err() {
                debug!("event receiver closed");
                break;
            }

            interval.tick();
        }

        debug!("exiting acquisition loop");

        Ok(())
    })
}
