//! Monitor configuration, loaded from a TOML file.
//!
//! ```toml
//! bus = 1
//! poll_interval_ms = 1000
//! read_millivolts = false
//!
//! [[boards]]
//! stack = 0
//! channels = [{ channel = 1, sensor_type = "K" }]
//! ```

use std::{collections::HashSet, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::driver::sequent::thermocouple::{
    registers::{CHANNEL_COUNT, MAX_STACK},
    ThermocoupleType,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    #[error("stack position {0} is out of range 0..=7")]
    InvalidStack(u8),
    #[error("stack position {0} is configured more than once")]
    DuplicateStack(u8),
    #[error("board {stack}: channel {channel} is out of range 1..=8")]
    InvalidChannel { stack: u8, channel: u8 },
    #[error("board {stack}: channel {channel} is configured more than once")]
    DuplicateChannel { stack: u8, channel: u8 },
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// I2C bus number, as in `/dev/i2c-N`.
    pub bus: u8,
    pub poll_interval_ms: u64,
    /// Also sample the raw thermocouple voltage of each channel.
    pub read_millivolts: bool,
    pub boards: Vec<BoardConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    pub stack: u8,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    pub channel: u8,
    pub sensor_type: ThermocoupleType,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            bus: 1,
            poll_interval_ms: 1000,
            read_millivolts: false,
            boards: vec![BoardConfig {
                stack: 0,
                channels: Vec::new(),
            }],
        }
    }
}

impl MonitorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let mut config: MonitorConfig = toml::from_str(text)?;

        if config.boards.is_empty() {
            config.boards = MonitorConfig::default().boards;
        }

        config.validate()?;
        Ok(config)
    }

    /// Unlike the driver, which saturates out-of-range stack positions, a
    /// config naming a board that cannot exist is rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        let mut stacks = HashSet::new();

        for board in &self.boards {
            if board.stack > MAX_STACK {
                return Err(ConfigError::InvalidStack(board.stack));
            }
            if !stacks.insert(board.stack) {
                return Err(ConfigError::DuplicateStack(board.stack));
            }

            let mut channels = HashSet::new();

            for ch in &board.channels {
                if ch.channel == 0 || ch.channel > CHANNEL_COUNT {
                    return Err(ConfigError::InvalidChannel {
                        stack: board.stack,
                        channel: ch.channel,
                    });
                }
                if !channels.insert(ch.channel) {
                    return Err(ConfigError::DuplicateChannel {
                        stack: board.stack,
                        channel: ch.channel,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod test {
    use super::{BoardConfig, ChannelConfig, ConfigError, MonitorConfig};
    use crate::driver::sequent::thermocouple::ThermocoupleType;

    #[test]
    fn full_config() {
        let config = MonitorConfig::from_toml(
            r#"
            bus = 0
            poll_interval_ms = 250
            read_millivolts = true

            [[boards]]
            stack = 0
            channels = [
                { channel = 1, sensor_type = "K" },
                { channel = 8, sensor_type = "T" },
            ]

            [[boards]]
            stack = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.bus, 0);
        assert_eq!(config.poll_interval().as_millis(), 250);
        assert!(config.read_millivolts);
        assert_eq!(
            config.boards,
            vec![
                BoardConfig {
                    stack: 0,
                    channels: vec![
                        ChannelConfig {
                            channel: 1,
                            sensor_type: ThermocoupleType::K
                        },
                        ChannelConfig {
                            channel: 8,
                            sensor_type: ThermocoupleType::T
                        },
                    ],
                },
                BoardConfig {
                    stack: 3,
                    channels: vec![],
                },
            ]
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        assert_eq!(MonitorConfig::from_toml("").unwrap(), MonitorConfig::default());
    }

    #[test]
    fn rejects_bad_boards() {
        assert!(matches!(
            MonitorConfig::from_toml("[[boards]]\nstack = 8\n"),
            Err(ConfigError::InvalidStack(8))
        ));
        assert!(matches!(
            MonitorConfig::from_toml("[[boards]]\nstack = 1\n[[boards]]\nstack = 1\n"),
            Err(ConfigError::DuplicateStack(1))
        ));
    }

    #[test]
    fn rejects_bad_channels() {
        assert!(matches!(
            MonitorConfig::from_toml(
                "[[boards]]\nstack = 2\nchannels = [{ channel = 9, sensor_type = \"K\" }]\n"
            ),
            Err(ConfigError::InvalidChannel { stack: 2, channel: 9 })
        ));
        assert!(matches!(
            MonitorConfig::from_toml(
                "[[boards]]\nstack = 0\nchannels = [{ channel = 2, sensor_type = \"K\" }, { channel = 2, sensor_type = \"J\" }]\n"
            ),
            Err(ConfigError::DuplicateChannel { stack: 0, channel: 2 })
        ));
    }

    #[test]
    fn rejects_unknown_sensor_type_and_fields() {
        assert!(matches!(
            MonitorConfig::from_toml(
                "[[boards]]\nstack = 0\nchannels = [{ channel = 1, sensor_type = \"X\" }]\n"
            ),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            MonitorConfig::from_toml("baud = 9600\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_zero_interval() {
        assert!(matches!(
            MonitorConfig::from_toml("poll_interval_ms = 0\n"),
            Err(ConfigError::ZeroInterval)
        ));
    }
}
