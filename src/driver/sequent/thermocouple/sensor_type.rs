use std::{fmt, str::FromStr};

use num_derive::{FromPrimitive, ToPrimitive};
use serde::Deserialize;
use thiserror::Error;

/// Thermocouple types understood by the board, with their register codes.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Deserialize,
)]
#[repr(u8)]
pub enum ThermocoupleType {
    B = 0,
    E = 1,
    J = 2,
    K = 3,
    N = 4,
    R = 5,
    S = 6,
    T = 7,
}

impl ThermocoupleType {
    pub const ALL: [ThermocoupleType; 8] = [
        ThermocoupleType::B,
        ThermocoupleType::E,
        ThermocoupleType::J,
        ThermocoupleType::K,
        ThermocoupleType::N,
        ThermocoupleType::R,
        ThermocoupleType::S,
        ThermocoupleType::T,
    ];

    /// Highest valid register code.
    pub const MAX_CODE: u8 = ThermocoupleType::T as u8;

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn letter(self) -> char {
        match self {
            ThermocoupleType::B => 'B',
            ThermocoupleType::E => 'E',
            ThermocoupleType::J => 'J',
            ThermocoupleType::K => 'K',
            ThermocoupleType::N => 'N',
            ThermocoupleType::R => 'R',
            ThermocoupleType::S => 'S',
            ThermocoupleType::T => 'T',
        }
    }
}

impl From<ThermocoupleType> for u8 {
    fn from(ty: ThermocoupleType) -> Self {
        ty.code()
    }
}

impl fmt::Display for ThermocoupleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown thermocouple type {0:?}, expected one of B, E, J, K, N, R, S, T")]
pub struct ParseThermocoupleTypeError(pub String);

impl FromStr for ThermocoupleType {
    type Err = ParseThermocoupleTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();

        match (chars.next(), chars.next()) {
            (Some(c), None) => ThermocoupleType::ALL
                .into_iter()
                .find(|ty| ty.letter() == c.to_ascii_uppercase())
                .ok_or_else(|| ParseThermocoupleTypeError(s.to_owned())),
            _ => Err(ParseThermocoupleTypeError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod test {
    use num_traits::FromPrimitive;

    use super::ThermocoupleType;

    #[test]
    fn codes_match_firmware() {
        assert_eq!(ThermocoupleType::B.code(), 0);
        assert_eq!(ThermocoupleType::K.code(), 3);
        assert_eq!(ThermocoupleType::T.code(), 7);
        assert_eq!(ThermocoupleType::from_u8(2), Some(ThermocoupleType::J));
        assert_eq!(ThermocoupleType::from_u8(8), None);
    }

    #[test]
    fn parse_letter() {
        assert_eq!("K".parse(), Ok(ThermocoupleType::K));
        assert_eq!(" t ".parse(), Ok(ThermocoupleType::T));
        assert!("KK".parse::<ThermocoupleType>().is_err());
        assert!("X".parse::<ThermocoupleType>().is_err());
        assert!("".parse::<ThermocoupleType>().is_err());
    }

    #[test]
    fn display_letter() {
        assert_eq!(ThermocoupleType::K.to_string(), "K");
        assert_eq!(format!("type {}", ThermocoupleType::N), "type N");
    }
}
