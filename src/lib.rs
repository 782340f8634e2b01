//! Host-side driver for the Sequent Microsystems eight-thermocouple
//! stackable HAT, plus the pieces of the `smtc` monitor built on it.

pub mod acquisition;
pub mod config;
pub mod driver;
pub mod util;
