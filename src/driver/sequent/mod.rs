//! Drivers for Sequent Microsystems Raspberry Pi add-on boards.

pub mod thermocouple;
