#![cfg_attr(not(test), no_std)]

//! Control core of a keypad-driven alarm clock.
//!
//! Hardware-facing pieces sit behind `embedded-hal` traits so the same code
//! runs in the RP2040 firmware and in host tests:
//!
//! - [`MatrixKeypad`] scans a 4x4 key matrix.
//! - [`Multiplexer`] lights one 7-segment digit per refresh interrupt.
//! - [`SharedClockState`] holds time, alarm, mode and the 1 Hz flags shared
//!   with the interrupts; all access goes through an RTIC lock.
//! - [`Controller`] is the main loop: keys, timekeeping, alarm, status LEDs.

pub mod alarm;
pub mod clock;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod indicators;
pub mod keypad;
pub mod state;

#[cfg(test)]
mod testing;

pub use alarm::TickReport;
pub use clock::{AlarmTime, ClockTime};
pub use config::ClockConfig;
pub use controller::{Controller, Pass};
pub use display::{GpioSegmentDisplay, Multiplexer, Polarity, Position, Readout, SegmentDisplay};
pub use error::Error;
pub use indicators::{GpioIndicators, IndicatorOutput, Indicators};
pub use keypad::{Key, KeyFunction, KeyScanner, MatrixKeypad, ReleasePolicy};
pub use state::{AlarmState, KeyAction, Mode, SharedClockState, TickFlags};
