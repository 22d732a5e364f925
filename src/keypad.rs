//! 4x4 matrix keypad scanning and key codes.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::Error;

pub const ROWS: usize = 4;
pub const COLS: usize = 4;

/// Key code for each row/column crossing, row-major.
pub const KEY_MAP: [[u8; COLS]; ROWS] = [
    [1, 4, 7, 14],
    [2, 5, 8, 0],
    [3, 6, 9, 15],
    [10, 11, 12, 13],
];

/// A decoded key, code 0..=15.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Key(u8);

/// What a key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyFunction {
    /// 0-9, no function yet.
    Digit(u8),
    IncrementHours,
    IncrementMinutes,
    ToggleClockSetting,
    ToggleAlarmSetting,
    /// `*` and `#`.
    Unused,
}

impl Key {
    pub const INCREMENT_HOURS: Key = Key(10);
    pub const INCREMENT_MINUTES: Key = Key(11);
    pub const TOGGLE_CLOCK_SETTING: Key = Key(12);
    pub const TOGGLE_ALARM_SETTING: Key = Key(13);
    pub const STAR: Key = Key(14);
    pub const HASH: Key = Key(15);

    pub const fn from_code(code: u8) -> Option<Key> {
        if code < 16 {
            Some(Key(code))
        } else {
            None
        }
    }

    pub const fn code(self) -> u8 {
        self.0
    }

    pub const fn function(self) -> KeyFunction {
        match self.0 {
            0..=9 => KeyFunction::Digit(self.0),
            10 => KeyFunction::IncrementHours,
            11 => KeyFunction::IncrementMinutes,
            12 => KeyFunction::ToggleClockSetting,
            13 => KeyFunction::ToggleAlarmSetting,
            _ => KeyFunction::Unused,
        }
    }
}

/// How long `wait_for_release` keeps polling a held key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReleasePolicy {
    /// Poll until the key is released. A stuck key blocks the caller forever.
    Unbounded,
    /// Give up with `Error::StuckKey` after this many scans that still saw a key.
    MaxPolls(u32),
}

/// Source of key presses for the main loop.
pub trait KeyScanner {
    type PinError;

    /// One pass over the matrix. `None` when nothing is pressed.
    fn scan(&mut self) -> Result<Option<Key>, Error<Self::PinError>>;

    /// Blocks until no key is pressed. Returns the number of scans that still saw a key.
    fn wait_for_release(&mut self, policy: ReleasePolicy) -> Result<u32, Error<Self::PinError>> {
        let mut polls: u32 = 0;
        while self.scan()?.is_some() {
            polls = polls.saturating_add(1);
            if let ReleasePolicy::MaxPolls(max) = policy {
                if polls >= max {
                    return Err(Error::StuckKey);
                }
            }
        }
        Ok(polls)
    }
}

/// Keypad wired as 4 driven rows and 4 pulled-up columns.
///
/// A row is selected by driving it low; a pressed key pulls its column low.
pub struct MatrixKeypad<R, C, D> {
    rows: [R; ROWS],
    cols: [C; COLS],
    delay: D,
    settle_us: u32,
}

impl<R, C, D, E> MatrixKeypad<R, C, D>
where
    R: OutputPin<Error = E>,
    C: InputPin<Error = E>,
    D: DelayNs,
{
    /// `settle_us` is waited after each row change before reading the columns.
    pub fn new(rows: [R; ROWS], cols: [C; COLS], delay: D, settle_us: u32) -> Self {
        Self {
            rows,
            cols,
            delay,
            settle_us,
        }
    }

    /// Gives the pins and delay back.
    pub fn release(self) -> ([R; ROWS], [C; COLS], D) {
        (self.rows, self.cols, self.delay)
    }

    fn select_row(&mut self, active: usize) -> Result<(), Error<E>> {
        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == active {
                row.set_low().map_err(Error::Pin)?;
            } else {
                row.set_high().map_err(Error::Pin)?;
            }
        }
        Ok(())
    }

    fn deselect_rows(&mut self) -> Result<(), Error<E>> {
        for row in self.rows.iter_mut() {
            row.set_high().map_err(Error::Pin)?;
        }
        Ok(())
    }

    fn scan_rows(&mut self) -> Result<Option<Key>, Error<E>> {
        for r in 0..ROWS {
            self.select_row(r)?;
            self.delay.delay_us(self.settle_us);
            for (c, col) in self.cols.iter_mut().enumerate() {
                if col.is_low().map_err(Error::Pin)? {
                    return Ok(Some(Key(KEY_MAP[r][c])));
                }
            }
        }
        Ok(None)
    }
}

impl<R, C, D, E> KeyScanner for MatrixKeypad<R, C, D>
where
    R: OutputPin<Error = E>,
    C: InputPin<Error = E>,
    D: DelayNs,
{
    type PinError = E;

    fn scan(&mut self) -> Result<Option<Key>, Error<E>> {
        let found = self.scan_rows()?;
        self.deselect_rows()?;
        Ok(found)
    }
}
