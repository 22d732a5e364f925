//! Multiplexed 4-digit 7-segment display.
//!
//! One digit is lit per refresh; cycling through all four at ~1 kHz makes the
//! whole readout appear steady.

use embedded_hal::digital::{OutputPin, PinState};

use crate::clock::{AlarmTime, ClockTime};
use crate::error::Error;

/// Segment patterns, bit 0 = segment a through bit 6 = segment g, bit 7 = dp.
/// Indices 0-9 are digits, 10-15 are A-F, 16 is blank.
pub const SEGMENTS: [u8; 17] = [
    0b0011_1111, // 0
    0b0000_0110, // 1
    0b0101_1011, // 2
    0b0100_1111, // 3
    0b0110_0110, // 4
    0b0110_1101, // 5
    0b0111_1101, // 6
    0b0010_0111, // 7
    0b0111_1111, // 8
    0b0110_0111, // 9
    0b0111_0111, // A
    0b0111_1100, // b
    0b0101_1000, // c
    0b0101_1110, // d
    0b0111_1001, // E
    0b0111_0001, // F
    0b0000_0000, // blank
];

pub const BLANK: u8 = SEGMENTS[16];

/// Digit position, right to left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Position {
    #[default]
    MinutesOnes,
    MinutesTens,
    HoursOnes,
    HoursTens,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::MinutesOnes,
        Position::MinutesTens,
        Position::HoursOnes,
        Position::HoursTens,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// 0 -> 1 -> 2 -> 3 -> 0.
    pub const fn next(self) -> Position {
        Position::ALL[(self.index() + 1) & 3]
    }
}

/// Hours and minutes to be shown, copied out of the shared state in one go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readout {
    pub hours: u8,
    pub minutes: u8,
}

impl Readout {
    pub const fn digit(&self, position: Position) -> u8 {
        match position {
            Position::MinutesOnes => self.minutes % 10,
            Position::MinutesTens => (self.minutes / 10) % 10,
            Position::HoursOnes => self.hours % 10,
            Position::HoursTens => (self.hours / 10) % 10,
        }
    }
}

impl From<ClockTime> for Readout {
    fn from(t: ClockTime) -> Self {
        Self {
            hours: t.hours(),
            minutes: t.minutes(),
        }
    }
}

impl From<AlarmTime> for Readout {
    fn from(a: AlarmTime) -> Self {
        Self {
            hours: a.hours(),
            minutes: a.minutes(),
        }
    }
}

/// Something that can light one digit position with a segment pattern.
pub trait SegmentDisplay {
    type Error;

    /// Shows `segments` at `position` and turns every other position off.
    fn show(&mut self, position: Position, segments: u8) -> Result<(), Self::Error>;
}

/// Electrical level that turns a segment or position on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    pub const fn level(self, on: bool) -> PinState {
        match (self, on) {
            (Polarity::ActiveHigh, true) | (Polarity::ActiveLow, false) => PinState::High,
            _ => PinState::Low,
        }
    }
}

/// Display driven straight from GPIO: 8 segment lines and 4 position selects.
pub struct GpioSegmentDisplay<S, P> {
    segments: [S; 8],
    positions: [P; 4],
    segment_polarity: Polarity,
    position_polarity: Polarity,
}

impl<S, P, E> GpioSegmentDisplay<S, P>
where
    S: OutputPin<Error = E>,
    P: OutputPin<Error = E>,
{
    /// `segments` are ordered a, b, c, d, e, f, g, dp.
    pub fn new(
        segments: [S; 8],
        positions: [P; 4],
        segment_polarity: Polarity,
        position_polarity: Polarity,
    ) -> Self {
        Self {
            segments,
            positions,
            segment_polarity,
            position_polarity,
        }
    }

    pub fn release(self) -> ([S; 8], [P; 4]) {
        (self.segments, self.positions)
    }
}

impl<S, P, E> SegmentDisplay for GpioSegmentDisplay<S, P>
where
    S: OutputPin<Error = E>,
    P: OutputPin<Error = E>,
{
    type Error = Error<E>;

    fn show(&mut self, position: Position, segments: u8) -> Result<(), Error<E>> {
        // blank first so the new pattern never flashes on the previous digit
        for pin in self.positions.iter_mut() {
            pin.set_state(self.position_polarity.level(false))
                .map_err(Error::Pin)?;
        }
        for (bit, pin) in self.segments.iter_mut().enumerate() {
            let on = segments & (1 << bit) != 0;
            pin.set_state(self.segment_polarity.level(on))
                .map_err(Error::Pin)?;
        }
        self.positions[position.index()]
            .set_state(self.position_polarity.level(true))
            .map_err(Error::Pin)
    }
}

/// Position counter of the refresh interrupt.
#[derive(Debug, Default)]
pub struct Multiplexer {
    position: Position,
}

impl Multiplexer {
    pub const fn new() -> Self {
        Self {
            position: Position::MinutesOnes,
        }
    }

    /// Position that the next refresh will light.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Lights the current position with its digit of `readout` and moves to the next position.
    pub fn refresh<D: SegmentDisplay>(
        &mut self,
        readout: Readout,
        display: &mut D,
    ) -> Result<Position, D::Error> {
        let position = self.position;
        let digit = readout.digit(position);
        display.show(position, SEGMENTS[digit as usize])?;
        self.position = position.next();
        Ok(position)
    }
}
