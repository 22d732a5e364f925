//! Status LEDs, recomputed on every main-loop pass.

use embedded_hal::digital::OutputPin;

use crate::display::Polarity;
use crate::error::Error;
use crate::state::{AlarmState, Mode, SharedClockState};

/// The four status LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Indicators {
    /// Blinks at 1 Hz while the alarm rings.
    pub alarm_signal: bool,
    pub alarm_setting: bool,
    pub clock_setting: bool,
    /// Follows the 1 Hz blink phase.
    pub second: bool,
}

impl Indicators {
    pub const fn derive(mode: Mode, alarm: AlarmState, blink_phase: bool) -> Self {
        if alarm.ringing {
            Self {
                alarm_signal: blink_phase,
                alarm_setting: false,
                clock_setting: false,
                second: blink_phase,
            }
        } else {
            Self {
                alarm_signal: false,
                alarm_setting: matches!(mode, Mode::SettingAlarm),
                clock_setting: matches!(mode, Mode::SettingClock),
                second: blink_phase,
            }
        }
    }

    /// Packed as bit 0 alarm signal, bit 1 alarm setting, bit 2 clock setting, bit 3 second.
    pub const fn bits(&self) -> u8 {
        (self.alarm_signal as u8)
            | (self.alarm_setting as u8) << 1
            | (self.clock_setting as u8) << 2
            | (self.second as u8) << 3
    }

    fn states(&self) -> [bool; 4] {
        [
            self.alarm_signal,
            self.alarm_setting,
            self.clock_setting,
            self.second,
        ]
    }
}

impl SharedClockState {
    pub fn indicators(&self) -> Indicators {
        Indicators::derive(self.mode, self.alarm_state, self.flags.blink_phase())
    }
}

/// Sink for a full set of indicator states.
pub trait IndicatorOutput {
    type Error;

    fn write(&mut self, indicators: Indicators) -> Result<(), Self::Error>;
}

/// LEDs on GPIO, ordered like [`Indicators::bits`].
pub struct GpioIndicators<P> {
    pins: [P; 4],
    polarity: Polarity,
}

impl<P: OutputPin> GpioIndicators<P> {
    pub fn new(pins: [P; 4], polarity: Polarity) -> Self {
        Self { pins, polarity }
    }

    pub fn release(self) -> [P; 4] {
        self.pins
    }
}

impl<P: OutputPin> IndicatorOutput for GpioIndicators<P> {
    type Error = Error<P::Error>;

    fn write(&mut self, indicators: Indicators) -> Result<(), Self::Error> {
        for (pin, on) in self.pins.iter_mut().zip(indicators.states()) {
            pin.set_state(self.polarity.level(on)).map_err(Error::Pin)?;
        }
        Ok(())
    }
}
