//! Host-side fakes shared by the unit tests.

use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

use crate::error::Error;
use crate::indicators::{IndicatorOutput, Indicators};
use crate::keypad::{Key, KeyScanner};

/// Keypad that replays a fixed list of scan results, then reports no key.
pub struct ScriptedKeypad {
    readings: VecDeque<Option<Key>>,
    pub scans: usize,
}

impl ScriptedKeypad {
    pub fn new(readings: &[Option<Key>]) -> Self {
        Self {
            readings: readings.iter().copied().collect(),
            scans: 0,
        }
    }

    pub fn push(&mut self, reading: Option<Key>) {
        self.readings.push_back(reading);
    }

    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl KeyScanner for ScriptedKeypad {
    type PinError = Infallible;

    fn scan(&mut self) -> Result<Option<Key>, Error<Infallible>> {
        self.scans += 1;
        Ok(self.readings.pop_front().flatten())
    }
}

/// Indicator output that keeps every frame it was given.
#[derive(Default)]
pub struct RecordingIndicators {
    pub frames: Vec<Indicators>,
}

impl IndicatorOutput for RecordingIndicators {
    type Error = Error<Infallible>;

    fn write(&mut self, indicators: Indicators) -> Result<(), Self::Error> {
        self.frames.push(indicators);
        Ok(())
    }
}
