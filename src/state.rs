//! State shared between the interrupt handlers and the main loop, and the
//! keypad-driven mode machine that mutates it.
//!
//! Every context reaches `SharedClockState` through a lock, so reads of the
//! time, alarm and mode are never torn at a rollover.

use crate::clock::{AlarmTime, ClockTime};
use crate::display::Readout;
use crate::keypad::{Key, KeyFunction};

/// Operating mode of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    #[default]
    Normal,
    SettingClock,
    SettingAlarm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmState {
    /// Set when alarm setting is saved, never cleared.
    pub armed: bool,
    /// Alarm is signalling; cleared by any key.
    pub ringing: bool,
}

/// Flags produced by the 1 Hz interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickFlags {
    second_elapsed: bool,
    blink_phase: bool,
}

impl TickFlags {
    pub const fn new() -> Self {
        Self {
            second_elapsed: false,
            blink_phase: false,
        }
    }

    /// Called from the RTC interrupt only.
    pub fn on_rtc_tick(&mut self) {
        self.second_elapsed = true;
        self.blink_phase = !self.blink_phase;
    }

    /// Returns and clears the pending second.
    pub fn take_second(&mut self) -> bool {
        core::mem::replace(&mut self.second_elapsed, false)
    }

    pub const fn second_pending(&self) -> bool {
        self.second_elapsed
    }

    pub const fn blink_phase(&self) -> bool {
        self.blink_phase
    }
}

/// Outcome of feeding one key press to the mode machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// The press stopped a ringing alarm and did nothing else.
    Silenced,
    EnteredClockSetting,
    /// Clock setting left, seconds zeroed.
    SavedClock,
    EnteredAlarmSetting,
    /// Alarm setting left, alarm armed.
    SavedAlarm,
    /// A toggle key pressed while the other setting mode is active.
    ModeLocked,
    IncrementedHours,
    IncrementedMinutes,
    /// Key has no function in the current mode.
    Ignored,
}

impl KeyAction {
    /// Whether the press must be released before the next key is accepted.
    pub const fn needs_release(self) -> bool {
        !matches!(self, KeyAction::Ignored)
    }
}

/// Everything the interrupts and the main loop share.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SharedClockState {
    pub time: ClockTime,
    pub alarm: AlarmTime,
    pub alarm_state: AlarmState,
    pub mode: Mode,
    pub flags: TickFlags,
}

impl SharedClockState {
    /// Power-on state: 00:00:00, alarm 00:00 disarmed, normal mode.
    pub const fn new() -> Self {
        Self {
            time: ClockTime::MIDNIGHT,
            alarm: AlarmTime::new(0, 0),
            alarm_state: AlarmState {
                armed: false,
                ringing: false,
            },
            mode: Mode::Normal,
            flags: TickFlags::new(),
        }
    }

    pub fn on_rtc_tick(&mut self) {
        self.flags.on_rtc_tick();
    }

    /// What the display shows: the alarm while it is being set, the clock otherwise.
    pub fn readout(&self) -> Readout {
        match self.mode {
            Mode::SettingAlarm => self.alarm.into(),
            Mode::Normal | Mode::SettingClock => self.time.into(),
        }
    }

    /// Applies one accepted key press.
    pub fn apply_key(&mut self, key: Key) -> KeyAction {
        if self.alarm_state.ringing {
            self.alarm_state.ringing = false;
            return KeyAction::Silenced;
        }

        match (key.function(), self.mode) {
            (KeyFunction::ToggleClockSetting, Mode::Normal) => {
                self.mode = Mode::SettingClock;
                KeyAction::EnteredClockSetting
            }
            (KeyFunction::ToggleClockSetting, Mode::SettingClock) => {
                self.mode = Mode::Normal;
                self.time.zero_seconds();
                KeyAction::SavedClock
            }
            (KeyFunction::ToggleAlarmSetting, Mode::Normal) => {
                self.mode = Mode::SettingAlarm;
                KeyAction::EnteredAlarmSetting
            }
            (KeyFunction::ToggleAlarmSetting, Mode::SettingAlarm) => {
                self.mode = Mode::Normal;
                self.alarm_state.armed = true;
                KeyAction::SavedAlarm
            }
            (KeyFunction::ToggleClockSetting, Mode::SettingAlarm)
            | (KeyFunction::ToggleAlarmSetting, Mode::SettingClock) => KeyAction::ModeLocked,
            (KeyFunction::IncrementHours, Mode::SettingClock) => {
                self.time.increment_hours();
                KeyAction::IncrementedHours
            }
            (KeyFunction::IncrementMinutes, Mode::SettingClock) => {
                self.time.increment_minutes();
                KeyAction::IncrementedMinutes
            }
            (KeyFunction::IncrementHours, Mode::SettingAlarm) => {
                self.alarm.increment_hours();
                KeyAction::IncrementedHours
            }
            (KeyFunction::IncrementMinutes, Mode::SettingAlarm) => {
                self.alarm.increment_minutes();
                KeyAction::IncrementedMinutes
            }
            _ => KeyAction::Ignored,
        }
    }
}
