//! The cooperative main loop.
//!
//! One pass reads the keypad, feeds an accepted key to the mode machine, waits
//! for the key to be released, consumes a pending second and refreshes the
//! status LEDs. The shared state is only locked for the short updates, never
//! while the keypad is scanned or a release is awaited, so the interrupts keep
//! running during a long key press.

use rtic_core::Mutex;

use crate::alarm::TickReport;
use crate::error::Error;
use crate::indicators::{IndicatorOutput, Indicators};
use crate::keypad::{Key, KeyScanner, ReleasePolicy};
use crate::state::{KeyAction, SharedClockState};

/// What one main-loop pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pass {
    /// Key seen by the scan at the start of the pass.
    pub key: Option<Key>,
    /// Effect of the key, if it was accepted.
    pub action: Option<KeyAction>,
    /// The release wait gave up on this pass.
    pub stuck_key: bool,
    pub tick: Option<TickReport>,
    pub indicators: Indicators,
}

pub struct Controller<K> {
    keypad: K,
    release_policy: ReleasePolicy,
    /// A bounded release wait expired; keys are ignored until the keypad reads idle.
    awaiting_release: bool,
}

impl<K: KeyScanner> Controller<K> {
    pub fn new(keypad: K, release_policy: ReleasePolicy) -> Self {
        Self {
            keypad,
            release_policy,
            awaiting_release: false,
        }
    }

    pub fn keypad(&mut self) -> &mut K {
        &mut self.keypad
    }

    pub fn release(self) -> K {
        self.keypad
    }

    /// Runs one pass of the main loop.
    pub fn step<M, L>(&mut self, shared: &mut M, leds: &mut L) -> Result<Pass, Error<K::PinError>>
    where
        M: Mutex<T = SharedClockState>,
        L: IndicatorOutput<Error = Error<K::PinError>>,
    {
        let key = self.keypad.scan()?;
        let mut action = None;
        let mut stuck_key = false;

        if self.awaiting_release {
            if key.is_none() {
                self.awaiting_release = false;
            }
        } else if let Some(key) = key {
            let applied = shared.lock(|s| s.apply_key(key));
            #[cfg(feature = "defmt")]
            defmt::debug!("key {}: {}", key.code(), applied);

            if applied.needs_release() {
                match self.keypad.wait_for_release(self.release_policy) {
                    Ok(_) => {}
                    Err(Error::StuckKey) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("key {} still held, ignoring keypad until release", key.code());
                        self.awaiting_release = true;
                        stuck_key = true;
                    }
                    Err(e) => return Err(e),
                }
            }
            action = Some(applied);
        }

        let (tick, indicators) = shared.lock(|s| (s.service_tick(), s.indicators()));
        if let Some(report) = tick {
            if report.alarm_started {
                #[cfg(feature = "defmt")]
                defmt::info!("alarm ringing at {}", report.time);
            }
        }
        leds.write(indicators)?;

        Ok(Pass {
            key,
            action,
            stuck_key,
            tick,
            indicators,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{AlarmTime, ClockTime};
    use crate::state::Mode;
    use crate::testing::{RecordingIndicators, ScriptedKeypad};
    use rtic_core::Exclusive;

    /// Queues one press: the scan that sees it, `held` further scans during the release wait, then idle.
    fn press(kp: &mut ScriptedKeypad, key: Key, held: usize) {
        kp.push(Some(key));
        for _ in 0..held {
            kp.push(Some(key));
        }
        kp.push(None);
    }

    fn run(
        controller: &mut Controller<ScriptedKeypad>,
        state: &mut SharedClockState,
        leds: &mut RecordingIndicators,
    ) -> Pass {
        controller.step(&mut Exclusive(state), leds).unwrap()
    }

    #[test]
    fn setting_the_clock_from_the_keypad() {
        let mut kp = ScriptedKeypad::new(&[]);
        press(&mut kp, Key::TOGGLE_CLOCK_SETTING, 3);
        for _ in 0..5 {
            press(&mut kp, Key::INCREMENT_HOURS, 2);
        }
        press(&mut kp, Key::TOGGLE_CLOCK_SETTING, 1);

        let mut controller = Controller::new(kp, ReleasePolicy::Unbounded);
        let mut state = SharedClockState::new();
        state.time = ClockTime::new(21, 30, 17);
        let mut leds = RecordingIndicators::default();

        let first = run(&mut controller, &mut state, &mut leds);
        assert_eq!(first.action, Some(KeyAction::EnteredClockSetting));
        assert_eq!(state.mode, Mode::SettingClock);
        assert!(leds.frames[0].clock_setting);

        for _ in 0..5 {
            let pass = run(&mut controller, &mut state, &mut leds);
            assert_eq!(pass.action, Some(KeyAction::IncrementedHours));
        }
        assert_eq!(state.time.hours(), 2);

        let last = run(&mut controller, &mut state, &mut leds);
        assert_eq!(last.action, Some(KeyAction::SavedClock));
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.time, ClockTime::new(2, 30, 0));
        assert_eq!(controller.keypad().remaining(), 0);
    }

    #[test]
    fn held_key_counts_once() {
        let mut kp = ScriptedKeypad::new(&[]);
        press(&mut kp, Key::INCREMENT_MINUTES, 50);
        let mut controller = Controller::new(kp, ReleasePolicy::Unbounded);
        let mut state = SharedClockState::new();
        state.mode = Mode::SettingAlarm;
        let mut leds = RecordingIndicators::default();

        for _ in 0..3 {
            run(&mut controller, &mut state, &mut leds);
        }
        assert_eq!(state.alarm, AlarmTime::new(0, 1));
    }

    #[test]
    fn silencing_press_does_nothing_else_even_when_held() {
        let mut kp = ScriptedKeypad::new(&[]);
        press(&mut kp, Key::TOGGLE_CLOCK_SETTING, 20);
        let mut controller = Controller::new(kp, ReleasePolicy::Unbounded);
        let mut state = SharedClockState::new();
        state.alarm_state.armed = true;
        state.alarm_state.ringing = true;
        let mut leds = RecordingIndicators::default();

        let pass = run(&mut controller, &mut state, &mut leds);
        assert_eq!(pass.action, Some(KeyAction::Silenced));
        run(&mut controller, &mut state, &mut leds);

        assert!(!state.alarm_state.ringing);
        assert!(state.alarm_state.armed);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn unused_keys_are_not_waited_on() {
        let mut controller = Controller::new(
            ScriptedKeypad::new(&[Some(Key::HASH), Some(Key::STAR)]),
            ReleasePolicy::Unbounded,
        );
        let mut state = SharedClockState::new();
        let mut leds = RecordingIndicators::default();

        let pass = run(&mut controller, &mut state, &mut leds);
        assert_eq!(pass.action, Some(KeyAction::Ignored));
        assert_eq!(controller.keypad().scans, 1);
        assert_eq!(state, SharedClockState::new());
    }

    #[test]
    fn pending_second_is_serviced_every_pass() {
        let mut controller = Controller::new(ScriptedKeypad::new(&[]), ReleasePolicy::Unbounded);
        let mut state = SharedClockState::new();
        state.time = ClockTime::new(23, 59, 59);
        state.alarm_state.armed = true;
        let mut leds = RecordingIndicators::default();

        let idle = run(&mut controller, &mut state, &mut leds);
        assert_eq!(idle.tick, None);

        state.on_rtc_tick();
        let pass = run(&mut controller, &mut state, &mut leds);
        let report = pass.tick.unwrap();
        assert_eq!(report.time, ClockTime::MIDNIGHT);
        assert!(report.alarm_started);
        assert!(pass.indicators.alarm_signal);
        assert!(pass.indicators.second);
        assert_eq!(leds.frames.len(), 2);
    }

    #[test]
    fn stuck_key_is_ignored_until_released() {
        let mut kp = ScriptedKeypad::new(&[]);
        for _ in 0..10 {
            kp.push(Some(Key::INCREMENT_HOURS));
        }
        kp.push(None);
        press(&mut kp, Key::INCREMENT_HOURS, 0);

        let mut controller = Controller::new(kp, ReleasePolicy::MaxPolls(3));
        let mut state = SharedClockState::new();
        state.mode = Mode::SettingClock;
        let mut leds = RecordingIndicators::default();

        let first = run(&mut controller, &mut state, &mut leds);
        assert!(first.stuck_key);
        assert_eq!(state.time.hours(), 1);

        // 6 held readings left, then the idle reading that unlatches
        for _ in 0..7 {
            let pass = run(&mut controller, &mut state, &mut leds);
            assert_eq!(pass.action, None);
        }
        assert_eq!(state.time.hours(), 1);

        let fresh = run(&mut controller, &mut state, &mut leds);
        assert_eq!(fresh.action, Some(KeyAction::IncrementedHours));
        assert_eq!(state.time.hours(), 2);
    }

    #[test]
    fn time_keeps_running_while_setting_the_alarm() {
        let mut kp = ScriptedKeypad::new(&[]);
        press(&mut kp, Key::TOGGLE_ALARM_SETTING, 0);
        let mut controller = Controller::new(kp, ReleasePolicy::Unbounded);
        let mut state = SharedClockState::new();
        let mut leds = RecordingIndicators::default();

        run(&mut controller, &mut state, &mut leds);
        assert_eq!(state.mode, Mode::SettingAlarm);
        for _ in 0..3 {
            state.on_rtc_tick();
            run(&mut controller, &mut state, &mut leds);
        }
        assert_eq!(state.time, ClockTime::new(0, 0, 3));
        assert!(leds.frames.iter().all(|f| f.alarm_setting && !f.clock_setting));
    }
}
