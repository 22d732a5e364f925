//! Per-second timekeeping and alarm evaluation, run from the main loop.

use crate::clock::ClockTime;
use crate::state::SharedClockState;

/// Result of consuming one elapsed second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Time after the advance.
    pub time: ClockTime,
    /// The alarm started ringing on this second.
    pub alarm_started: bool,
}

impl SharedClockState {
    /// Consumes a pending second, if any: advances the clock and checks the alarm.
    ///
    /// Seconds that elapse while the main loop is blocked collapse into one.
    pub fn service_tick(&mut self) -> Option<TickReport> {
        if !self.flags.take_second() {
            return None;
        }
        self.time.tick();
        let alarm_started = self.evaluate_alarm();
        Some(TickReport {
            time: self.time,
            alarm_started,
        })
    }

    /// Starts ringing when armed, silent, and the clock has just reached hh:mm:00 of the alarm.
    fn evaluate_alarm(&mut self) -> bool {
        let state = &mut self.alarm_state;
        if state.armed && !state.ringing && self.time.is_alarm_instant(&self.alarm) {
            state.ringing = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::AlarmTime;
    use crate::state::AlarmState;

    fn armed_at(alarm: AlarmTime, time: ClockTime) -> SharedClockState {
        let mut s = SharedClockState::new();
        s.alarm = alarm;
        s.time = time;
        s.alarm_state.armed = true;
        s
    }

    fn second(s: &mut SharedClockState) -> TickReport {
        s.on_rtc_tick();
        s.service_tick().unwrap()
    }

    #[test]
    fn nothing_happens_without_a_pending_second() {
        let mut s = SharedClockState::new();
        assert_eq!(s.service_tick(), None);
        assert_eq!(s.time, ClockTime::MIDNIGHT);
    }

    #[test]
    fn each_interrupt_advances_exactly_one_second() {
        let mut s = SharedClockState::new();
        s.on_rtc_tick();
        let report = s.service_tick().unwrap();
        assert_eq!(report.time, ClockTime::new(0, 0, 1));
        assert_eq!(s.service_tick(), None);
    }

    #[test]
    fn midnight_rollover_rings_a_midnight_alarm() {
        let mut s = armed_at(AlarmTime::new(0, 0), ClockTime::new(23, 59, 59));

        let report = second(&mut s);

        assert_eq!(report.time, ClockTime::MIDNIGHT);
        assert!(report.alarm_started);
        assert!(s.alarm_state.ringing);
    }

    #[test]
    fn alarm_never_fires_when_not_armed() {
        let mut s = SharedClockState::new();
        s.alarm = AlarmTime::new(7, 0);
        s.time = ClockTime::new(6, 59, 59);

        assert!(!second(&mut s).alarm_started);
        assert!(!s.alarm_state.ringing);
    }

    #[test]
    fn alarm_fires_once_per_matching_minute() {
        let mut s = armed_at(AlarmTime::new(7, 0), ClockTime::new(6, 59, 59));
        assert!(second(&mut s).alarm_started);

        // silenced at 07:00:00, the rest of the minute stays quiet
        s.alarm_state.ringing = false;
        for _ in 0..59 {
            assert!(!second(&mut s).alarm_started);
        }
        assert_eq!(s.time, ClockTime::new(7, 0, 59));
        assert!(!s.alarm_state.ringing);
    }

    #[test]
    fn setting_the_clock_onto_the_alarm_minute_does_not_ring_mid_minute() {
        let mut s = armed_at(AlarmTime::new(9, 30), ClockTime::new(9, 30, 10));
        assert!(!second(&mut s).alarm_started);
    }

    #[test]
    fn ringing_alarm_is_not_restarted() {
        let mut s = armed_at(AlarmTime::new(5, 0), ClockTime::new(4, 59, 59));
        s.alarm_state = AlarmState {
            armed: true,
            ringing: true,
        };
        assert!(!second(&mut s).alarm_started);
        assert!(s.alarm_state.ringing);
    }

    #[test]
    fn armed_alarm_rings_again_the_next_day() {
        let mut s = armed_at(AlarmTime::new(0, 0), ClockTime::new(23, 59, 59));
        assert!(second(&mut s).alarm_started);
        s.alarm_state.ringing = false;

        let mut rang = 0;
        for _ in 0..24 * 3600 {
            if second(&mut s).alarm_started {
                rang += 1;
                s.alarm_state.ringing = false;
            }
        }
        assert_eq!(rang, 1);
        assert_eq!(s.time, ClockTime::MIDNIGHT);
    }

    #[test]
    fn missed_interrupts_coalesce() {
        let mut s = SharedClockState::new();
        s.on_rtc_tick();
        s.on_rtc_tick();
        s.on_rtc_tick();
        assert_eq!(s.service_tick().unwrap().time, ClockTime::new(0, 0, 1));
        assert_eq!(s.service_tick(), None);
        assert!(s.flags.blink_phase());
    }
}
