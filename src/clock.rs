//! Wall-clock time and alarm setpoint.

/// Current time of day, 24h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl ClockTime {
    /// Midnight, the power-on value.
    pub const MIDNIGHT: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Builds a time of day. Out of range components are wrapped (hours mod 24, minutes and seconds mod 60).
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours: hours % 24,
            minutes: minutes % 60,
            seconds: seconds % 60,
        }
    }

    pub const fn hours(&self) -> u8 {
        self.hours
    }

    pub const fn minutes(&self) -> u8 {
        self.minutes
    }

    pub const fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Advances by one second, carrying into minutes and hours.
    pub fn tick(&mut self) {
        self.seconds += 1;
        if self.seconds >= 60 {
            self.seconds = 0;
            self.minutes += 1;
            if self.minutes >= 60 {
                self.minutes = 0;
                self.hours = (self.hours + 1) % 24;
            }
        }
    }

    /// Increments the hour without touching minutes.
    pub fn increment_hours(&mut self) {
        self.hours = (self.hours + 1) % 24;
    }

    /// Increments the minute. Wraps at 60 without carrying into the hour.
    pub fn increment_minutes(&mut self) {
        self.minutes = (self.minutes + 1) % 60;
    }

    /// Resynchronizes to the top of the current minute.
    pub fn zero_seconds(&mut self) {
        self.seconds = 0;
    }

    /// True when hours and minutes match the alarm and we are at second 0.
    pub fn is_alarm_instant(&self, alarm: &AlarmTime) -> bool {
        self.seconds == 0 && self.hours == alarm.hours && self.minutes == alarm.minutes
    }
}

/// Alarm setpoint, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTime {
    hours: u8,
    minutes: u8,
}

impl AlarmTime {
    pub const fn new(hours: u8, minutes: u8) -> Self {
        Self {
            hours: hours % 24,
            minutes: minutes % 60,
        }
    }

    pub const fn hours(&self) -> u8 {
        self.hours
    }

    pub const fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn increment_hours(&mut self) {
        self.hours = (self.hours + 1) % 24;
    }

    pub fn increment_minutes(&mut self) {
        self.minutes = (self.minutes + 1) % 60;
    }
}
