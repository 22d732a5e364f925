use crate::keypad::ReleasePolicy;

/// Build-time tuning of the clock firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// Wait after selecting a keypad row before the columns are read.
    pub settle_us: u32,
    /// Bound on the wait for a key to be released.
    pub release_policy: ReleasePolicy,
    /// Period of the timekeeping interrupt.
    pub tick_period_us: u64,
    /// Period of the display refresh interrupt; each refresh lights one of four digits.
    pub refresh_period_us: u32,
}

impl ClockConfig {
    pub const DEFAULT: Self = Self {
        settle_us: 1_000,
        release_policy: ReleasePolicy::Unbounded,
        tick_period_us: 1_000_000,
        refresh_period_us: 1_000,
    };
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
