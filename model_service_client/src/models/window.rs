//! Lookback window sent with `days`/`fallback_days` parameters.

use std::fmt;

/// Upper bound on any lookback window, in days.
///
/// Matches the sampling-density assumption of the coverage check
/// (25 920 five-minute points per 90 days).
pub const MAX_LOOKBACK_DAYS: u32 = 90;

/// A lookback window already clamped to [`MAX_LOOKBACK_DAYS`].
///
/// The only constructor clamps, so every request carrying a window honours the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LookbackDays(u32);

impl LookbackDays {
    /// Clamp a configured window to at most [`MAX_LOOKBACK_DAYS`].
    pub fn clamped(days: u32) -> Self {
        Self(days.min(MAX_LOOKBACK_DAYS))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LookbackDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
