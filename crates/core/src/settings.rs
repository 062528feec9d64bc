// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// The daily fine rate used when no override is configured, in whole
/// currency units per overdue day.
pub const DEFAULT_DAILY_FINE_RATE: u32 = 10;

/// Operator-configurable settings consulted by state transitions.
///
/// Settings are read at transition time. A loan fined under one rate keeps
/// that fine; changing the rate only affects returns processed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// The fine per overdue day, in whole currency units.
    pub daily_fine_rate: u32,
}

impl Settings {
    /// Creates settings with an explicit daily fine rate.
    #[must_use]
    pub const fn new(daily_fine_rate: u32) -> Self {
        Self { daily_fine_rate }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_DAILY_FINE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate_is_ten() {
        let settings: Settings = Settings::default();
        assert_eq!(settings.daily_fine_rate, 10);
    }

    #[test]
    fn test_explicit_rate_overrides_default() {
        let settings: Settings = Settings::new(25);
        assert_eq!(settings.daily_fine_rate, 25);
    }
}
