//! Wrapping monotonic timestamps.
//!
//! The HAL clocks are free-running 32-bit counters. Both types below wrap at
//! 2^32 units: [`Millis`] after ~49.7 days, [`Micros`] after ~71.6 minutes.
//! Differences are computed with wrapping subtraction, so an elapsed value is
//! exact as long as the true interval is shorter than one full modulus. Every
//! interval measured by the trip computer (tick period, debounce windows,
//! injector periods, phase durations) is many orders of magnitude shorter.
//!
//! "Unset" timestamps are modelled with `Option`, never with a zero sentinel,
//! because zero is a perfectly valid counter value after a wrap.

/// Millisecond timestamp, modulus 2^32.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Millis(pub u32);

/// Microsecond timestamp, modulus 2^32.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Micros(pub u32);

impl Millis {
    /// Milliseconds elapsed from `earlier` to `self`.
    #[inline]
    pub const fn since(
        self,
        earlier: Millis,
    ) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Timestamp `ms` milliseconds later.
    #[inline]
    pub const fn add(
        self,
        ms: u32,
    ) -> Millis {
        Millis(self.0.wrapping_add(ms))
    }

    /// Elapsed time in seconds, for rate computations.
    #[inline]
    pub fn secs_since(
        self,
        earlier: Millis,
    ) -> f32 {
        self.since(earlier) as f32 / 1000.0
    }
}

impl Micros {
    /// Microseconds elapsed from `earlier` to `self`.
    #[inline]
    pub const fn since(
        self,
        earlier: Micros,
    ) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Timestamp `us` microseconds later.
    #[inline]
    pub const fn add(
        self,
        us: u32,
    ) -> Micros {
        Micros(self.0.wrapping_add(us))
    }
}

/// Both HAL clocks sampled at the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Stamp {
    pub ms: Millis,
    pub us: Micros,
}

impl Stamp {
    pub const fn new(
        ms: u32,
        us: u32,
    ) -> Self {
        Self {
            ms: Millis(ms),
            us: Micros(us),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_since_plain() {
        assert_eq!(Millis(1500).since(Millis(500)), 1000);
        assert_eq!(Micros(10).since(Micros(10)), 0);
    }

    #[test]
    fn test_since_across_wrap() {
        let before = Millis(u32::MAX - 99);
        let after = before.add(250);
        assert_eq!(after.0, 150);
        assert_eq!(after.since(before), 250);

        let us_before = Micros(u32::MAX);
        assert_eq!(us_before.add(1).since(us_before), 1);
    }

    #[test]
    fn test_secs_since() {
        assert!((Millis(3000).secs_since(Millis(1000)) - 2.0).abs() < 1e-6);
    }
}
