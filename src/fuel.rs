//! Fuel level smoothing and the LOW FUEL hysteresis latch.
//!
//! The tank sender is noisy (fuel slosh, supply ripple), so the raw reading
//! goes through three stages every tick:
//!
//! 1. Linear calibration to percent, clamped to 0-100 %
//! 2. Arithmetic mean of the last `FUEL_BUFFER_SIZE` readings (fixed ring)
//! 3. Slew-rate clamp against the previous tick's output
//!
//! The mean is recomputed from the whole ring every tick rather than kept as a
//! running sum, so floating-point error cannot accumulate over a long drive.
//!
//! The smoothed value drives a two-threshold latch: on at or below
//! `low_threshold`, off only at or above `high_threshold`.

use crate::config::thresholds::{
    FUEL_BUFFER_SIZE,
    FUEL_HIGH_THRESHOLD_PERCENT,
    FUEL_LOW_THRESHOLD_PERCENT,
    FUEL_MAX_PERCENT_CHANGE_PER_SEC,
};
use crate::config::{FUEL_ADC_MAX_RAW, FUEL_ADC_MIN_RAW, UPDATE_INTERVAL_MS};

/// Fuel estimator settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuelConfig {
    /// Raw reading of an empty tank.
    pub raw_min: u16,
    /// Raw reading of a full tank.
    pub raw_max: u16,
    /// Maximum output change (% per second).
    pub max_percent_per_sec: f32,
    /// Nominal tick period (s).
    pub nominal_interval_s: f32,
    /// LOW FUEL latches on at or below this (%).
    pub low_threshold: f32,
    /// LOW FUEL releases at or above this (%).
    pub high_threshold: f32,
}

impl FuelConfig {
    pub const DEFAULT: Self = Self {
        raw_min: FUEL_ADC_MIN_RAW,
        raw_max: FUEL_ADC_MAX_RAW,
        max_percent_per_sec: FUEL_MAX_PERCENT_CHANGE_PER_SEC,
        nominal_interval_s: UPDATE_INTERVAL_MS as f32 / 1000.0,
        low_threshold: FUEL_LOW_THRESHOLD_PERCENT,
        high_threshold: FUEL_HIGH_THRESHOLD_PERCENT,
    };

    /// Linear raw-to-percent mapping, clamped to 0-100 %.
    ///
    /// A zero-width calibration reads as an empty tank.
    pub fn raw_to_percent(
        &self,
        raw: u16,
    ) -> f32 {
        let span = self.raw_max as f32 - self.raw_min as f32;
        if span == 0.0 {
            return 0.0;
        }
        let percent = (raw as f32 - self.raw_min as f32) * 100.0 / span;
        percent.clamp(0.0, 100.0)
    }
}

impl Default for FuelConfig {
    fn default() -> Self { Self::DEFAULT }
}

/// Fixed-length FIFO of converted readings.
///
/// Always holds exactly `N` samples; pushing evicts the oldest.
#[derive(Clone, Debug)]
pub struct FuelSampleRing<const N: usize> {
    samples: [f32; N],
    head: usize,
}

impl<const N: usize> FuelSampleRing<N> {
    pub const fn new(initial: f32) -> Self {
        Self {
            samples: [initial; N],
            head: 0,
        }
    }

    /// Overwrite every slot with `value`.
    pub fn fill(
        &mut self,
        value: f32,
    ) {
        self.samples = [value; N];
        self.head = 0;
    }

    /// Replace the oldest sample.
    pub fn push(
        &mut self,
        value: f32,
    ) {
        self.samples[self.head] = value;
        self.head = (self.head + 1) % N;
    }

    /// Mean of all samples, recomputed from scratch.
    ///
    /// Summed in `f64`, where `N` copies of one `f32` add up exactly, so a ring
    /// of equal samples returns that sample unchanged.
    pub fn mean(&self) -> f32 {
        let sum: f64 = self.samples.iter().map(|&v| f64::from(v)).sum();
        (sum / N as f64) as f32
    }
}

/// Smoothed fuel level and LOW FUEL latch.
#[derive(Clone, Debug)]
pub struct FuelLevelEstimator {
    config: FuelConfig,
    ring: FuelSampleRing<FUEL_BUFFER_SIZE>,
    smoothed: f32,
    low_fuel: bool,
}

impl FuelLevelEstimator {
    pub const fn new(config: FuelConfig) -> Self {
        Self {
            config,
            ring: FuelSampleRing::new(0.0),
            smoothed: 0.0,
            low_fuel: false,
        }
    }

    /// Seed the ring and the previous output with one reading.
    ///
    /// Called once at startup so the display does not ramp up from 0 % at the
    /// slew limit. The latch is evaluated against the seeded level.
    pub fn prime(
        &mut self,
        raw: u16,
    ) {
        let percent = self.config.raw_to_percent(raw);
        self.ring.fill(percent);
        self.smoothed = percent;
        self.update_latch();
    }

    /// Feed one raw reading taken `elapsed_s` after the previous update.
    ///
    /// Returns the new smoothed level (%).
    pub fn update(
        &mut self,
        raw: u16,
        elapsed_s: f32,
    ) -> f32 {
        self.ring.push(self.config.raw_to_percent(raw));
        let mut level = self.ring.mean();

        if elapsed_s > 0.0 {
            // Ticks faster than nominal would make the clamp needlessly tight.
            let effective_s = if elapsed_s < self.config.nominal_interval_s / 2.0 {
                self.config.nominal_interval_s
            } else {
                elapsed_s
            };
            let max_change = self.config.max_percent_per_sec * effective_s;
            level = level.clamp(self.smoothed - max_change, self.smoothed + max_change);
        }

        self.smoothed = level;
        self.update_latch();
        level
    }

    fn update_latch(&mut self) {
        if self.low_fuel {
            if self.smoothed >= self.config.high_threshold {
                self.low_fuel = false;
            }
        } else if self.smoothed <= self.config.low_threshold {
            self.low_fuel = true;
        }
    }

    /// Last smoothed level (%).
    #[inline]
    pub const fn level_percent(&self) -> f32 { self.smoothed }

    /// LOW FUEL latch state.
    #[inline]
    pub const fn is_low(&self) -> bool { self.low_fuel }
}

impl Default for FuelLevelEstimator {
    fn default() -> Self { Self::new(FuelConfig::DEFAULT) }
}
