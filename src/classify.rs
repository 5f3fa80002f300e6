//! Per-tick classification of sensor lines into warning conditions.
//!
//! # Engine Run State
//!
//! The engine counts as stably running when the injector fired within the
//! activity window at a plausible RPM, or the car is moving (VSS active within
//! the window). The instant that first becomes true is remembered as
//! "running since"; it is forgotten as soon as it becomes false.
//!
//! # Rules
//!
//! | Condition        | Reported when                                         |
//! |------------------|-------------------------------------------------------|
//! | Brake fluid      | sensor asserted                                       |
//! | Overheat         | sensor asserted                                       |
//! | Oil pressure 1.8 | sensor asserted and RPM above the high-pressure check |
//! | Oil pressure low | sensor asserted, running, and past the startup grace  |
//! | Low fuel         | fuel latch set                                        |

use heapless::Vec;

use crate::conditions::{ErrorKind, ErrorSet, MAX_SET_LEN, Severity};
use crate::config::thresholds::{MIN_RPM_FOR_HIGH_PRESSURE_CHECK, MIN_RPM_FOR_STABLE_RUNNING};
use crate::config::timing::{ACTIVITY_WINDOW_MS, OIL_CHECK_DELAY_MS};
use crate::time::Millis;

/// Asserted state of each digital sensor line (polarity already resolved).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct SensorStates {
    pub brake_fluid_low: bool,
    /// Combined coolant over-temperature / coolant level line.
    pub overheat: bool,
    pub oil_pressure_low: bool,
    /// High-pressure switch reports missing pressure.
    pub oil_pressure_high: bool,
}

/// Everything the classifier looks at in one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassifierInputs {
    pub sensors: SensorStates,
    pub rpm: u32,
    pub low_fuel: bool,
    pub last_injector_activity: Option<Millis>,
    pub last_vss_activity: Option<Millis>,
}

/// Classifier thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub activity_window_ms: u32,
    pub min_rpm_stable: u32,
    pub min_rpm_high_pressure: u32,
    pub oil_check_delay_ms: u32,
}

impl ClassifierConfig {
    pub const DEFAULT: Self = Self {
        activity_window_ms: ACTIVITY_WINDOW_MS,
        min_rpm_stable: MIN_RPM_FOR_STABLE_RUNNING,
        min_rpm_high_pressure: MIN_RPM_FOR_HIGH_PRESSURE_CHECK,
        oil_check_delay_ms: OIL_CHECK_DELAY_MS,
    };
}

impl Default for ClassifierConfig {
    fn default() -> Self { Self::DEFAULT }
}

/// Conditions found in one tick, in reporting order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Brake fluid, overheat, oil 1.8, oil low, low fuel (whichever apply).
    pub conditions: Vec<ErrorKind, MAX_SET_LEN>,
    pub severity: Severity,
}

impl Classification {
    /// True when nothing was found.
    #[inline]
    pub fn is_clear(&self) -> bool { self.conditions.is_empty() }

    /// The set to put on screen.
    ///
    /// Critical conditions hide low fuel and get the WARNING decoration; low
    /// fuel alone gets its own single-entry set.
    pub fn display_set(&self) -> ErrorSet {
        match self.severity {
            Severity::Critical => ErrorSet::critical(self.conditions.iter().copied()),
            Severity::Advisory => ErrorSet::low_fuel(),
            Severity::None => ErrorSet::idle(),
        }
    }
}

/// Evaluates sensors into a [`Classification`]; owns the engine run state.
#[derive(Clone, Debug, Default)]
pub struct ErrorClassifier {
    config: ClassifierConfig,
    running_since: Option<Millis>,
}

impl ErrorClassifier {
    pub const fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            running_since: None,
        }
    }

    /// Instant the engine was last seen starting to run stably.
    #[inline]
    pub const fn running_since(&self) -> Option<Millis> { self.running_since }

    fn is_recent(
        &self,
        activity: Option<Millis>,
        now: Millis,
    ) -> bool {
        activity.is_some_and(|at| now.since(at) < self.config.activity_window_ms)
    }

    /// Update the run state and return whether the engine runs stably.
    fn update_run_state(
        &mut self,
        inputs: &ClassifierInputs,
        now: Millis,
    ) -> bool {
        let injector_active = self.is_recent(inputs.last_injector_activity, now);
        let moving = self.is_recent(inputs.last_vss_activity, now);
        let stable = (injector_active && inputs.rpm > self.config.min_rpm_stable) || moving;

        if stable {
            if self.running_since.is_none() {
                self.running_since = Some(now);
            }
        } else {
            self.running_since = None;
        }
        stable
    }

    /// Classify one tick.
    pub fn evaluate(
        &mut self,
        inputs: &ClassifierInputs,
        now: Millis,
    ) -> Classification {
        let running = self.update_run_state(inputs, now);
        let sensors = inputs.sensors;
        let mut conditions: Vec<ErrorKind, MAX_SET_LEN> = Vec::new();

        // Pushes below never exceed the five possible kinds.
        if sensors.brake_fluid_low {
            let _ = conditions.push(ErrorKind::BrakeFluid);
        }
        if sensors.overheat {
            let _ = conditions.push(ErrorKind::Overheat);
        }
        if sensors.oil_pressure_high && inputs.rpm > self.config.min_rpm_high_pressure {
            let _ = conditions.push(ErrorKind::OilPressureHigh);
        }
        if sensors.oil_pressure_low
            && running
            && self
                .running_since
                .is_some_and(|since| now.since(since) > self.config.oil_check_delay_ms)
        {
            let _ = conditions.push(ErrorKind::LowOil);
        }
        if inputs.low_fuel {
            let _ = conditions.push(ErrorKind::LowFuel);
        }

        let severity = conditions
            .iter()
            .map(|k| k.severity())
            .max()
            .unwrap_or(Severity::None);

        Classification { conditions, severity }
    }
}
