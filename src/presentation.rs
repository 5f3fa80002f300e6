//! What the display shows when conditions are present.
//!
//! The classifier yields a candidate [`ErrorSet`] every tick. This state
//! machine decides when the candidate replaces the set on screen and which
//! entry of the active set is visible:
//!
//! - Escalations and all-clears apply immediately.
//! - Other changes wait in a single pending slot until the active set has been
//!   shown completely once, so a cycling screen is never cut short.
//! - Entries of the active set rotate once per cycle duration.
//! - LOW FUEL alone alternates between its icon and the main screen with two
//!   independent durations.

use crate::conditions::{ErrorKind, ErrorSet, Severity};
use crate::config::timing::{
    ERROR_DISPLAY_CYCLE_MS,
    LOW_FUEL_DISPLAY_DURATION_MS,
    LOW_FUEL_MAIN_SCREEN_DURATION_MS,
};
use crate::time::Millis;

// ============================================================================
// Output
// ============================================================================

/// Screen selected for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Screen {
    /// Trip readout.
    Main,
    /// Full-screen icon of one condition.
    Condition(ErrorKind),
}

/// Halves of the LOW FUEL advisory cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LowFuelPhase {
    #[default]
    Icon,
    MainScreen,
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresentationConfig {
    /// Time each entry of the active set stays on screen.
    pub cycle_ms: u32,
    /// LOW FUEL icon time per advisory cycle.
    pub low_fuel_icon_ms: u32,
    /// Main screen time per advisory cycle.
    pub low_fuel_main_ms: u32,
}

impl PresentationConfig {
    pub const DEFAULT: Self = Self {
        cycle_ms: ERROR_DISPLAY_CYCLE_MS,
        low_fuel_icon_ms: LOW_FUEL_DISPLAY_DURATION_MS,
        low_fuel_main_ms: LOW_FUEL_MAIN_SCREEN_DURATION_MS,
    };
}

impl Default for PresentationConfig {
    fn default() -> Self { Self::DEFAULT }
}

// ============================================================================
// State Machine
// ============================================================================

/// Active set, rotation cursor and pending candidate.
#[derive(Clone, Debug)]
pub struct ErrorPresentation {
    config: PresentationConfig,
    active: ErrorSet,
    cursor: usize,
    last_cycle: Millis,
    pending: Option<ErrorSet>,
    low_fuel_phase: LowFuelPhase,
    low_fuel_since: Millis,
}

impl ErrorPresentation {
    /// Idle presentation starting at `now`.
    pub fn new(
        config: PresentationConfig,
        now: Millis,
    ) -> Self {
        Self {
            config,
            active: ErrorSet::idle(),
            cursor: 0,
            last_cycle: now,
            pending: None,
            low_fuel_phase: LowFuelPhase::Icon,
            low_fuel_since: now,
        }
    }

    #[inline]
    pub fn active(&self) -> &ErrorSet { &self.active }

    #[inline]
    pub fn severity(&self) -> Severity { self.active.severity() }

    #[inline]
    pub fn cursor(&self) -> usize { self.cursor }

    #[inline]
    pub fn pending(&self) -> Option<&ErrorSet> { self.pending.as_ref() }

    #[inline]
    pub fn low_fuel_phase(&self) -> LowFuelPhase { self.low_fuel_phase }

    /// Replace the active set and restart rotation and the advisory timer.
    ///
    /// Drops any pending candidate.
    pub fn replace(
        &mut self,
        set: ErrorSet,
        now: Millis,
    ) {
        debug!("display set replaced, severity {}", set.severity() as u8);
        self.active = set;
        self.cursor = 0;
        self.last_cycle = now;
        self.pending = None;
        self.low_fuel_phase = LowFuelPhase::Icon;
        self.low_fuel_since = now;
    }

    fn should_switch_now(
        &self,
        candidate: &ErrorSet,
    ) -> bool {
        let current = self.active.severity();
        let next = candidate.severity();

        next > current
            || (current == Severity::None && next > Severity::None)
            || (self.active.is_idle() && candidate != &self.active)
            || (next == Severity::None && current > Severity::None)
    }

    /// Feed this tick's candidate set and return the screen to show.
    pub fn update(
        &mut self,
        candidate: ErrorSet,
        now: Millis,
    ) -> Screen {
        if self.should_switch_now(&candidate) {
            self.replace(candidate, now);
        } else if candidate != self.active {
            self.pending = Some(candidate);
        }

        self.rotate(now);
        self.advance_low_fuel(now);
        self.screen()
    }

    fn rotate(
        &mut self,
        now: Millis,
    ) {
        if now.since(self.last_cycle) < self.config.cycle_ms {
            return;
        }

        let on_last = self.cursor + 1 >= self.active.len();
        if on_last {
            if let Some(next) = self.pending.take() {
                self.replace(next, now);
                return;
            }
        }

        self.cursor = if on_last { 0 } else { self.cursor + 1 };
        self.last_cycle = now;
    }

    fn advance_low_fuel(
        &mut self,
        now: Millis,
    ) {
        if !self.active.is_low_fuel() {
            return;
        }

        let elapsed = now.since(self.low_fuel_since);
        match self.low_fuel_phase {
            LowFuelPhase::Icon if elapsed >= self.config.low_fuel_icon_ms => {
                self.low_fuel_phase = LowFuelPhase::MainScreen;
                self.low_fuel_since = now;
            }
            LowFuelPhase::MainScreen if elapsed >= self.config.low_fuel_main_ms => {
                self.low_fuel_phase = LowFuelPhase::Icon;
                self.low_fuel_since = now;
            }
            _ => {}
        }
    }

    /// Screen for the current state without advancing anything.
    pub fn screen(&self) -> Screen {
        if self.active.is_idle() {
            return Screen::Main;
        }
        if self.active.is_low_fuel() {
            return match self.low_fuel_phase {
                LowFuelPhase::Icon => Screen::Condition(ErrorKind::LowFuel),
                LowFuelPhase::MainScreen => Screen::Main,
            };
        }
        match self.active.get(self.cursor) {
            Some(kind) => Screen::Condition(kind),
            None => Screen::Main,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CYCLE: u32 = PresentationConfig::DEFAULT.cycle_ms;

    fn oil_and_brake() -> ErrorSet { ErrorSet::critical([ErrorKind::BrakeFluid, ErrorKind::LowOil]) }

    fn oil_only() -> ErrorSet { ErrorSet::critical([ErrorKind::LowOil]) }

    #[test]
    fn test_idle_shows_main_screen() {
        let mut p = ErrorPresentation::new(PresentationConfig::DEFAULT, Millis(0));
        assert_eq!(p.update(ErrorSet::idle(), Millis(100)), Screen::Main);
        assert!(p.active().is_idle());
    }

    #[test]
    fn test_escalation_from_idle_resets_cursor() {
        let mut p = ErrorPresentation::new(PresentationConfig::DEFAULT, Millis(0));
        p.update(ErrorSet::idle(), Millis(5_000));

        let screen = p.update(oil_only(), Millis(7_500));
        assert_eq!(p.active(), &oil_only());
        assert_eq!(p.cursor(), 0);
        assert_eq!(screen, Screen::Condition(ErrorKind::LowOil));
        assert!(p.pending().is_none());
    }

    #[test]
    fn test_cursor_advances_once_per_cycle() {
        let mut p = ErrorPresentation::new(PresentationConfig::DEFAULT, Millis(0));
        p.update(oil_only(), Millis(1_000));

        // Ticks inside the first cycle keep the cursor.
        p.update(oil_only(), Millis(1_000 + CYCLE - 1));
        assert_eq!(p.cursor(), 0);

        let screen = p.update(oil_only(), Millis(1_000 + CYCLE));
        assert_eq!(p.cursor(), 1);
        assert_eq!(screen, Screen::Condition(ErrorKind::Warning));

        p.update(oil_only(), Millis(1_000 + 2 * CYCLE - 1));
        assert_eq!(p.cursor(), 1);

        // Wraps back to the first entry.
        p.update(oil_only(), Millis(1_000 + 2 * CYCLE));
        assert_eq!(p.cursor(), 0);
    }

    #[test]
    fn test_same_severity_change_waits_for_full_rotation() {
        let mut p = ErrorPresentation::new(PresentationConfig::DEFAULT, Millis(0));
        p.update(oil_only(), Millis(0));

        // Another critical set of equal severity: queued.
        p.update(oil_and_brake(), Millis(500));
        assert_eq!(p.active(), &oil_only());
        assert_eq!(p.pending(), Some(&oil_and_brake()));

        // First cycle ends on entry 0: advance, no promotion.
        p.update(oil_and_brake(), Millis(CYCLE));
        assert_eq!(p.active(), &oil_only());
        assert_eq!(p.cursor(), 1);

        // Cycle ends on the last entry: promote.
        let screen = p.update(oil_and_brake(), Millis(2 * CYCLE));
        assert_eq!(p.active(), &oil_and_brake());
        assert_eq!(p.cursor(), 0);
        assert!(p.pending().is_none());
        assert_eq!(screen, Screen::Condition(ErrorKind::BrakeFluid));
    }

    #[test]
    fn test_pending_overwritten_by_newer_candidate() {
        let mut p = ErrorPresentation::new(PresentationConfig::DEFAULT, Millis(0));
        p.update(oil_and_brake(), Millis(0));
        p.update(oil_only(), Millis(100));
        p.update(ErrorSet::low_fuel(), Millis(200));
        assert_eq!(p.pending(), Some(&ErrorSet::low_fuel()));
    }

    #[test]
    fn test_candidate_matching_active_clears_nothing_new() {
        let mut p = ErrorPresentation::new(PresentationConfig::DEFAULT, Millis(0));
        p.update(oil_only(), Millis(0));
        p.update(oil_only(), Millis(100));
        assert!(p.pending().is_none());
    }

    #[test]
    fn test_all_clear_is_immediate() {
        let mut p = ErrorPresentation::new(PresentationConfig::DEFAULT, Millis(0));
        p.update(oil_and_brake(), Millis(0));
        let screen = p.update(ErrorSet::idle(), Millis(300));
        assert!(p.active().is_idle());
        assert_eq!(screen, Screen::Main);
    }

    #[test]
    fn test_low_fuel_hidden_until_critical_clears() {
        let mut p = ErrorPresentation::new(PresentationConfig::DEFAULT, Millis(0));
        // Oil low with low fuel: classifier hands only the critical set.
        p.update(oil_only(), Millis(0));
        // Oil clears, low fuel remains: lower severity waits for the rotation.
        p.update(ErrorSet::low_fuel(), Millis(500));
        assert_eq!(p.active(), &oil_only());

        p.update(ErrorSet::low_fuel(), Millis(CYCLE));
        assert_eq!(p.active(), &oil_only());
        let screen = p.update(ErrorSet::low_fuel(), Millis(2 * CYCLE));
        assert!(p.active().is_low_fuel());
        assert_eq!(screen, Screen::Condition(ErrorKind::LowFuel));
    }

    #[test]
    fn test_low_fuel_alternates_with_main_screen() {
        let config = PresentationConfig::DEFAULT;
        let mut p = ErrorPresentation::new(config, Millis(0));
        let start = 10_000;
        assert_eq!(
            p.update(ErrorSet::low_fuel(), Millis(start)),
            Screen::Condition(ErrorKind::LowFuel)
        );

        let main_at = start + config.low_fuel_icon_ms;
        assert_eq!(
            p.update(ErrorSet::low_fuel(), Millis(main_at - 1)),
            Screen::Condition(ErrorKind::LowFuel)
        );
        assert_eq!(p.update(ErrorSet::low_fuel(), Millis(main_at)), Screen::Main);
        assert_eq!(p.low_fuel_phase(), LowFuelPhase::MainScreen);

        let icon_at = main_at + config.low_fuel_main_ms;
        assert_eq!(p.update(ErrorSet::low_fuel(), Millis(icon_at - 1)), Screen::Main);
        assert_eq!(
            p.update(ErrorSet::low_fuel(), Millis(icon_at)),
            Screen::Condition(ErrorKind::LowFuel)
        );
    }

    #[test]
    fn test_escalation_out_of_low_fuel_resets_sub_timer() {
        let config = PresentationConfig::DEFAULT;
        let mut p = ErrorPresentation::new(config, Millis(0));
        p.update(ErrorSet::low_fuel(), Millis(0));
        p.update(ErrorSet::low_fuel(), Millis(config.low_fuel_icon_ms));
        assert_eq!(p.low_fuel_phase(), LowFuelPhase::MainScreen);

        p.update(oil_only(), Millis(config.low_fuel_icon_ms + 100));
        assert_eq!(p.low_fuel_phase(), LowFuelPhase::Icon);
        assert_eq!(p.severity(), Severity::Critical);
    }

    #[test]
    fn test_cycle_timer_survives_wraparound() {
        let start = u32::MAX - 500;
        let mut p = ErrorPresentation::new(PresentationConfig::DEFAULT, Millis(start));
        p.update(oil_only(), Millis(start));
        p.update(oil_only(), Millis(start).add(CYCLE));
        assert_eq!(p.cursor(), 1);
    }
}
