//! Interrupt-side pulse capture for the injector and vehicle speed sensor.
//!
//! The edge handlers run in interrupt context (on target: tasks of a
//! high-priority `InterruptExecutor`) and preempt the tick loop. They only
//! touch a handful of integers inside a short critical section: no
//! allocation, no I/O, O(1) per edge.
//!
//! The tick loop reaches the shared state through exactly two calls:
//! - [`PulseCapture::drain`]: snapshot-and-clear of the accumulators
//! - [`PulseCapture::peek_latest`]: snapshot of the latest valid period
//!
//! # Injector Open Time
//!
//! The injector is active-low: the falling edge opens it (pulse start), the
//! rising edge closes it. Open time is accumulated edge-to-edge. A pulse that
//! is still open when the tick drains contributes its open time up to the
//! drain instant and continues from there in the next window, so each window
//! receives exactly the open intervals intersected with it.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::config::{MIN_INJ_PERIOD_US, VSS_DEBOUNCE_US};
use crate::time::{Micros, Millis, Stamp};

/// Injector line level seen by the edge handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InjectorEdge {
    /// Line pulled low: injector opens, new injection event.
    PulseStart,
    /// Line released: injector closes.
    PulseEnd,
}

impl InjectorEdge {
    /// Map the sampled line level (active-low injector driver).
    #[inline]
    pub const fn from_level(is_high: bool) -> Self {
        if is_high { Self::PulseEnd } else { Self::PulseStart }
    }
}

/// Capture filter settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureConfig {
    /// Injector periods at or below this are rejected as noise (µs).
    pub min_injector_period_us: u32,
    /// VSS edges closer than this to the last accepted edge are ignored (µs).
    pub vss_debounce_us: u32,
}

impl CaptureConfig {
    pub const DEFAULT: Self = Self {
        min_injector_period_us: MIN_INJ_PERIOD_US,
        vss_debounce_us: VSS_DEBOUNCE_US,
    };
}

impl Default for CaptureConfig {
    fn default() -> Self { Self::DEFAULT }
}

/// Values handed from interrupt context to the tick loop by one drain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PulseSnapshot {
    /// Injector open time inside the drained window (µs).
    pub injector_open_us: u32,
    /// Accepted VSS pulses inside the drained window.
    pub vss_pulses: u32,
    /// Most recent valid injector period (µs), not cleared by draining.
    pub injector_period_us: Option<u32>,
    /// Last injector edge of either polarity.
    pub last_injector_activity: Option<Millis>,
    /// Last accepted VSS edge.
    pub last_vss_activity: Option<Millis>,
}

/// Raw capture state. Private: only reachable through [`PulseCapture`].
#[derive(Clone, Copy, Debug)]
struct CaptureState {
    open_time_us: u32,
    vss_count: u32,
    /// Start of the currently open interval, `None` while the injector is closed.
    open_since: Option<Micros>,
    last_pulse_start: Option<Micros>,
    latest_period_us: Option<u32>,
    last_vss_edge: Option<Micros>,
    last_injector_activity: Option<Millis>,
    last_vss_activity: Option<Millis>,
}

impl CaptureState {
    const fn new() -> Self {
        Self {
            open_time_us: 0,
            vss_count: 0,
            open_since: None,
            last_pulse_start: None,
            latest_period_us: None,
            last_vss_edge: None,
            last_injector_activity: None,
            last_vss_activity: None,
        }
    }

    fn injector_edge(
        &mut self,
        edge: InjectorEdge,
        now: Stamp,
        config: &CaptureConfig,
    ) {
        self.last_injector_activity = Some(now.ms);

        // Close whatever interval was open, whichever edge arrived.
        if let Some(since) = self.open_since.take() {
            self.open_time_us = self.open_time_us.saturating_add(now.us.since(since));
        }

        if edge == InjectorEdge::PulseStart {
            if let Some(prev) = self.last_pulse_start {
                let period = now.us.since(prev);
                if period > config.min_injector_period_us {
                    self.latest_period_us = Some(period);
                }
            }
            self.last_pulse_start = Some(now.us);
            self.open_since = Some(now.us);
        }
    }

    fn vss_edge(
        &mut self,
        now: Stamp,
        config: &CaptureConfig,
    ) {
        let accepted = match self.last_vss_edge {
            Some(last) => now.us.since(last) >= config.vss_debounce_us,
            None => true,
        };
        if accepted {
            self.vss_count = self.vss_count.saturating_add(1);
            self.last_vss_edge = Some(now.us);
            self.last_vss_activity = Some(now.ms);
        }
    }

    fn drain(
        &mut self,
        now: Micros,
    ) -> PulseSnapshot {
        if let Some(since) = self.open_since {
            self.open_time_us = self.open_time_us.saturating_add(now.since(since));
            self.open_since = Some(now);
        }

        let snapshot = PulseSnapshot {
            injector_open_us: self.open_time_us,
            vss_pulses: self.vss_count,
            injector_period_us: self.latest_period_us,
            last_injector_activity: self.last_injector_activity,
            last_vss_activity: self.last_vss_activity,
        };
        self.open_time_us = 0;
        self.vss_count = 0;
        snapshot
    }
}

/// Shared capture state between the edge handlers and the tick loop.
///
/// Intended to live in a `static`; all methods take `&self`.
pub struct PulseCapture {
    state: Mutex<CriticalSectionRawMutex, RefCell<CaptureState>>,
    config: CaptureConfig,
}

impl PulseCapture {
    /// Create capture state with the calibrated filter settings.
    pub const fn new() -> Self { Self::with_config(CaptureConfig::DEFAULT) }

    pub const fn with_config(config: CaptureConfig) -> Self {
        Self {
            state: Mutex::new(RefCell::new(CaptureState::new())),
            config,
        }
    }

    /// Injector edge handler (both polarities).
    pub fn on_injector_edge(
        &self,
        edge: InjectorEdge,
        now: Stamp,
    ) {
        self.state
            .lock(|state| state.borrow_mut().injector_edge(edge, now, &self.config));
    }

    /// VSS edge handler, one call per sensor pulse.
    pub fn on_vss_edge(
        &self,
        now: Stamp,
    ) {
        self.state.lock(|state| state.borrow_mut().vss_edge(now, &self.config));
    }

    /// Atomically snapshot and clear the accumulators.
    ///
    /// `now` closes the drain window for a pulse that is still open.
    pub fn drain(
        &self,
        now: Micros,
    ) -> PulseSnapshot {
        self.state.lock(|state| state.borrow_mut().drain(now))
    }

    /// Latest valid injector period (µs) without clearing anything.
    pub fn peek_latest(&self) -> Option<u32> { self.state.lock(|state| state.borrow().latest_period_us) }
}

impl Default for PulseCapture {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn at(us: u32) -> Stamp { Stamp::new(us / 1000, us) }

    /// Open `[start, end)` as a start/end edge pair.
    fn pulse(
        capture: &PulseCapture,
        start: u32,
        end: u32,
    ) {
        capture.on_injector_edge(InjectorEdge::PulseStart, at(start));
        capture.on_injector_edge(InjectorEdge::PulseEnd, at(end));
    }

    #[test]
    fn test_edge_from_level() {
        assert_eq!(InjectorEdge::from_level(false), InjectorEdge::PulseStart);
        assert_eq!(InjectorEdge::from_level(true), InjectorEdge::PulseEnd);
    }

    #[test]
    fn test_open_time_sums_whole_pulses() {
        let capture = PulseCapture::new();
        pulse(&capture, 10_000, 12_500);
        pulse(&capture, 30_000, 33_000);
        let snap = capture.drain(Micros(50_000));
        assert_eq!(snap.injector_open_us, 5_500);

        // Accumulator is cleared by the drain.
        assert_eq!(capture.drain(Micros(60_000)).injector_open_us, 0);
    }

    #[test]
    fn test_open_time_split_at_drain_boundary() {
        let capture = PulseCapture::new();
        capture.on_injector_edge(InjectorEdge::PulseStart, at(90_000));

        // Window ends mid-pulse: only [90_000, 100_000) belongs here.
        let first = capture.drain(Micros(100_000));
        assert_eq!(first.injector_open_us, 10_000);

        capture.on_injector_edge(InjectorEdge::PulseEnd, at(103_000));
        let second = capture.drain(Micros(200_000));
        assert_eq!(second.injector_open_us, 3_000);
    }

    #[test]
    fn test_open_time_intersects_windows_for_any_boundary() {
        // Pulses: [1000, 4000), [9000, 9500), [20000, 26000)
        let pulses = [(1_000u32, 4_000u32), (9_000, 9_500), (20_000, 26_000)];
        let total: u32 = pulses.iter().map(|(s, e)| e - s).sum();

        for boundary in (0..30_000).step_by(250) {
            let capture = PulseCapture::new();
            let mut first = 0;
            let mut drained = false;
            for &(start, end) in &pulses {
                for edge_at in [start, end] {
                    if !drained && boundary <= edge_at {
                        first = capture.drain(Micros(boundary)).injector_open_us;
                        drained = true;
                    }
                    let edge = if edge_at == start {
                        InjectorEdge::PulseStart
                    } else {
                        InjectorEdge::PulseEnd
                    };
                    capture.on_injector_edge(edge, at(edge_at));
                }
            }
            if !drained {
                first = capture.drain(Micros(boundary)).injector_open_us;
            }
            let second = capture.drain(Micros(40_000)).injector_open_us;

            let expected_first: u32 = pulses
                .iter()
                .map(|&(s, e)| e.min(boundary).saturating_sub(s.min(boundary)))
                .sum();
            assert_eq!(first, expected_first, "boundary {boundary}");
            assert_eq!(first + second, total, "boundary {boundary}");
        }
    }

    #[test]
    fn test_period_rejects_noise_and_persists() {
        let capture = PulseCapture::new();
        capture.on_injector_edge(InjectorEdge::PulseStart, at(0));
        capture.on_injector_edge(InjectorEdge::PulseStart, at(20_000));
        assert_eq!(capture.peek_latest(), Some(20_000));

        // Glitch 500 µs later: not a valid period, latest value unchanged.
        capture.on_injector_edge(InjectorEdge::PulseStart, at(20_500));
        assert_eq!(capture.peek_latest(), Some(20_000));

        // Draining does not clear the latest period.
        let snap = capture.drain(Micros(30_000));
        assert_eq!(snap.injector_period_us, Some(20_000));
        assert_eq!(capture.peek_latest(), Some(20_000));
    }

    #[test]
    fn test_first_pulse_has_no_period() {
        let capture = PulseCapture::new();
        capture.on_injector_edge(InjectorEdge::PulseStart, at(5_000));
        assert_eq!(capture.peek_latest(), None);
    }

    #[test]
    fn test_injector_activity_stamp_on_every_edge() {
        let capture = PulseCapture::new();
        capture.on_injector_edge(InjectorEdge::PulseEnd, Stamp::new(77, 77_000));
        let snap = capture.drain(Micros(78_000));
        assert_eq!(snap.last_injector_activity, Some(Millis(77)));
        assert_eq!(snap.injector_open_us, 0);
    }

    #[test]
    fn test_vss_debounce() {
        let capture = PulseCapture::new();
        capture.on_vss_edge(at(10_000));
        capture.on_vss_edge(at(10_400)); // bounce
        capture.on_vss_edge(at(10_999)); // still inside the window
        capture.on_vss_edge(at(11_000)); // exactly one window after the accepted edge
        capture.on_vss_edge(at(15_000));
        let snap = capture.drain(Micros(20_000));
        assert_eq!(snap.vss_pulses, 3);
        assert_eq!(snap.last_vss_activity, Some(Millis(15)));
        assert_eq!(capture.drain(Micros(21_000)).vss_pulses, 0);
    }

    #[test]
    fn test_vss_debounce_across_counter_wrap() {
        let capture = PulseCapture::new();
        capture.on_vss_edge(Stamp::new(0, u32::MAX - 100));
        capture.on_vss_edge(Stamp::new(1, 200)); // 301 µs later
        capture.on_vss_edge(Stamp::new(2, 2_000));
        assert_eq!(capture.drain(Micros(3_000)).vss_pulses, 2);
    }
}
