//! Per-tick conversion of drained pulse data into engineering units.

use crate::capture::{PulseCapture, PulseSnapshot};
use crate::config::{INJ_FLOW_L_PER_US, RPM_CALCULATION_FACTOR, VSS_PULSES_PER_KM};
use crate::time::{Micros, Millis};

/// Unit conversion constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AggregatorConfig {
    pub vss_pulses_per_km: f32,
    pub injector_flow_l_per_us: f32,
    pub rpm_factor: u32,
}

impl AggregatorConfig {
    pub const DEFAULT: Self = Self {
        vss_pulses_per_km: VSS_PULSES_PER_KM,
        injector_flow_l_per_us: INJ_FLOW_L_PER_US,
        rpm_factor: RPM_CALCULATION_FACTOR,
    };
}

impl Default for AggregatorConfig {
    fn default() -> Self { Self::DEFAULT }
}

/// Engineering units for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct TickReadings {
    /// Distance covered during the tick (km).
    pub distance_km: f32,
    /// Fuel injected during the tick (L).
    pub volume_l: f32,
    /// Average speed over the tick (km/h).
    pub speed_kmh: f32,
    /// Engine speed from the latest valid injector period.
    pub rpm: u32,
    /// Tick length the rates were computed over (s).
    pub interval_s: f32,
    pub last_injector_activity: Option<Millis>,
    pub last_vss_activity: Option<Millis>,
}

/// Converts pulse snapshots to [`TickReadings`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EventAggregator {
    config: AggregatorConfig,
}

impl EventAggregator {
    pub const fn new(config: AggregatorConfig) -> Self { Self { config } }

    /// Drain `capture` and convert the snapshot.
    pub fn drain(
        &self,
        capture: &PulseCapture,
        now: Micros,
        interval_s: f32,
    ) -> TickReadings {
        let snapshot = capture.drain(now);
        self.convert(&snapshot, interval_s)
    }

    /// Pure conversion of one snapshot over a tick of `interval_s` seconds.
    pub fn convert(
        &self,
        snapshot: &PulseSnapshot,
        interval_s: f32,
    ) -> TickReadings {
        let distance_km = snapshot.vss_pulses as f32 / self.config.vss_pulses_per_km;
        let volume_l = snapshot.injector_open_us as f32 * self.config.injector_flow_l_per_us;
        let speed_kmh = if interval_s > 0.0 {
            distance_km / (interval_s / 3600.0)
        } else {
            0.0
        };

        TickReadings {
            distance_km,
            volume_l,
            speed_kmh,
            rpm: self.rpm(snapshot.injector_period_us),
            interval_s,
            last_injector_activity: snapshot.last_injector_activity,
            last_vss_activity: snapshot.last_vss_activity,
        }
    }

    /// RPM for an injector period, 0 without a valid period.
    #[inline]
    pub fn rpm(
        &self,
        period_us: Option<u32>,
    ) -> u32 {
        match period_us {
            Some(period) if period > 0 => self.config.rpm_factor / period,
            _ => 0,
        }
    }
}
