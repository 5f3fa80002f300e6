//! Warning, counting and display thresholds.
//!
//! Each threshold group carries `const` assertions that verify ordering at
//! compile time. Misconfigured pairs (e.g. low-fuel off threshold below the
//! on threshold) fail the build instead of producing a latch that never
//! releases.

// =============================================================================
// Engine State
// =============================================================================

/// RPM above which injector activity counts as a running engine.
pub const MIN_RPM_FOR_STABLE_RUNNING: u32 = 400;

/// RPM above which the high oil pressure switch must be closed.
pub const MIN_RPM_FOR_HIGH_PRESSURE_CHECK: u32 = 2_000;

const _: () = assert!(MIN_RPM_FOR_STABLE_RUNNING < MIN_RPM_FOR_HIGH_PRESSURE_CHECK);

// =============================================================================
// Fuel Level
// =============================================================================

/// Smoothed fuel level at or below which LOW FUEL latches on (%).
pub const FUEL_LOW_THRESHOLD_PERCENT: f32 = 15.0;

/// Smoothed fuel level at or above which LOW FUEL releases (%).
pub const FUEL_HIGH_THRESHOLD_PERCENT: f32 = 25.0;

/// Number of raw readings averaged by the fuel level ring.
pub const FUEL_BUFFER_SIZE: usize = 20;

/// Maximum change of the smoothed fuel level (% per second).
pub const FUEL_MAX_PERCENT_CHANGE_PER_SEC: f32 = 0.5;

const _: () = assert!(FUEL_LOW_THRESHOLD_PERCENT < FUEL_HIGH_THRESHOLD_PERCENT);
const _: () = assert!(FUEL_BUFFER_SIZE > 0);

// =============================================================================
// Trip Counters
// =============================================================================

/// Trip fuel above this resets both trip counters (L).
pub const MAX_TRIP_LITERS: f32 = 999.0;

/// Trip distance above this resets both trip counters (km).
pub const MAX_TRIP_DISTANCE_KM: f32 = 9_999.0;

/// Lifetime distance at which both lifetime counters restart (km).
pub const RESET_PERSISTENT_TRIP_DISTANCE_KM: f32 = 5_000.0;

/// Ticks slower than this do not feed the lifetime average (km/h).
pub const MIN_SPEED_FOR_PERS_COUNT_KMH: f32 = 5.0;

// =============================================================================
// Main Screen Readout
// =============================================================================

/// Instant consumption switches from L/H to L/100KM at this speed (km/h).
pub const MIN_SPEED_FOR_L100KM_KMH: f32 = 20.0;

/// ...and only once the trip has covered this distance (km).
pub const MIN_DISTANCE_FOR_L100KM_KM: f32 = 0.1;

/// L/100KM readings above this are shown as zero (implausible).
pub const MAX_DISPLAY_L100KM_VALUE: f32 = 99.9;

/// Readings below this are shown as "-.--".
pub const STATIONARY_THRESHOLD: f32 = 0.1;

/// Lifetime average is hidden until this distance is covered (km).
pub const MIN_PERS_DISPLAY_DISTANCE_KM: f32 = 1.0;

const _: () = assert!(MIN_SPEED_FOR_PERS_COUNT_KMH < MIN_SPEED_FOR_L100KM_KMH);
const _: () = assert!(STATIONARY_THRESHOLD < MAX_DISPLAY_L100KM_VALUE);
