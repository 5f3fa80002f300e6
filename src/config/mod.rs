//! Application configuration.
//!
//! - `calibration`: Vehicle-specific unit conversion constants
//! - `thresholds`: Warning, counting and readout thresholds
//! - `timing`: Tick cadence, display cycling, alarm pattern, save cadence

pub mod calibration;
pub mod thresholds;
pub mod timing;

pub use calibration::{
    FUEL_ADC_MAX_RAW,
    FUEL_ADC_MIN_RAW,
    INJ_FLOW_L_PER_US,
    MIN_INJ_PERIOD_US,
    RPM_CALCULATION_FACTOR,
    VSS_DEBOUNCE_US,
    VSS_PULSES_PER_KM,
};
pub use timing::{ALARM_SEQUENCE, UPDATE_INTERVAL_MS};

/// Storage file names for the persisted trip counters.
pub const TRIP_DATA_FILE: &str = "trip.dat";
pub const TRIP_DATA_TEMP: &str = "trip.tmp";
pub const TRIP_DATA_BACKUP: &str = "trip.bak";
