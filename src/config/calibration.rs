//! Vehicle calibration constants (Audi 80 B3, 2.0E Mono-Motronic).
//!
//! These convert raw pulse counts and pulse widths into engineering units.
//! All values are compile-time constants; the per-component `*Config` structs
//! are built from them.

// =============================================================================
// Vehicle Speed Sensor
// =============================================================================

/// VSS pulses per kilometre travelled.
pub const VSS_PULSES_PER_KM: f32 = 4971.0;

/// Minimum spacing between two accepted VSS edges (µs).
///
/// At 250 km/h the sensor produces ~345 pulses/s (~2900 µs apart), so a 1 ms
/// window only removes contact bounce and ignition noise.
pub const VSS_DEBOUNCE_US: u32 = 1_000;

// =============================================================================
// Injector
// =============================================================================

/// Rated injector flow at nominal fuel pressure (mL/min).
pub const INJ_FLOW_RATE_ML_PER_MIN: f32 = 980.0;

/// Injector flow converted to litres per microsecond of open time.
pub const INJ_FLOW_L_PER_US: f32 = INJ_FLOW_RATE_ML_PER_MIN / (1000.0 * 60.0 * 1_000_000.0);

/// RPM = `RPM_CALCULATION_FACTOR / injector_period_us`.
///
/// Single-point injection on a four-cylinder engine fires once per ignition
/// event, i.e. twice per crankshaft revolution: 60 s * 1e6 µs / 2.
pub const RPM_CALCULATION_FACTOR: u32 = 30_000_000;

/// Injector periods at or below this are electrical noise (µs).
///
/// 2000 µs corresponds to 15 000 rpm, far above the rev limiter.
pub const MIN_INJ_PERIOD_US: u32 = 2_000;

// =============================================================================
// Fuel Level Sender
// =============================================================================

/// Raw ADC reading (0-65535 scale) with an empty tank.
pub const FUEL_ADC_MIN_RAW: u16 = 6_500;

/// Raw ADC reading (0-65535 scale) with a full tank.
pub const FUEL_ADC_MAX_RAW: u16 = 52_000;

const _: () = assert!(FUEL_ADC_MIN_RAW < FUEL_ADC_MAX_RAW);
const _: () = assert!(MIN_INJ_PERIOD_US < RPM_CALCULATION_FACTOR);
