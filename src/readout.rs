//! Main screen figures.
//!
//! Turns one tick of readings plus the ledger counters into the fixed-width
//! strings the main screen draws. Kept separate from drawing so the rules can
//! be tested without a display.
//!
//! | Field         | Shown                                        | Otherwise |
//! |---------------|----------------------------------------------|-----------|
//! | Rate          | L/100KM when moving fast enough, else L/H    | `-.--`    |
//! | Average       | persistent L/100KM past a minimum distance   | `----`    |
//! | Trip fuel     | above 0.05 L                                 | `----`    |
//! | Trip distance | above 0.1 km, whole kilometres               | `---`     |

use core::fmt::Write;

use heapless::String;

use crate::aggregate::TickReadings;
use crate::config::thresholds::{
    MAX_DISPLAY_L100KM_VALUE,
    MIN_DISTANCE_FOR_L100KM_KM,
    MIN_PERS_DISPLAY_DISTANCE_KM,
    MIN_SPEED_FOR_L100KM_KMH,
    STATIONARY_THRESHOLD,
};
use crate::storage::TripRecord;

/// Capacity of every readout field.
pub const FIELD_LEN: usize = 8;

pub type Field = String<FIELD_LEN>;

/// Below this interval distance no L/100KM ratio is computed.
const MIN_INTERVAL_DISTANCE_KM: f32 = 0.0001;

/// Rates at or above this do not fit the L/H field.
const MAX_DISPLAY_L_PER_H: f32 = 100.0;

const TRIP_FUEL_MIN_L: f64 = 0.05;
const TRIP_DISTANCE_MIN_KM: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum RateUnit {
    LitersPerHour,
    LitersPer100Km,
}

impl RateUnit {
    pub const fn label(self) -> &'static str {
        match self {
            Self::LitersPerHour => "L/H",
            Self::LitersPer100Km => "L/100KM",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadoutConfig {
    pub min_speed_l100km_kmh: f32,
    pub min_trip_distance_l100km_km: f32,
    pub max_display_l100km: f32,
    pub stationary_threshold: f32,
    pub min_average_distance_km: f32,
}

impl ReadoutConfig {
    pub const DEFAULT: Self = Self {
        min_speed_l100km_kmh: MIN_SPEED_FOR_L100KM_KMH,
        min_trip_distance_l100km_km: MIN_DISTANCE_FOR_L100KM_KM,
        max_display_l100km: MAX_DISPLAY_L100KM_VALUE,
        stationary_threshold: STATIONARY_THRESHOLD,
        min_average_distance_km: MIN_PERS_DISPLAY_DISTANCE_KM,
    };
}

impl Default for ReadoutConfig {
    fn default() -> Self { Self::DEFAULT }
}

/// Everything the main screen shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MainScreen {
    /// Instantaneous consumption, 4 characters.
    pub rate: Field,
    pub unit: RateUnit,
    /// Lifetime average L/100KM.
    pub average: Field,
    pub trip_fuel: Field,
    pub trip_distance: Field,
    /// Storage failure counter; drawn only when non-zero.
    pub file_errors: u32,
}

fn field(args: core::fmt::Arguments<'_>) -> Field {
    let mut out = Field::new();
    // Every format below fits FIELD_LEN.
    let _ = out.write_fmt(args);
    out
}

impl MainScreen {
    pub fn compute(
        config: &ReadoutConfig,
        tick: &TickReadings,
        counters: &TripRecord,
        file_errors: u32,
    ) -> Self {
        let (value, unit) = instantaneous(config, tick, counters);

        let rate = if value < config.stationary_threshold {
            field(format_args!("-.--"))
        } else if unit == RateUnit::LitersPerHour && value >= MAX_DISPLAY_L_PER_H {
            field(format_args!("EEEE"))
        } else if value < 10.0 {
            field(format_args!("{value:>4.2}"))
        } else {
            field(format_args!("{value:>4.1}"))
        };

        let mut average_value = 0.0f32;
        if counters.persistent_distance_km > f64::from(config.min_average_distance_km) {
            average_value = (counters.persistent_fuel_l / counters.persistent_distance_km * 100.0) as f32;
        }
        let average = if average_value > 0.0 && average_value <= config.max_display_l100km {
            field(format_args!("{average_value:>4.1}"))
        } else {
            field(format_args!("----"))
        };

        let trip_fuel = if counters.trip_fuel_l > TRIP_FUEL_MIN_L {
            field(format_args!("{:>5.1}", counters.trip_fuel_l))
        } else {
            field(format_args!(" ----"))
        };

        let trip_distance = if counters.trip_distance_km > TRIP_DISTANCE_MIN_KM {
            field(format_args!("{:>4}", counters.trip_distance_km as u32))
        } else {
            field(format_args!(" ---"))
        };

        Self {
            rate,
            unit,
            average,
            trip_fuel,
            trip_distance,
            file_errors,
        }
    }
}

/// Instantaneous consumption and its unit.
fn instantaneous(
    config: &ReadoutConfig,
    tick: &TickReadings,
    counters: &TripRecord,
) -> (f32, RateUnit) {
    let per_100km = tick.speed_kmh >= config.min_speed_l100km_kmh
        && counters.trip_distance_km >= f64::from(config.min_trip_distance_l100km_km);

    if per_100km {
        let mut value = 0.0;
        if tick.distance_km > MIN_INTERVAL_DISTANCE_KM {
            value = tick.volume_l / tick.distance_km * 100.0;
        }
        if value > config.max_display_l100km {
            value = 0.0;
        }
        (value, RateUnit::LitersPer100Km)
    } else {
        let value = if tick.interval_s > 0.0 {
            tick.volume_l / (tick.interval_s / 3600.0)
        } else {
            0.0
        };
        (value, RateUnit::LitersPerHour)
    }
}
