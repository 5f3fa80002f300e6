//! Board abstraction.
//!
//! The firmware binary implements these over `embassy-rp` peripherals; the
//! host tests implement them with plain structs.

use crate::classify::SensorStates;
use crate::error::{DisplayError, TickError};
use crate::screens::Frame;

/// Digital sensor lines and the trip reset button.
pub trait SensorLines {
    /// Current asserted state of every warning sensor.
    fn read(&mut self) -> Result<SensorStates, TickError>;

    /// Whether the trip reset button is held.
    fn reset_pressed(&mut self) -> bool;
}

/// Tank sender ADC.
pub trait FuelGauge {
    /// Raw reading scaled to 0-65535.
    fn read_raw(&mut self) -> u16;
}

/// Buzzer driven by a variable-frequency square wave.
pub trait ToneOutput {
    fn set_frequency(
        &mut self,
        hz: u32,
    );

    /// Switch the output on (50 % duty) or off (0 % duty).
    fn set_enabled(
        &mut self,
        on: bool,
    );
}

/// Anything that can present a [`Frame`].
pub trait Display {
    fn show(
        &mut self,
        frame: &Frame,
    ) -> Result<(), DisplayError>;
}

/// The trip computer's peripherals.
///
/// Sensor lines are always present. The other peripherals are optional: a
/// failed init disables that feature instead of stopping the firmware.
pub struct Board<S, G, T, D> {
    pub sensors: S,
    pub fuel_gauge: Option<G>,
    pub tone: Option<T>,
    pub display: Option<D>,
}
