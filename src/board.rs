//! `embassy-rp` implementations of the board traits.
//!
//! Pin mapping:
//! - Injector signal: GPIO0 (low while the injector is open)
//! - VSS: GPIO1 (falling edge per pulse)
//! - Trip reset button: GPIO2 (active-low)
//! - Oil pressure low switch: GPIO7 (active-low)
//! - Overheat / coolant level: GPIO8 (active-low)
//! - Oil pressure high switch: GPIO10 (active-high)
//! - Buzzer: GPIO12 (PWM slice 6, channel A)
//! - Brake fluid level: GPIO24 (active-low)
//! - Fuel sender: GPIO26 (ADC0)
//! - OLED: I2C0, SDA GPIO4, SCL GPIO5, 400 kHz

use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::flash::{self, Flash, ERASE_SIZE};
use embassy_rp::gpio::Input;
use embassy_rp::i2c;
use embassy_rp::peripherals::FLASH;
use embassy_rp::pwm::{self, Pwm};
use trip_computer::classify::SensorStates;
use trip_computer::error::{DisplayError, StorageError, TickError};
use trip_computer::hal::{Display, FuelGauge, SensorLines, ToneOutput};
use trip_computer::screens::{Frame, draw_frame};
use trip_computer::storage::FlashRegion;

use crate::sh1107::Sh1107;

/// Size of the on-board QSPI flash (Pico 2).
pub const FLASH_SIZE: usize = 4 * 1024 * 1024;

/// Sectors at the end of flash reserved for trip data.
pub const STORAGE_SECTORS: usize = 16;

const STORAGE_OFFSET: usize = FLASH_SIZE - STORAGE_SECTORS * ERASE_SIZE;

/// PWM clock divider; keeps TOP within 16 bits down to ~570 Hz.
const TONE_DIVIDER: u8 = 4;

/// I2C configuration for the SH1107.
pub fn display_i2c_config() -> i2c::Config {
    let mut config = i2c::Config::default();
    config.frequency = 400_000;
    config
}

// =============================================================================
// Sensor Lines
// =============================================================================

pub struct GpioSensors {
    pub brake_fluid: Input<'static>,
    pub overheat: Input<'static>,
    pub oil_pressure_low: Input<'static>,
    pub oil_pressure_high: Input<'static>,
    pub reset: Input<'static>,
}

impl SensorLines for GpioSensors {
    fn read(&mut self) -> Result<SensorStates, TickError> {
        Ok(SensorStates {
            brake_fluid_low: self.brake_fluid.is_low(),
            overheat: self.overheat.is_low(),
            oil_pressure_low: self.oil_pressure_low.is_low(),
            oil_pressure_high: self.oil_pressure_high.is_high(),
        })
    }

    fn reset_pressed(&mut self) -> bool { self.reset.is_low() }
}

// =============================================================================
// Fuel Gauge
// =============================================================================

pub struct AdcFuelGauge {
    adc: Adc<'static, adc::Blocking>,
    channel: Channel<'static>,
    last: u16,
}

impl AdcFuelGauge {
    pub fn new(
        adc: Adc<'static, adc::Blocking>,
        channel: Channel<'static>,
    ) -> Self {
        Self { adc, channel, last: 0 }
    }
}

impl FuelGauge for AdcFuelGauge {
    /// 12-bit conversion scaled to 0-65535; a failed conversion repeats the last value.
    fn read_raw(&mut self) -> u16 {
        match self.adc.blocking_read(&mut self.channel) {
            Ok(raw) => self.last = raw << 4,
            Err(e) => defmt::warn!("Fuel ADC read failed: {}", e),
        }
        self.last
    }
}

// =============================================================================
// Buzzer
// =============================================================================

pub struct PwmTone {
    pwm: Pwm<'static>,
    config: pwm::Config,
    enabled: bool,
}

impl PwmTone {
    pub fn new(pwm: Pwm<'static>) -> Self {
        let mut config = pwm::Config::default();
        config.divider = TONE_DIVIDER.into();
        config.compare_a = 0;
        Self {
            pwm,
            config,
            enabled: false,
        }
    }

    fn apply(&mut self) {
        self.config.compare_a = if self.enabled { self.config.top / 2 } else { 0 };
        self.pwm.set_config(&self.config);
    }
}

impl ToneOutput for PwmTone {
    fn set_frequency(
        &mut self,
        hz: u32,
    ) {
        if hz == 0 {
            return;
        }
        let counter_hz = embassy_rp::clocks::clk_sys_freq() / u32::from(TONE_DIVIDER);
        self.config.top = (counter_hz / hz).saturating_sub(1).min(u32::from(u16::MAX)) as u16;
        self.apply();
    }

    fn set_enabled(
        &mut self,
        on: bool,
    ) {
        self.enabled = on;
        self.apply();
    }
}

// =============================================================================
// Display
// =============================================================================

pub struct OledDisplay {
    driver: Sh1107,
}

impl OledDisplay {
    /// Initialize the panel; `None` if it does not answer.
    pub fn init(mut driver: Sh1107) -> Option<Self> {
        match driver.init() {
            Ok(()) => Some(Self { driver }),
            Err(e) => {
                defmt::warn!("OLED init failed: {}", e);
                None
            }
        }
    }
}

impl Display for OledDisplay {
    fn show(
        &mut self,
        frame: &Frame,
    ) -> Result<(), DisplayError> {
        draw_frame(&mut self.driver, frame);
        self.driver.flush().map_err(|e| {
            defmt::warn!("OLED flush failed: {}", e);
            DisplayError
        })
    }
}

// =============================================================================
// Flash
// =============================================================================

/// The reserved sectors at the end of the on-board flash.
pub struct RpFlash {
    flash: Flash<'static, FLASH, flash::Blocking, FLASH_SIZE>,
}

impl RpFlash {
    pub fn new(flash: Flash<'static, FLASH, flash::Blocking, FLASH_SIZE>) -> Self { Self { flash } }

    #[inline]
    fn absolute(offset: usize) -> u32 { (STORAGE_OFFSET + offset) as u32 }
}

impl FlashRegion for RpFlash {
    fn sector_size(&self) -> usize { ERASE_SIZE }

    fn sector_count(&self) -> usize { STORAGE_SECTORS }

    fn read(
        &mut self,
        offset: usize,
        buf: &mut [u8],
    ) -> Result<(), StorageError> {
        self.flash
            .blocking_read(Self::absolute(offset), buf)
            .map_err(|_| StorageError::Flash)
    }

    fn erase(
        &mut self,
        sector: usize,
    ) -> Result<(), StorageError> {
        let from = Self::absolute(sector * ERASE_SIZE);
        self.flash
            .blocking_erase(from, from + ERASE_SIZE as u32)
            .map_err(|_| StorageError::Flash)
    }

    fn program(
        &mut self,
        offset: usize,
        data: &[u8],
    ) -> Result<(), StorageError> {
        self.flash
            .blocking_write(Self::absolute(offset), data)
            .map_err(|_| StorageError::Flash)
    }
}
