//! Trip computer firmware for Raspberry Pi Pico 2 (RP2350).
//!
//! Measures fuel consumption from the injector signal and distance from the
//! vehicle speed sensor, watches the warning switches and shows everything on
//! a 128x128 OLED.
//!
//! # Architecture
//!
//! - Capture tasks: run on a high-priority `InterruptExecutor` and timestamp
//!   every injector and VSS edge into the shared [`PulseCapture`]
//! - Main task: polls every [`LOOP_POLL_MS`] to keep the alarm pattern and the
//!   reset button responsive, and runs one [`TripComputer::tick`] every
//!   [`UPDATE_INTERVAL_MS`]
//!
//! A failed tick silences the alarm, shows the fallback screen and resumes
//! after [`LOOP_ERROR_COOLDOWN_MS`]. See `board.rs` for the pin mapping.

#![cfg_attr(target_arch = "arm", no_std, no_main)]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

#[cfg(target_arch = "arm")]
mod board;
#[cfg(target_arch = "arm")]
mod sh1107;

#[cfg(target_arch = "arm")]
mod firmware {
    use defmt::{info, warn};
    use embassy_executor::{InterruptExecutor, Spawner};
    use embassy_rp::adc::{self, Adc, Channel};
    use embassy_rp::flash::Flash;
    use embassy_rp::gpio::{Input, Pull};
    use embassy_rp::i2c::I2c;
    use embassy_rp::interrupt;
    use embassy_rp::interrupt::{InterruptExt, Priority};
    use embassy_rp::pwm::{self, Pwm};
    use embassy_time::{Duration, Instant, Timer};
    use trip_computer::capture::{InjectorEdge, PulseCapture};
    use trip_computer::config::UPDATE_INTERVAL_MS;
    use trip_computer::config::timing::{LOOP_ERROR_COOLDOWN_MS, LOOP_POLL_MS, RESET_CHIRP_MS};
    use trip_computer::hal::{Board, SensorLines};
    use trip_computer::orchestrator::TripComputer;
    use trip_computer::storage::FlashFs;
    use trip_computer::time::{Millis, Stamp};
    use {defmt_rtt as _, panic_probe as _};

    use crate::board::{
        AdcFuelGauge,
        FLASH_SIZE,
        GpioSensors,
        OledDisplay,
        PwmTone,
        RpFlash,
        display_i2c_config,
    };
    use crate::sh1107::{DEFAULT_ADDRESS, Sh1107};

    #[unsafe(link_section = ".bi_entries")]
    #[used]
    pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
        embassy_rp::binary_info::rp_program_name!(c"trip-computer"),
        embassy_rp::binary_info::rp_program_description!(c"Fuel consumption trip computer with SH1107 OLED"),
        embassy_rp::binary_info::rp_cargo_version!(),
        embassy_rp::binary_info::rp_program_build_attribute!(),
    ];

    /// Pulse state shared between the capture tasks and the tick loop.
    static CAPTURE: PulseCapture = PulseCapture::new();

    static EXECUTOR_CAPTURE: InterruptExecutor = InterruptExecutor::new();

    #[interrupt]
    unsafe fn SWI_IRQ_1() {
        // SAFETY: the executor is started on this interrupt below.
        unsafe { EXECUTOR_CAPTURE.on_interrupt() }
    }

    #[inline]
    fn stamp(now: Instant) -> Stamp { Stamp::new(now.as_millis() as u32, now.as_micros() as u32) }

    #[inline]
    fn millis(now: Instant) -> Millis { Millis(now.as_millis() as u32) }

    // =========================================================================
    // Capture Tasks
    // =========================================================================

    /// Injector line: low opens the injector, high closes it.
    ///
    /// The level is sampled after each edge, so a missed edge cannot leave the
    /// capture expecting the wrong transition.
    #[embassy_executor::task]
    async fn injector_task(mut pin: Input<'static>) {
        info!("Injector capture started");
        loop {
            pin.wait_for_any_edge().await;
            let at = stamp(Instant::now());
            CAPTURE.on_injector_edge(InjectorEdge::from_level(pin.is_high()), at);
        }
    }

    #[embassy_executor::task]
    async fn vss_task(mut pin: Input<'static>) {
        info!("VSS capture started");
        loop {
            pin.wait_for_falling_edge().await;
            CAPTURE.on_vss_edge(stamp(Instant::now()));
        }
    }

    // =========================================================================
    // Main Task
    // =========================================================================

    #[embassy_executor::main]
    async fn main(_spawner: Spawner) {
        info!("Trip computer starting...");
        let p = embassy_rp::init(Default::default());

        interrupt::SWI_IRQ_1.set_priority(Priority::P2);
        let capture_spawner = EXECUTOR_CAPTURE.start(interrupt::SWI_IRQ_1);
        capture_spawner
            .spawn(injector_task(Input::new(p.PIN_0, Pull::Up)))
            .unwrap();
        capture_spawner
            .spawn(vss_task(Input::new(p.PIN_1, Pull::Up)))
            .unwrap();

        let sensors = GpioSensors {
            brake_fluid: Input::new(p.PIN_24, Pull::Up),
            overheat: Input::new(p.PIN_8, Pull::Up),
            oil_pressure_low: Input::new(p.PIN_7, Pull::Up),
            oil_pressure_high: Input::new(p.PIN_10, Pull::Up),
            reset: Input::new(p.PIN_2, Pull::Up),
        };

        let adc = Adc::new_blocking(p.ADC, adc::Config::default());
        let fuel_gauge = AdcFuelGauge::new(adc, Channel::new_pin(p.PIN_26, Pull::None));

        let tone = PwmTone::new(Pwm::new_output_a(p.PWM_SLICE6, p.PIN_12, pwm::Config::default()));

        let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, display_i2c_config());
        let display = OledDisplay::init(Sh1107::new(i2c, DEFAULT_ADDRESS));
        if display.is_some() {
            info!("OLED initialized");
        }

        let mut board = Board {
            sensors,
            fuel_gauge: Some(fuel_gauge),
            tone: Some(tone),
            display,
        };

        let flash = Flash::<_, _, FLASH_SIZE>::new_blocking(p.FLASH);
        let storage = match FlashFs::mount(RpFlash::new(flash)) {
            Ok(fs) => Some(fs),
            Err(e) => {
                warn!("Trip storage unavailable: {}", e);
                None
            }
        };

        let mut computer = TripComputer::new(&CAPTURE, storage, millis(Instant::now()));
        let startup = computer.startup(&mut board, millis(Instant::now()));

        // Hold the startup screen; an alarm raised at startup keeps its pattern.
        let hold_until = Instant::now() + Duration::from_millis(startup.hold_ms);
        while Instant::now() < hold_until {
            computer.service_alarm(board.tone.as_mut(), millis(Instant::now()));
            Timer::after_millis(LOOP_POLL_MS).await;
        }

        info!("Entering main loop");
        let tick_interval = Duration::from_millis(u64::from(UPDATE_INTERVAL_MS));
        let mut last_tick = Instant::now();

        loop {
            if board.sensors.reset_pressed() {
                computer.begin_trip_reset(board.tone.as_mut());
                Timer::after_millis(RESET_CHIRP_MS).await;
                computer.end_trip_reset(board.tone.as_mut());
                while board.sensors.reset_pressed() {
                    Timer::after_millis(LOOP_POLL_MS).await;
                }
            }

            let now = Instant::now();
            if now.duration_since(last_tick) >= tick_interval {
                last_tick = now;
                if let Err(e) = computer.tick(&mut board, stamp(now)) {
                    computer.recover(&mut board, e);
                    Timer::after_millis(LOOP_ERROR_COOLDOWN_MS).await;
                    last_tick = Instant::now();
                }
            } else {
                computer.service_alarm(board.tone.as_mut(), millis(now));
            }

            Timer::after_millis(LOOP_POLL_MS).await;
        }
    }
}

#[cfg(not(target_arch = "arm"))]
fn main() {}
