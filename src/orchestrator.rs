//! The trip computer: one owner for every stage of the tick.
//!
//! # Tick Order
//!
//! 1. Overflow guard on the trip counters
//! 2. Drain the pulse capture and convert to engineering units
//! 3. Accumulate into the ledger, persistent reset, periodic save
//! 4. Fuel smoothing and the LOW FUEL latch
//! 5. Classify sensors, update the presentation state machine
//! 6. Alarm, blink phase
//! 7. Build and show the frame
//!
//! A failing stage aborts the tick with a [`TickError`]; the caller hands it to
//! [`TripComputer::recover`], waits out the cooldown and carries on.
//!
//! Between ticks the main loop keeps the alarm pattern running through
//! [`TripComputer::service_alarm`] and polls the trip reset button.

use crate::aggregate::{AggregatorConfig, EventAggregator, TickReadings};
use crate::alarm::{AlarmConfig, AlarmSequencer};
use crate::capture::PulseCapture;
use crate::classify::{ClassifierConfig, ClassifierInputs, ErrorClassifier, SensorStates};
use crate::conditions::{ErrorKind, Severity};
use crate::config::UPDATE_INTERVAL_MS;
use crate::config::timing::{
    BLINK_INTERVAL_MS,
    RESET_CHIRP_HZ,
    STARTUP_ERROR_SCREEN_DURATION_MS,
    STARTUP_OK_SCREEN_DURATION_MS,
};
use crate::error::TickError;
use crate::fuel::{FuelConfig, FuelLevelEstimator};
use crate::hal::{Board, Display, FuelGauge, SensorLines, ToneOutput};
use crate::ledger::{LedgerConfig, TripLedger};
use crate::presentation::{ErrorPresentation, PresentationConfig, Screen};
use crate::readout::{MainScreen, ReadoutConfig};
use crate::screens::Frame;
use crate::storage::{FileSystem, TripFiles, TripRecord};
use crate::time::{Millis, Stamp};

/// What to show after startup and for how long.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Startup {
    pub frame: Frame,
    pub hold_ms: u64,
}

pub struct TripComputer<'a, F> {
    capture: &'a PulseCapture,
    aggregator: EventAggregator,
    fuel: FuelLevelEstimator,
    classifier: ErrorClassifier,
    presentation: ErrorPresentation,
    alarm: AlarmSequencer,
    ledger: TripLedger<F>,
    readout: ReadoutConfig,
    last_tick: Millis,
    blink: bool,
    last_blink: Millis,
    last_readings: TickReadings,
}

impl<'a, F: FileSystem> TripComputer<'a, F> {
    /// Build with the default configuration of every component.
    pub fn new(
        capture: &'a PulseCapture,
        storage: Option<F>,
        now: Millis,
    ) -> Self {
        Self {
            capture,
            aggregator: EventAggregator::new(AggregatorConfig::DEFAULT),
            fuel: FuelLevelEstimator::new(FuelConfig::DEFAULT),
            classifier: ErrorClassifier::new(ClassifierConfig::DEFAULT),
            presentation: ErrorPresentation::new(PresentationConfig::DEFAULT, now),
            alarm: AlarmSequencer::new(AlarmConfig::DEFAULT),
            ledger: TripLedger::new(LedgerConfig::DEFAULT, storage, TripFiles::DEFAULT, now),
            readout: ReadoutConfig::DEFAULT,
            last_tick: now,
            blink: true,
            last_blink: now,
            last_readings: TickReadings::default(),
        }
    }

    #[inline]
    pub fn counters(&self) -> &TripRecord { self.ledger.counters() }

    #[inline]
    pub fn file_errors(&self) -> u32 { self.ledger.file_errors() }

    #[inline]
    pub fn presentation(&self) -> &ErrorPresentation { &self.presentation }

    #[inline]
    pub fn fuel_level(&self) -> f32 { self.fuel.level_percent() }

    #[inline]
    pub fn alarm_active(&self) -> bool { self.alarm.is_active() }

    /// Readings of the most recent tick.
    #[inline]
    pub fn last_readings(&self) -> &TickReadings { &self.last_readings }

    /// Boot sequence: prime the fuel level, check for critical conditions,
    /// show the startup screen and load the saved counters.
    pub fn startup<S, G, T, D>(
        &mut self,
        board: &mut Board<S, G, T, D>,
        now: Millis,
    ) -> Startup
    where
        S: SensorLines,
        G: FuelGauge,
        T: ToneOutput,
        D: Display,
    {
        if let Some(gauge) = board.fuel_gauge.as_mut() {
            self.fuel.prime(gauge.read_raw());
            info!("Fuel level at startup: {}%", self.fuel.level_percent());
        }

        let sensors = board.sensors.read().unwrap_or_else(|e| {
            warn!("Sensor read failed at startup: {}", e);
            SensorStates::default()
        });
        let inputs = ClassifierInputs {
            sensors,
            low_fuel: self.fuel.is_low(),
            ..Default::default()
        };
        let classification = self.classifier.evaluate(&inputs, now);

        let startup = if classification.severity == Severity::Critical {
            let set = classification.display_set();
            let first = set.get(0).unwrap_or(ErrorKind::Warning);
            warn!("Critical condition at startup: {}", first);
            self.presentation.replace(set, now);
            self.service_alarm(board.tone.as_mut(), now);
            Startup {
                frame: Frame::Condition {
                    kind: first,
                    file_errors: 0,
                    blink: false,
                },
                hold_ms: STARTUP_ERROR_SCREEN_DURATION_MS,
            }
        } else {
            Startup {
                frame: Frame::StartupOk,
                hold_ms: STARTUP_OK_SCREEN_DURATION_MS,
            }
        };

        if let Some(display) = board.display.as_mut() {
            if let Err(e) = display.show(&startup.frame) {
                warn!("Startup screen failed: {}", e);
            }
        }

        self.ledger.load(now);
        self.last_tick = now;
        self.last_blink = now;
        startup
    }

    /// One periodic update. Returns the frame that was shown.
    pub fn tick<S, G, T, D>(
        &mut self,
        board: &mut Board<S, G, T, D>,
        now: Stamp,
    ) -> Result<Frame, TickError>
    where
        S: SensorLines,
        G: FuelGauge,
        T: ToneOutput,
        D: Display,
    {
        let mut interval_s = now.ms.secs_since(self.last_tick);
        if interval_s <= 0.0 {
            interval_s = UPDATE_INTERVAL_MS as f32 / 1000.0;
        }
        self.last_tick = now.ms;

        let readings = self.aggregator.drain(self.capture, now.us, interval_s);
        self.last_readings = readings;
        self.ledger
            .accumulate(readings.distance_km, readings.volume_l, readings.speed_kmh, now.ms);
        self.ledger.save_if_due(now.ms);

        if let Some(gauge) = board.fuel_gauge.as_mut() {
            self.fuel.update(gauge.read_raw(), interval_s);
        }

        let inputs = ClassifierInputs {
            sensors: board.sensors.read()?,
            rpm: readings.rpm,
            low_fuel: self.fuel.is_low(),
            last_injector_activity: readings.last_injector_activity,
            last_vss_activity: readings.last_vss_activity,
        };
        let classification = self.classifier.evaluate(&inputs, now.ms);
        let screen = self.presentation.update(classification.display_set(), now.ms);

        self.service_alarm(board.tone.as_mut(), now.ms);
        if now.ms.since(self.last_blink) >= BLINK_INTERVAL_MS {
            self.blink = !self.blink;
            self.last_blink = now.ms;
        }

        let frame = self.frame_for(screen, &readings);
        if let Some(display) = board.display.as_mut() {
            display.show(&frame)?;
        }
        Ok(frame)
    }

    fn frame_for(
        &self,
        screen: Screen,
        readings: &TickReadings,
    ) -> Frame {
        let file_errors = self.ledger.file_errors();
        match screen {
            Screen::Main => Frame::Main(MainScreen::compute(
                &self.readout,
                readings,
                self.ledger.counters(),
                file_errors,
            )),
            Screen::Condition(kind) => Frame::Condition {
                kind,
                file_errors,
                blink: self.blink,
            },
        }
    }

    /// Advance the alarm pattern; sounds exactly while a critical set is shown.
    pub fn service_alarm<T: ToneOutput>(
        &mut self,
        tone: Option<&mut T>,
        now: Millis,
    ) {
        let critical = self.presentation.severity() == Severity::Critical;
        if let Some(tone) = tone {
            self.alarm.update(critical, now, tone);
        }
    }

    /// Recover from a failed tick: silence the alarm and show the fallback.
    pub fn recover<S, G, T, D>(
        &mut self,
        board: &mut Board<S, G, T, D>,
        err: TickError,
    ) where
        T: ToneOutput,
        D: Display,
    {
        error!("Loop error: {}", err);
        if let Some(tone) = board.tone.as_mut() {
            self.alarm.force_silence(tone);
        }
        if let Some(display) = board.display.as_mut() {
            if let Err(e) = display.show(&Frame::LoopError) {
                warn!("Fallback screen failed: {}", e);
            }
        }
    }

    /// Zero the trip counters and start the confirmation chirp.
    pub fn begin_trip_reset<T: ToneOutput>(
        &mut self,
        tone: Option<&mut T>,
    ) {
        self.ledger.reset_trip();
        if let Some(tone) = tone {
            self.alarm.chirp(tone, RESET_CHIRP_HZ);
        }
    }

    /// End the confirmation chirp.
    pub fn end_trip_reset<T: ToneOutput>(
        &mut self,
        tone: Option<&mut T>,
    ) {
        if let Some(tone) = tone {
            self.alarm.force_silence(tone);
        }
    }
}
