//! Trip and lifetime fuel/distance counters with periodic persistence.
//!
//! Two pairs of counters are kept:
//!
//! - **Trip**: everything since the last manual reset; guarded against runaway
//!   values by an overflow check.
//! - **Persistent**: a long-running average basis; only accumulates while the
//!   car is moving and restarts from zero after a fixed distance so the average
//!   keeps tracking recent driving.
//!
//! All four counters are saved with the atomic replace protocol of
//! [`crate::storage`]. Storage failures never stop the ledger; they increment a
//! diagnostic counter shown on the display.

use crate::config::thresholds::{
    MAX_TRIP_DISTANCE_KM,
    MAX_TRIP_LITERS,
    MIN_SPEED_FOR_PERS_COUNT_KMH,
    RESET_PERSISTENT_TRIP_DISTANCE_KM,
};
use crate::config::timing::PERSISTENT_SAVE_INTERVAL_MS;
use crate::error::StorageError;
use crate::storage::{self, FileSystem, TripFiles, TripRecord};
use crate::time::Millis;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LedgerConfig {
    pub max_trip_liters: f32,
    pub max_trip_distance_km: f32,
    /// Persistent distance at which both persistent counters restart.
    pub persistent_reset_km: f32,
    /// Below this speed nothing is added to the persistent counters.
    pub min_speed_for_persistent_kmh: f32,
    pub save_interval_ms: u32,
}

impl LedgerConfig {
    pub const DEFAULT: Self = Self {
        max_trip_liters: MAX_TRIP_LITERS,
        max_trip_distance_km: MAX_TRIP_DISTANCE_KM,
        persistent_reset_km: RESET_PERSISTENT_TRIP_DISTANCE_KM,
        min_speed_for_persistent_kmh: MIN_SPEED_FOR_PERS_COUNT_KMH,
        save_interval_ms: PERSISTENT_SAVE_INTERVAL_MS,
    };
}

impl Default for LedgerConfig {
    fn default() -> Self { Self::DEFAULT }
}

/// Counter owner; `F` is the backing store, absent when flash failed to mount.
pub struct TripLedger<F> {
    config: LedgerConfig,
    storage: Option<F>,
    files: TripFiles,
    counters: TripRecord,
    last_save: Millis,
    file_errors: u32,
}

impl<F: FileSystem> TripLedger<F> {
    pub fn new(
        config: LedgerConfig,
        storage: Option<F>,
        files: TripFiles,
        now: Millis,
    ) -> Self {
        Self {
            config,
            storage,
            files,
            counters: TripRecord::default(),
            last_save: now,
            file_errors: 0,
        }
    }

    #[inline]
    pub fn counters(&self) -> &TripRecord { &self.counters }

    /// Storage failures since boot.
    #[inline]
    pub fn file_errors(&self) -> u32 { self.file_errors }

    fn record_error(
        &mut self,
        err: StorageError,
    ) {
        self.file_errors = self.file_errors.saturating_add(1);
        warn!("Storage error: {} (file errors: {})", err, self.file_errors);
    }

    /// Clear a leftover temp file and load the saved counters.
    ///
    /// Any failure leaves all counters at zero.
    pub fn load(
        &mut self,
        now: Millis,
    ) {
        self.last_save = now;
        let Some(fs) = self.storage.as_mut() else {
            warn!("No storage, counters start at zero");
            self.record_error(StorageError::NotFound);
            return;
        };

        storage::remove_stale_temp(fs, &self.files);
        match storage::load(fs, &self.files) {
            Ok(record) => {
                info!(
                    "Loaded trip data: {} L / {} km",
                    record.trip_fuel_l, record.trip_distance_km
                );
                self.counters = record;
            }
            Err(e) => {
                self.counters = TripRecord::default();
                self.record_error(e);
            }
        }
    }

    /// Persist all four counters now.
    pub fn save(
        &mut self,
        now: Millis,
    ) -> Result<(), StorageError> {
        let Some(fs) = self.storage.as_mut() else {
            return Ok(());
        };
        match storage::save(fs, &self.files, &self.counters) {
            Ok(()) => {
                self.last_save = now;
                debug!("Trip data saved");
                Ok(())
            }
            Err(e) => {
                self.record_error(e);
                Err(e)
            }
        }
    }

    /// Zero both trip counters if either exceeds its limit.
    ///
    /// Does not save; the next periodic save picks the change up.
    fn guard_overflow(&mut self) {
        let c = &mut self.counters;
        if c.trip_fuel_l > f64::from(self.config.max_trip_liters)
            || c.trip_distance_km > f64::from(self.config.max_trip_distance_km)
        {
            warn!("Trip counters overflowed, resetting");
            c.trip_fuel_l = 0.0;
            c.trip_distance_km = 0.0;
        }
    }

    /// Add one tick of driving, after the overflow guard.
    ///
    /// Counters are `f64`: near the distance caps an `f32` step is coarser than
    /// one slow tick of travel.
    pub fn accumulate(
        &mut self,
        distance_km: f32,
        fuel_l: f32,
        speed_kmh: f32,
        now: Millis,
    ) {
        self.guard_overflow();

        let distance_km = f64::from(distance_km);
        let fuel_l = f64::from(fuel_l);
        let c = &mut self.counters;
        c.trip_fuel_l += fuel_l;
        c.trip_distance_km += distance_km;

        if speed_kmh >= self.config.min_speed_for_persistent_kmh {
            c.persistent_fuel_l += fuel_l;
            c.persistent_distance_km += distance_km;
        }

        if c.persistent_distance_km >= f64::from(self.config.persistent_reset_km) {
            info!("Persistent distance cap reached, restarting average");
            c.persistent_fuel_l = 0.0;
            c.persistent_distance_km = 0.0;
            // Failure already counted.
            let _ = self.save(now);
        }
    }

    /// Save if the save interval has elapsed since the last successful save.
    pub fn save_if_due(
        &mut self,
        now: Millis,
    ) {
        if now.since(self.last_save) >= self.config.save_interval_ms {
            let _ = self.save(now);
        }
    }

    /// Zero the trip counters; persistent counters are untouched.
    pub fn reset_trip(&mut self) {
        info!("Trip reset");
        self.counters.trip_fuel_l = 0.0;
        self.counters.trip_distance_km = 0.0;
    }

    #[cfg(test)]
    pub(crate) fn storage_mut(&mut self) -> Option<&mut F> { self.storage.as_mut() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::mem::MemFs;

    fn ledger() -> TripLedger<MemFs> {
        TripLedger::new(LedgerConfig::DEFAULT, Some(MemFs::new()), TripFiles::DEFAULT, Millis(0))
    }

    fn saved(ledger: &mut TripLedger<MemFs>) -> Option<TripRecord> {
        let fs = ledger.storage_mut()?;
        storage::load(fs, &TripFiles::DEFAULT).ok()
    }

    #[test]
    fn test_trip_always_persistent_only_when_moving() {
        let mut l = ledger();
        l.accumulate(0.01, 0.002, 36.0, Millis(1_000));
        l.accumulate(0.0, 0.0003, 0.0, Millis(2_000));

        let c = l.counters();
        assert!((c.trip_distance_km - 0.01).abs() < 1e-6);
        assert!((c.trip_fuel_l - 0.0023).abs() < 1e-6);
        assert!((c.persistent_distance_km - 0.01).abs() < 1e-6);
        assert!((c.persistent_fuel_l - 0.002).abs() < 1e-6);
    }

    #[test]
    fn test_min_speed_is_inclusive() {
        let mut l = ledger();
        l.accumulate(0.001, 0.001, LedgerConfig::DEFAULT.min_speed_for_persistent_kmh, Millis(1_000));
        assert!(l.counters().persistent_distance_km > 0.0);
    }

    #[test]
    fn test_overflow_resets_both_trip_counters() {
        let mut l = ledger();
        l.counters.trip_fuel_l = f64::from(LedgerConfig::DEFAULT.max_trip_liters) + 1.0;
        l.counters.trip_distance_km = 123.0;
        l.counters.persistent_distance_km = 50.0;

        l.accumulate(0.0, 0.0, 0.0, Millis(1_000));
        assert_eq!(l.counters().trip_fuel_l, 0.0);
        assert_eq!(l.counters().trip_distance_km, 0.0);
        assert_eq!(l.counters().persistent_distance_km, 50.0);
        // Not saved immediately.
        assert_eq!(saved(&mut l), None);
    }

    #[test]
    fn test_persistent_cap_resets_and_saves_within_tick() {
        let mut l = ledger();
        l.counters.persistent_distance_km = f64::from(LedgerConfig::DEFAULT.persistent_reset_km) - 0.001;
        l.counters.persistent_fuel_l = 400.0;
        l.counters.trip_distance_km = 12.0;

        l.accumulate(0.005, 0.001, 80.0, Millis(1_000));
        assert_eq!(l.counters().persistent_distance_km, 0.0);
        assert_eq!(l.counters().persistent_fuel_l, 0.0);

        let on_disk = saved(&mut l).unwrap();
        assert_eq!(on_disk.persistent_distance_km, 0.0);
        assert_eq!(on_disk.persistent_fuel_l, 0.0);
        assert!((on_disk.trip_distance_km - 12.005).abs() < 1e-3);
    }

    #[test]
    fn test_periodic_save_cadence() {
        let interval = LedgerConfig::DEFAULT.save_interval_ms;
        let mut l = ledger();
        l.accumulate(1.0, 0.1, 60.0, Millis(1_000));

        l.save_if_due(Millis(interval - 1));
        assert_eq!(saved(&mut l), None);

        l.save_if_due(Millis(interval));
        assert_eq!(saved(&mut l), Some(*l.counters()));
    }

    #[test]
    fn test_failed_save_counts_and_retries() {
        let interval = LedgerConfig::DEFAULT.save_interval_ms;
        let mut l = ledger();
        if let Some(fs) = l.storage_mut() {
            fs.cut_power_after(0, false);
        }

        l.save_if_due(Millis(interval));
        assert_eq!(l.file_errors(), 1);

        // last_save unchanged: retried on the next tick.
        if let Some(fs) = l.storage_mut() {
            fs.restore_power();
        }
        l.save_if_due(Millis(interval + 1_000));
        assert_eq!(l.file_errors(), 1);
        assert!(saved(&mut l).is_some());
    }

    #[test]
    fn test_load_round_trip() {
        let mut l = ledger();
        l.accumulate(3.2, 0.5, 50.0, Millis(1_000));
        l.save(Millis(2_000)).unwrap();

        let fs = l.storage.take();
        let mut reloaded = TripLedger::new(LedgerConfig::DEFAULT, fs, TripFiles::DEFAULT, Millis(0));
        reloaded.load(Millis(0));
        assert_eq!(reloaded.counters(), l.counters());
        assert_eq!(reloaded.file_errors(), 0);
    }

    #[test]
    fn test_load_malformed_defaults_to_zero() {
        let mut fs = MemFs::new();
        fs.write(TripFiles::DEFAULT.primary, b"0.0\n0.0\n").unwrap();
        fs.write(TripFiles::DEFAULT.temp, b"1.0").unwrap();

        let mut l = TripLedger::new(LedgerConfig::DEFAULT, Some(fs), TripFiles::DEFAULT, Millis(0));
        l.load(Millis(0));
        assert_eq!(*l.counters(), TripRecord::default());
        assert_eq!(l.file_errors(), 1);
        assert!(!l.storage_mut().unwrap().exists(TripFiles::DEFAULT.temp));
    }

    #[test]
    fn test_missing_file_counts_error() {
        let mut l = ledger();
        l.load(Millis(0));
        assert_eq!(l.file_errors(), 1);
    }

    #[test]
    fn test_small_steps_on_large_counters_are_kept() {
        let mut l = ledger();
        l.counters.persistent_distance_km = 4_500.0;
        l.counters.persistent_fuel_l = 350.0;
        l.counters.trip_distance_km = 9_000.0;

        // One hour at walking pace, one tick per second.
        let step_km = 5.0 / 3600.0;
        let step_l = 0.000_2;
        for tick in 0..3600u32 {
            l.accumulate(step_km, step_l, 5.0, Millis(tick * 1_000));
        }

        let c = l.counters();
        assert!((c.persistent_distance_km - 4_505.0).abs() < 1e-3, "{}", c.persistent_distance_km);
        assert!((c.persistent_fuel_l - 350.72).abs() < 1e-4, "{}", c.persistent_fuel_l);
        assert!((c.trip_distance_km - 9_005.0).abs() < 1e-3, "{}", c.trip_distance_km);
    }

    #[test]
    fn test_reset_trip_keeps_persistent() {
        let mut l = ledger();
        l.accumulate(10.0, 1.0, 90.0, Millis(1_000));
        l.reset_trip();
        assert_eq!(l.counters().trip_distance_km, 0.0);
        assert_eq!(l.counters().trip_fuel_l, 0.0);
        assert!((l.counters().persistent_distance_km - 10.0).abs() < 1e-6);
    }
}
