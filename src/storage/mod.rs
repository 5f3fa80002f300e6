//! Persistence of the trip counters.
//!
//! # Atomic Replace
//!
//! A save never overwrites the primary file in place:
//!
//! 1. Write the new record to the temporary file
//! 2. Remove the stale backup (absence is fine)
//! 3. Rename primary to backup (absence is fine on first run)
//! 4. Rename temporary to primary
//!
//! A power cut at any point leaves either the new record as primary, or the
//! previous record as primary or backup. The primary file is never partially
//! written. Loading never repairs from the backup; a missing or malformed
//! primary reads as all-zero counters and is reported as an error.
//!
//! Leftover temporary files from an interrupted save are removed at startup.

pub mod flash;
pub mod record;

#[cfg(test)]
pub(crate) mod mem;

pub use flash::{FlashFs, FlashRegion};
pub use record::{MAX_RECORD_LEN, TripRecord};

use crate::config::{TRIP_DATA_BACKUP, TRIP_DATA_FILE, TRIP_DATA_TEMP};
use crate::error::StorageError;

/// Minimal flat file store.
///
/// `rename` replaces an existing target.
pub trait FileSystem {
    /// Read `name` into `buf`, returning the file length.
    fn read(
        &mut self,
        name: &str,
        buf: &mut [u8],
    ) -> Result<usize, StorageError>;

    /// Create or replace `name`.
    fn write(
        &mut self,
        name: &str,
        data: &[u8],
    ) -> Result<(), StorageError>;

    fn remove(
        &mut self,
        name: &str,
    ) -> Result<(), StorageError>;

    fn rename(
        &mut self,
        from: &str,
        to: &str,
    ) -> Result<(), StorageError>;
}

/// File names used by the replace protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TripFiles {
    pub primary: &'static str,
    pub temp: &'static str,
    pub backup: &'static str,
}

impl TripFiles {
    pub const DEFAULT: Self = Self {
        primary: TRIP_DATA_FILE,
        temp: TRIP_DATA_TEMP,
        backup: TRIP_DATA_BACKUP,
    };
}

impl Default for TripFiles {
    fn default() -> Self { Self::DEFAULT }
}

fn ignore_missing(result: Result<(), StorageError>) -> Result<(), StorageError> {
    match result {
        Err(StorageError::NotFound) => Ok(()),
        other => other,
    }
}

/// Persist `record` with the atomic replace sequence.
pub fn save<F: FileSystem>(
    fs: &mut F,
    files: &TripFiles,
    record: &TripRecord,
) -> Result<(), StorageError> {
    let encoded = record.encode()?;
    fs.write(files.temp, encoded.as_bytes())?;
    ignore_missing(fs.remove(files.backup))?;
    ignore_missing(fs.rename(files.primary, files.backup))?;
    fs.rename(files.temp, files.primary)
}

/// Read the primary record.
pub fn load<F: FileSystem>(
    fs: &mut F,
    files: &TripFiles,
) -> Result<TripRecord, StorageError> {
    let mut buf = [0u8; MAX_RECORD_LEN];
    let len = fs.read(files.primary, &mut buf)?;
    let bytes = buf.get(..len).ok_or(StorageError::Malformed)?;
    TripRecord::decode(bytes)
}

/// Best-effort removal of a temporary file left by an interrupted save.
pub fn remove_stale_temp<F: FileSystem>(
    fs: &mut F,
    files: &TripFiles,
) {
    match fs.remove(files.temp) {
        Ok(()) => info!("Removed stale temp file"),
        Err(StorageError::NotFound) => {}
        Err(e) => warn!("Temp file cleanup failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::mem::MemFs;
    use super::*;

    const NEW: TripRecord = TripRecord {
        persistent_fuel_l: 1.23,
        persistent_distance_km: 45.6,
        trip_fuel_l: 0.5,
        trip_distance_km: 3.2,
    };

    const PRIOR: TripRecord = TripRecord {
        persistent_fuel_l: 1.0,
        persistent_distance_km: 40.0,
        trip_fuel_l: 0.25,
        trip_distance_km: 2.0,
    };

    fn decode_file(
        fs: &mut MemFs,
        name: &str,
    ) -> Option<TripRecord> {
        let data = fs.contents(name)?;
        Some(TripRecord::decode(&data).expect("file must never be half-written"))
    }

    #[test]
    fn test_first_save_and_load() {
        let mut fs = MemFs::new();
        let files = TripFiles::DEFAULT;
        assert_eq!(load(&mut fs, &files), Err(StorageError::NotFound));

        save(&mut fs, &files, &NEW).unwrap();
        assert_eq!(load(&mut fs, &files).unwrap(), NEW);
        assert!(!fs.exists(files.temp));
        assert!(!fs.exists(files.backup));
    }

    #[test]
    fn test_second_save_rotates_backup() {
        let mut fs = MemFs::new();
        let files = TripFiles::DEFAULT;
        save(&mut fs, &files, &PRIOR).unwrap();
        save(&mut fs, &files, &NEW).unwrap();

        assert_eq!(load(&mut fs, &files).unwrap(), NEW);
        assert_eq!(decode_file(&mut fs, files.backup), Some(PRIOR));
    }

    #[test]
    fn test_power_cut_at_every_step_never_tears_primary() {
        let files = TripFiles::DEFAULT;

        // Operations of a save: write temp, remove backup, two renames.
        for ops_before_cut in 0..=4 {
            for torn_write in [false, true] {
                let mut fs = MemFs::new();
                save(&mut fs, &files, &PRIOR).unwrap();
                save(&mut fs, &files, &PRIOR).unwrap();

                fs.cut_power_after(ops_before_cut, torn_write);
                let result = save(&mut fs, &files, &NEW);
                assert_eq!(result.is_ok(), ops_before_cut == 4);
                fs.restore_power();

                remove_stale_temp(&mut fs, &files);
                assert!(!fs.exists(files.temp));

                match decode_file(&mut fs, files.primary) {
                    Some(record) => assert!(record == NEW || record == PRIOR),
                    // Cut between the renames: prior values survive as backup.
                    None => assert_eq!(decode_file(&mut fs, files.backup), Some(PRIOR)),
                }
            }
        }
    }

    #[test]
    fn test_load_does_not_repair_from_backup() {
        let mut fs = MemFs::new();
        let files = TripFiles::DEFAULT;
        save(&mut fs, &files, &PRIOR).unwrap();
        save(&mut fs, &files, &NEW).unwrap();
        fs.write(files.primary, b"garbage").unwrap();

        assert_eq!(load(&mut fs, &files), Err(StorageError::Malformed));
        assert_eq!(decode_file(&mut fs, files.backup), Some(PRIOR));
    }

    #[test]
    fn test_stale_temp_removed_quietly_when_absent() {
        let mut fs = MemFs::new();
        remove_stale_temp(&mut fs, &TripFiles::DEFAULT);
        fs.write(TRIP_DATA_TEMP, b"1.0\n").unwrap();
        remove_stale_temp(&mut fs, &TripFiles::DEFAULT);
        assert!(!fs.exists(TRIP_DATA_TEMP));
    }
}
