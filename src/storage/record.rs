//! Text encoding of the trip counters.
//!
//! Four newline-terminated decimal fields, in this order:
//!
//! ```text
//! persistent_fuel_l
//! persistent_distance_km
//! trip_fuel_l
//! trip_distance_km
//! ```

use core::fmt::Write;

use heapless::String;

use crate::error::StorageError;

/// Upper bound of an encoded record. Each finite `f64` prints in at most
/// 326 chars (`-f64::MAX` in plain decimal notation).
pub const MAX_RECORD_LEN: usize = 4 * 328;

/// The four persisted counters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct TripRecord {
    pub persistent_fuel_l: f64,
    pub persistent_distance_km: f64,
    pub trip_fuel_l: f64,
    pub trip_distance_km: f64,
}

impl TripRecord {
    fn fields(&self) -> [f64; 4] {
        [
            self.persistent_fuel_l,
            self.persistent_distance_km,
            self.trip_fuel_l,
            self.trip_distance_km,
        ]
    }

    pub fn encode(&self) -> Result<String<MAX_RECORD_LEN>, StorageError> {
        let mut out = String::new();
        for value in self.fields() {
            writeln!(out, "{value}").map_err(|_| StorageError::Malformed)?;
        }
        Ok(out)
    }

    /// Parse a record. Extra trailing lines are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let text = core::str::from_utf8(bytes).map_err(|_| StorageError::Malformed)?;
        let mut lines = text.lines().map(str::trim);
        let mut fields = [0.0f64; 4];
        for field in &mut fields {
            let line = lines.next().ok_or(StorageError::Malformed)?;
            let value: f64 = line.parse().map_err(|_| StorageError::Malformed)?;
            if !value.is_finite() {
                return Err(StorageError::Malformed);
            }
            *field = value;
        }
        let [persistent_fuel_l, persistent_distance_km, trip_fuel_l, trip_distance_km] = fields;
        Ok(Self {
            persistent_fuel_l,
            persistent_distance_km,
            trip_fuel_l,
            trip_distance_km,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let record = TripRecord {
            persistent_fuel_l: 1.23,
            persistent_distance_km: 45.6,
            trip_fuel_l: 0.5,
            trip_distance_km: 3.2,
        };
        assert_eq!(record.encode().unwrap().as_str(), "1.23\n45.6\n0.5\n3.2\n");
        assert_eq!(TripRecord::decode(b"1.23\n45.6\n0.5\n3.2\n").unwrap(), record);
    }

    #[test]
    fn test_encode_extremes_fit() {
        let record = TripRecord {
            persistent_fuel_l: f64::MAX,
            persistent_distance_km: -f64::MAX,
            trip_fuel_l: f64::MIN_POSITIVE,
            trip_distance_km: 9999.999,
        };
        assert!(record.encode().is_ok());
    }

    #[test]
    fn test_encode_keeps_full_precision() {
        let record = TripRecord {
            persistent_fuel_l: 350.123_456_789,
            persistent_distance_km: 4_999.998_611_111,
            trip_fuel_l: 0.000_2,
            trip_distance_km: 9_000.001_388_888_9,
        };
        let encoded = record.encode().unwrap();
        assert_eq!(TripRecord::decode(encoded.as_bytes()).unwrap(), record);
    }

    #[test]
    fn test_decode_tolerates_crlf_and_whitespace() {
        let record = TripRecord::decode(b" 10.5\r\n200\r\n1\r\n2.5 \r\n").unwrap();
        assert_eq!(record.persistent_distance_km, 200.0);
        assert_eq!(record.trip_distance_km, 2.5);
    }

    #[test]
    fn test_decode_rejects_short_record() {
        // Older two-line layout.
        assert_eq!(TripRecord::decode(b"0.0\n0.0\n"), Err(StorageError::Malformed));
        assert_eq!(TripRecord::decode(b""), Err(StorageError::Malformed));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(TripRecord::decode(b"1.0\nabc\n2.0\n3.0\n"), Err(StorageError::Malformed));
        assert_eq!(TripRecord::decode(b"1.0\nNaN\n2.0\n3.0\n"), Err(StorageError::Malformed));
        assert_eq!(TripRecord::decode(&[0xFF, 0xFE, b'\n']), Err(StorageError::Malformed));
    }
}
