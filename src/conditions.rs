//! Warning condition identities, severities and display sets.
//!
//! Every condition is a variant of the closed [`ErrorKind`] enum. Its display
//! label and severity come from one static table ([`ErrorKind::info`]),
//! matched exhaustively, so adding a variant without a table entry does not
//! compile.

use heapless::Vec;

/// Severity ordinal. `2` is intentionally unused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
#[repr(u8)]
pub enum Severity {
    /// Nothing to report: main screen.
    #[default]
    None = 0,
    /// Shown periodically, silent (low fuel).
    Advisory = 1,
    /// Shown continuously with the audible alarm.
    Critical = 3,
}

/// Every condition the trip computer can display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum ErrorKind {
    /// No condition: the idle entry of a display set.
    None,
    /// Oil pressure below the low-pressure switch point.
    LowOil,
    /// Coolant over-temperature or coolant level low (shared sensor line).
    Overheat,
    /// Brake fluid level low.
    BrakeFluid,
    /// High-pressure switch open above the check RPM.
    OilPressureHigh,
    /// Fuel level latched low.
    LowFuel,
    /// Generic warning decoration appended to critical sets.
    Warning,
}

/// Static description of an [`ErrorKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConditionInfo {
    /// Full-screen label, at most two short lines.
    pub label: &'static str,
    pub sublabel: &'static str,
    pub severity: Severity,
}

impl ErrorKind {
    /// Display and severity table.
    pub const fn info(self) -> ConditionInfo {
        match self {
            Self::None => ConditionInfo {
                label: "",
                sublabel: "",
                severity: Severity::None,
            },
            Self::LowOil => ConditionInfo {
                label: "OIL",
                sublabel: "PRESSURE",
                severity: Severity::Critical,
            },
            Self::Overheat => ConditionInfo {
                label: "ENGINE",
                sublabel: "OVERHEAT",
                severity: Severity::Critical,
            },
            Self::BrakeFluid => ConditionInfo {
                label: "BRAKE",
                sublabel: "FLUID",
                severity: Severity::Critical,
            },
            Self::OilPressureHigh => ConditionInfo {
                label: "OIL 1.8",
                sublabel: "PRESSURE",
                severity: Severity::Critical,
            },
            Self::LowFuel => ConditionInfo {
                label: "LOW",
                sublabel: "FUEL",
                severity: Severity::Advisory,
            },
            Self::Warning => ConditionInfo {
                label: "STOP",
                sublabel: "ENGINE",
                severity: Severity::None,
            },
        }
    }

    #[inline]
    pub const fn severity(self) -> Severity { self.info().severity }

    #[inline]
    pub const fn is_critical(self) -> bool { matches!(self.severity(), Severity::Critical) }
}

/// Longest possible display set: four critical conditions plus the decoration.
pub const MAX_SET_LEN: usize = 5;

/// Ordered, never-empty sequence of conditions cycling on screen.
///
/// The idle set is the single entry [`ErrorKind::None`]; test it with
/// [`ErrorSet::is_idle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorSet {
    kinds: Vec<ErrorKind, MAX_SET_LEN>,
}

impl ErrorSet {
    /// The idle set.
    pub fn idle() -> Self {
        let mut kinds = Vec::new();
        // Capacity is MAX_SET_LEN >= 1.
        let _ = kinds.push(ErrorKind::None);
        Self { kinds }
    }

    /// Set holding only LOW FUEL.
    pub fn low_fuel() -> Self {
        let mut kinds = Vec::new();
        let _ = kinds.push(ErrorKind::LowFuel);
        Self { kinds }
    }

    /// Critical conditions (in order) followed by the WARNING decoration.
    ///
    /// Non-critical kinds are skipped; an input without critical kinds yields
    /// the idle set.
    pub fn critical<I>(conditions: I) -> Self
    where
        I: IntoIterator<Item = ErrorKind>,
    {
        let mut kinds: Vec<ErrorKind, MAX_SET_LEN> = Vec::new();
        for kind in conditions.into_iter().filter(|k| k.is_critical()) {
            // At most four distinct critical kinds exist.
            if kinds.len() < MAX_SET_LEN - 1 && !kinds.contains(&kind) {
                let _ = kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            return Self::idle();
        }
        let _ = kinds.push(ErrorKind::Warning);
        Self { kinds }
    }

    /// Highest severity in the set.
    pub fn severity(&self) -> Severity {
        self.kinds
            .iter()
            .map(|k| k.severity())
            .max()
            .unwrap_or(Severity::None)
    }

    /// True for the idle set.
    #[inline]
    pub fn is_idle(&self) -> bool { matches!(self.kinds.as_slice(), [ErrorKind::None]) }

    /// True for the single LOW FUEL advisory set.
    #[inline]
    pub fn is_low_fuel(&self) -> bool { matches!(self.kinds.as_slice(), [ErrorKind::LowFuel]) }

    /// Entries in the set; never zero.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.kinds.len() }

    #[inline]
    pub fn get(
        &self,
        index: usize,
    ) -> Option<ErrorKind> {
        self.kinds.get(index).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[ErrorKind] { &self.kinds }
}

impl Default for ErrorSet {
    fn default() -> Self { Self::idle() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordinals() {
        assert_eq!(Severity::None as u8, 0);
        assert_eq!(Severity::Advisory as u8, 1);
        assert_eq!(Severity::Critical as u8, 3);
        assert!(Severity::Critical > Severity::Advisory);
        assert!(Severity::Advisory > Severity::None);
    }

    #[test]
    fn test_table_severities() {
        for kind in [
            ErrorKind::LowOil,
            ErrorKind::Overheat,
            ErrorKind::BrakeFluid,
            ErrorKind::OilPressureHigh,
        ] {
            assert!(kind.is_critical());
            assert!(!kind.info().label.is_empty());
        }
        assert_eq!(ErrorKind::LowFuel.severity(), Severity::Advisory);
        assert_eq!(ErrorKind::Warning.severity(), Severity::None);
        assert_eq!(ErrorKind::None.severity(), Severity::None);
    }

    #[test]
    fn test_idle_set() {
        let set = ErrorSet::idle();
        assert!(set.is_idle());
        assert_eq!(set.len(), 1);
        assert_eq!(set.severity(), Severity::None);
        assert_eq!(set, ErrorSet::default());
    }

    #[test]
    fn test_critical_set_appends_warning() {
        let set = ErrorSet::critical([ErrorKind::BrakeFluid, ErrorKind::LowFuel, ErrorKind::LowOil]);
        assert_eq!(
            set.as_slice(),
            &[ErrorKind::BrakeFluid, ErrorKind::LowOil, ErrorKind::Warning]
        );
        assert_eq!(set.severity(), Severity::Critical);
    }

    #[test]
    fn test_critical_set_without_critical_kinds_is_idle() {
        assert!(ErrorSet::critical([ErrorKind::LowFuel]).is_idle());
    }

    #[test]
    fn test_low_fuel_set() {
        let set = ErrorSet::low_fuel();
        assert!(set.is_low_fuel());
        assert_eq!(set.severity(), Severity::Advisory);
    }
}
