//! Error types.
//!
//! Nothing here is fatal: the orchestrator turns storage errors into the
//! file-error counter and tick errors into the fallback screen.

use thiserror::Error;

/// Failures of the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum StorageError {
    #[error("file not found")]
    NotFound,
    #[error("stored data failed its integrity check")]
    Corrupt,
    #[error("no free space")]
    Full,
    #[error("flash operation failed")]
    Flash,
    #[error("record is malformed")]
    Malformed,
}

/// Display driver fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
#[error("display bus fault")]
pub struct DisplayError;

/// Failure of one tick stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum TickError {
    #[error("render failed: {0}")]
    Display(#[from] DisplayError),
    #[error("sensor read failed")]
    Sensor,
}
