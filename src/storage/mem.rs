//! In-memory [`FileSystem`] with power-cut injection, for host tests.

use std::collections::BTreeMap;
use std::string::{String, ToString};
use std::vec::Vec;

use super::FileSystem;
use crate::error::StorageError;

#[derive(Debug, Default)]
pub(crate) struct MemFs {
    files: BTreeMap<String, Vec<u8>>,
    /// Operations still allowed before the cut; `None` means powered.
    budget: Option<usize>,
    torn_write: bool,
}

impl MemFs {
    pub(crate) fn new() -> Self { Self::default() }

    /// Let `ops` more operations succeed, then fail everything.
    ///
    /// With `torn_write`, a write hit by the cut stores half its data.
    pub(crate) fn cut_power_after(
        &mut self,
        ops: usize,
        torn_write: bool,
    ) {
        self.budget = Some(ops);
        self.torn_write = torn_write;
    }

    pub(crate) fn restore_power(&mut self) { self.budget = None; }

    pub(crate) fn exists(
        &self,
        name: &str,
    ) -> bool {
        self.files.contains_key(name)
    }

    pub(crate) fn contents(
        &self,
        name: &str,
    ) -> Option<Vec<u8>> {
        self.files.get(name).cloned()
    }

    /// Consume one operation; false once power is gone.
    fn powered(&mut self) -> bool {
        match self.budget.as_mut() {
            None => true,
            Some(0) => false,
            Some(left) => {
                *left -= 1;
                true
            }
        }
    }
}

impl FileSystem for MemFs {
    fn read(
        &mut self,
        name: &str,
        buf: &mut [u8],
    ) -> Result<usize, StorageError> {
        let data = self.files.get(name).ok_or(StorageError::NotFound)?;
        let dst = buf.get_mut(..data.len()).ok_or(StorageError::Full)?;
        dst.copy_from_slice(data);
        Ok(data.len())
    }

    fn write(
        &mut self,
        name: &str,
        data: &[u8],
    ) -> Result<(), StorageError> {
        if !self.powered() {
            if self.torn_write {
                self.files.insert(name.to_string(), data[..data.len() / 2].to_vec());
            }
            return Err(StorageError::Flash);
        }
        self.files.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn remove(
        &mut self,
        name: &str,
    ) -> Result<(), StorageError> {
        if !self.powered() {
            return Err(StorageError::Flash);
        }
        self.files.remove(name).map(|_| ()).ok_or(StorageError::NotFound)
    }

    fn rename(
        &mut self,
        from: &str,
        to: &str,
    ) -> Result<(), StorageError> {
        if !self.powered() {
            return Err(StorageError::Flash);
        }
        let data = self.files.remove(from).ok_or(StorageError::NotFound)?;
        self.files.insert(to.to_string(), data);
        Ok(())
    }
}
