//! Power-cut safe file store on raw NOR flash.
//!
//! # Layout
//!
//! ```text
//! sector 0, 1     directory log (ping-pong)
//! sector 2..n     data slots, one file per sector
//! ```
//!
//! A directory record maps up to [`MAX_FILES`] names to data slots and carries
//! a sequence number and CRC. Records are appended to the active directory
//! sector; when it is full the other sector is erased and the log continues
//! there. On mount the valid record with the newest sequence number wins, so a
//! torn append simply falls back to the previous directory.
//!
//! Every mutation ends with a single directory append:
//!
//! - `write` programs a slot the current directory does not reference, then
//!   commits a directory pointing the name at it
//! - `rename` and `remove` only commit a new directory
//!
//! A file is therefore either fully present with its old content, fully
//! present with its new content, or absent. Data slots are framed as
//! `len: u32 | crc32: u32 | payload`.

use crate::error::StorageError;
use crate::storage::FileSystem;

/// Raw erase/program/read access to a flash window.
///
/// Offsets are relative to the start of the window. Programming may only clear
/// bits; erasing a sector sets all its bytes to `0xFF`.
pub trait FlashRegion {
    /// Erase unit in bytes.
    fn sector_size(&self) -> usize;

    fn sector_count(&self) -> usize;

    fn read(
        &mut self,
        offset: usize,
        buf: &mut [u8],
    ) -> Result<(), StorageError>;

    fn erase(
        &mut self,
        sector: usize,
    ) -> Result<(), StorageError>;

    fn program(
        &mut self,
        offset: usize,
        data: &[u8],
    ) -> Result<(), StorageError>;
}

// ============================================================================
// Directory Record
// ============================================================================

const DIR_MAGIC: u32 = 0x5452_4950;
const DIR_SECTORS: usize = 2;
const NAME_LEN: usize = 12;
const ENTRY_LEN: usize = NAME_LEN + 4;
const NO_SLOT: u16 = 0xFFFF;
const DATA_HEADER_LEN: usize = 8;

/// Files a directory can hold.
pub const MAX_FILES: usize = 4;

const DIR_BODY_LEN: usize = 8 + MAX_FILES * ENTRY_LEN;
const DIR_LEN: usize = DIR_BODY_LEN + 4;

/// Smallest usable region: both directory sectors plus one spare data slot.
pub const MIN_SECTORS: usize = DIR_SECTORS + MAX_FILES + 1;

type Name = [u8; NAME_LEN];

fn encode_name(name: &str) -> Result<Name, StorageError> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > NAME_LEN || bytes.contains(&0) {
        return Err(StorageError::Malformed);
    }
    let mut out = [0u8; NAME_LEN];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    name: Name,
    slot: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Directory {
    seq: u32,
    entries: [Option<Entry>; MAX_FILES],
}

impl Directory {
    const EMPTY: Self = Self {
        seq: 0,
        entries: [None; MAX_FILES],
    };

    fn find(
        &self,
        name: &Name,
    ) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.is_some_and(|e| &e.name == name))
    }

    fn references(
        &self,
        slot: usize,
    ) -> bool {
        self.entries
            .iter()
            .flatten()
            .any(|e| e.slot as usize == slot)
    }

    fn encode(&self) -> [u8; DIR_LEN] {
        let mut out = [0u8; DIR_LEN];
        out[0..4].copy_from_slice(&DIR_MAGIC.to_le_bytes());
        out[4..8].copy_from_slice(&self.seq.to_le_bytes());
        for (i, entry) in self.entries.iter().enumerate() {
            let at = 8 + i * ENTRY_LEN;
            let (name, slot) = match entry {
                Some(e) => (e.name, e.slot),
                None => ([0u8; NAME_LEN], NO_SLOT),
            };
            out[at..at + NAME_LEN].copy_from_slice(&name);
            out[at + NAME_LEN..at + NAME_LEN + 2].copy_from_slice(&slot.to_le_bytes());
            out[at + NAME_LEN + 2..at + ENTRY_LEN].copy_from_slice(&[0xFF, 0xFF]);
        }
        let crc = crc32fast::hash(&out[..DIR_BODY_LEN]);
        out[DIR_BODY_LEN..].copy_from_slice(&crc.to_le_bytes());
        out
    }

    fn decode(bytes: &[u8; DIR_LEN]) -> Option<Self> {
        let word = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        if word(0) != DIR_MAGIC || word(DIR_BODY_LEN) != crc32fast::hash(&bytes[..DIR_BODY_LEN]) {
            return None;
        }

        let mut entries = [None; MAX_FILES];
        for (i, entry) in entries.iter_mut().enumerate() {
            let at = 8 + i * ENTRY_LEN;
            let slot = u16::from_le_bytes([bytes[at + NAME_LEN], bytes[at + NAME_LEN + 1]]);
            if slot != NO_SLOT {
                let mut name = [0u8; NAME_LEN];
                name.copy_from_slice(&bytes[at..at + NAME_LEN]);
                *entry = Some(Entry { name, slot });
            }
        }
        Some(Self {
            seq: word(4),
            entries,
        })
    }
}

/// Sequence comparison tolerant of wraparound.
#[inline]
fn is_newer(
    a: u32,
    b: u32,
) -> bool {
    (a.wrapping_sub(b) as i32) > 0
}

// ============================================================================
// File System
// ============================================================================

/// [`FileSystem`] over a [`FlashRegion`].
pub struct FlashFs<R> {
    region: R,
    dir: Directory,
    /// Directory sector currently appended to.
    active: usize,
    /// Next free record index in the active sector.
    next_record: usize,
}

impl<R: FlashRegion> FlashFs<R> {
    /// Mount the newest valid directory, or start empty on blank flash.
    pub fn mount(mut region: R) -> Result<Self, StorageError> {
        let sector_size = region.sector_size();
        if region.sector_count() < MIN_SECTORS || sector_size < DIR_LEN || sector_size <= DATA_HEADER_LEN {
            return Err(StorageError::Full);
        }

        let per_sector = sector_size / DIR_LEN;
        let mut best: Option<(Directory, usize)> = None;
        let mut free_at = [per_sector; DIR_SECTORS];

        for (sector, free) in free_at.iter_mut().enumerate() {
            for index in 0..per_sector {
                let mut raw = [0u8; DIR_LEN];
                region.read(sector * sector_size + index * DIR_LEN, &mut raw)?;
                if raw.iter().all(|&b| b == 0xFF) {
                    *free = index;
                    break;
                }
                let Some(dir) = Directory::decode(&raw) else {
                    continue;
                };
                if best.as_ref().is_none_or(|(b, _)| is_newer(dir.seq, b.seq)) {
                    best = Some((dir, sector));
                }
            }
        }

        let (dir, active) = match best {
            Some((dir, sector)) => {
                debug!("Mounted directory seq {} from sector {}", dir.seq, sector);
                (dir, sector)
            }
            None => {
                info!("No valid directory, starting empty");
                (Directory::EMPTY, 0)
            }
        };

        Ok(Self {
            region,
            dir,
            active,
            next_record: free_at[active],
        })
    }

    /// Give back the underlying region.
    pub fn into_inner(self) -> R { self.region }

    fn records_per_sector(&self) -> usize { self.region.sector_size() / DIR_LEN }

    fn payload_capacity(&self) -> usize { self.region.sector_size() - DATA_HEADER_LEN }

    /// Append `dir` to the log with the next sequence number.
    fn commit(
        &mut self,
        mut dir: Directory,
    ) -> Result<(), StorageError> {
        dir.seq = self.dir.seq.wrapping_add(1);
        let bytes = dir.encode();
        let sector_size = self.region.sector_size();

        if self.next_record >= self.records_per_sector() {
            let target = (self.active + 1) % DIR_SECTORS;
            self.region.erase(target)?;
            self.active = target;
            self.next_record = 0;
        }

        let offset = self.active * sector_size + self.next_record * DIR_LEN;
        // Consumed even on failure: the record may be partially programmed.
        self.next_record += 1;
        self.region.program(offset, &bytes)?;
        self.dir = dir;
        Ok(())
    }

    fn entry(
        &self,
        name: &str,
    ) -> Result<(usize, Entry), StorageError> {
        let key = encode_name(name)?;
        let index = self.dir.find(&key).ok_or(StorageError::NotFound)?;
        let entry = self.dir.entries[index].ok_or(StorageError::NotFound)?;
        Ok((index, entry))
    }
}

impl<R: FlashRegion> FileSystem for FlashFs<R> {
    fn read(
        &mut self,
        name: &str,
        buf: &mut [u8],
    ) -> Result<usize, StorageError> {
        let (_, entry) = self.entry(name)?;
        let base = entry.slot as usize * self.region.sector_size();

        let mut header = [0u8; DATA_HEADER_LEN];
        self.region.read(base, &mut header)?;
        let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if len > self.payload_capacity() {
            return Err(StorageError::Corrupt);
        }

        let dst = buf.get_mut(..len).ok_or(StorageError::Full)?;
        self.region.read(base + DATA_HEADER_LEN, dst)?;
        if crc32fast::hash(dst) != crc {
            return Err(StorageError::Corrupt);
        }
        Ok(len)
    }

    fn write(
        &mut self,
        name: &str,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let key = encode_name(name)?;
        if data.len() > self.payload_capacity() {
            return Err(StorageError::Full);
        }

        let mut dir = self.dir.clone();
        let index = dir
            .find(&key)
            .or_else(|| dir.entries.iter().position(Option::is_none))
            .ok_or(StorageError::Full)?;
        let slot = (DIR_SECTORS..self.region.sector_count())
            .find(|&s| !self.dir.references(s))
            .ok_or(StorageError::Full)?;

        let base = slot * self.region.sector_size();
        let mut header = [0u8; DATA_HEADER_LEN];
        header[..4].copy_from_slice(&(data.len() as u32).to_le_bytes());
        header[4..].copy_from_slice(&crc32fast::hash(data).to_le_bytes());

        self.region.erase(slot)?;
        self.region.program(base, &header)?;
        if !data.is_empty() {
            self.region.program(base + DATA_HEADER_LEN, data)?;
        }

        dir.entries[index] = Some(Entry {
            name: key,
            slot: slot as u16,
        });
        self.commit(dir)
    }

    fn remove(
        &mut self,
        name: &str,
    ) -> Result<(), StorageError> {
        let (index, _) = self.entry(name)?;
        let mut dir = self.dir.clone();
        dir.entries[index] = None;
        self.commit(dir)
    }

    fn rename(
        &mut self,
        from: &str,
        to: &str,
    ) -> Result<(), StorageError> {
        let (from_index, entry) = self.entry(from)?;
        let target = encode_name(to)?;

        let mut dir = self.dir.clone();
        if let Some(existing) = dir.find(&target) {
            dir.entries[existing] = None;
        }
        dir.entries[from_index] = Some(Entry { name: target, ..entry });
        self.commit(dir)
    }
}
