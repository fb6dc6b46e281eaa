//! Byte-addressable, sparse [Memory].

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::error::ExecutionError;

/// Default capacity of the memory, 1 MiB.
pub const DEFAULT_CAPACITY: u64 = 1024 * 1024;

/// Number of entries kept in the access log.
const ACCESS_LOG_LENGTH: usize = 256;

/// Kind of a memory access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
        }
    }
}

/// A logged memory access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AccessRecord {
    pub address: u64,
    pub access: Access,
    /// Number of bytes accessed.
    pub width: u64,
}

/// Sparse byte store bounded by a fixed capacity.
///
/// Bytes that were never written read as zero. Words (4 bytes) and doublewords (8 bytes) are
/// little-endian and must be aligned to their size.
#[derive(Debug, Clone)]
pub struct Memory {
    capacity: u64,
    bytes: BTreeMap<u64, u8>,
    accesses: VecDeque<AccessRecord>,
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new(DEFAULT_CAPACITY)
    }
}

impl Memory {
    /// Creates an empty memory of `capacity` bytes.
    pub fn new(capacity: u64) -> Memory {
        Memory {
            capacity,
            bytes: BTreeMap::new(),
            accesses: VecDeque::with_capacity(ACCESS_LOG_LENGTH),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Forgets every stored byte and the access log.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.accesses.clear();
    }

    /// Checks that the `width` bytes starting at `address` are aligned and in bounds.
    fn check(&self, address: u64, width: u64) -> Result<(), ExecutionError> {
        if address % width != 0 {
            return Err(ExecutionError::MisalignedAccess { address, alignment: width });
        }

        match address.checked_add(width) {
            Some(end) if end <= self.capacity => Ok(()),
            _ => Err(ExecutionError::OutOfBounds { address }),
        }
    }

    fn log(&mut self, address: u64, access: Access, width: u64) {
        if self.accesses.len() == ACCESS_LOG_LENGTH {
            self.accesses.pop_front();
        }

        self.accesses.push_back(AccessRecord { address, access, width });
    }

    fn load(&self, address: u64, width: u64) -> u64 {
        (0..width).fold(0, |value, i| {
            let byte = self.bytes.get(&(address + i)).copied().unwrap_or(0);
            value | (byte as u64) << (i * 8)
        })
    }

    fn store(&mut self, address: u64, width: u64, value: u64) {
        for i in 0..width {
            self.bytes.insert(address + i, (value >> (i * 8)) as u8);
        }
    }

    pub fn read_byte(&mut self, address: u64) -> Result<u8, ExecutionError> {
        self.check(address, 1)?;
        self.log(address, Access::Read, 1);
        Ok(self.load(address, 1) as u8)
    }

    pub fn write_byte(&mut self, address: u64, value: u8) -> Result<(), ExecutionError> {
        self.check(address, 1)?;
        self.log(address, Access::Write, 1);
        self.store(address, 1, value as u64);
        Ok(())
    }

    /// Reads a 4-byte aligned, little-endian word.
    pub fn read_word(&mut self, address: u64) -> Result<i32, ExecutionError> {
        self.check(address, 4)?;
        self.log(address, Access::Read, 4);
        Ok(self.load(address, 4) as u32 as i32)
    }

    /// Writes the low 32 bits of `value` as a 4-byte aligned, little-endian word.
    pub fn write_word(&mut self, address: u64, value: i64) -> Result<(), ExecutionError> {
        self.check(address, 4)?;
        self.log(address, Access::Write, 4);
        self.store(address, 4, value as u32 as u64);
        Ok(())
    }

    /// Reads an 8-byte aligned, little-endian doubleword.
    pub fn read_doubleword(&mut self, address: u64) -> Result<i64, ExecutionError> {
        self.check(address, 8)?;
        self.log(address, Access::Read, 8);
        Ok(self.load(address, 8) as i64)
    }

    /// Writes `value` as an 8-byte aligned, little-endian doubleword.
    pub fn write_doubleword(&mut self, address: u64, value: i64) -> Result<(), ExecutionError> {
        self.check(address, 8)?;
        self.log(address, Access::Write, 8);
        self.store(address, 8, value as u64);
        Ok(())
    }

    /// Every address that has ever been written, in ascending order.
    pub fn get_used_addresses(&self) -> Vec<u64> {
        self.bytes.keys().copied().collect()
    }

    /// The last `count` accesses, oldest first.
    pub fn get_recent_accesses(&self, count: usize) -> Vec<AccessRecord> {
        let skip = self.accesses.len().saturating_sub(count);
        self.accesses.iter().skip(skip).copied().collect()
    }

    /// Words of the range `start..start + len` that contain at least one written byte, keyed by
    /// their 4-aligned address. Does not count as an access.
    pub fn dump(&self, start: u64, len: u64) -> BTreeMap<u64, i32> {
        let first = start - start % 4;
        let end = start.saturating_add(len).min(self.capacity);

        (first..end)
            .step_by(4)
            .filter(|address| {
                self.bytes.range(*address..address.saturating_add(4)).next().is_some()
            })
            .map(|address| (address, self.load(address, 4) as u32 as i32))
            .collect()
    }
}
