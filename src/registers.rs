//! The integer register file.

use crate::error::ExecutionError;
use crate::instruction::Register;

/// Number of integer registers.
pub const REGISTER_COUNT: usize = 32;

/// Index of the zero register.
pub const ZERO_REGISTER: usize = 31;

/// 32 signed 64-bit registers. Register 31 always reads as zero and ignores writes.
///
/// Every write that changes a value is stamped with an increasing modification counter so that
/// a display can ask which registers were touched most recently.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    values: [i64; REGISTER_COUNT],
    last_modified: [Option<u64>; REGISTER_COUNT],
    modification_counter: u64,
}

impl Default for RegisterFile {
    fn default() -> RegisterFile {
        RegisterFile::new()
    }
}

impl RegisterFile {
    pub fn new() -> RegisterFile {
        RegisterFile {
            values: [0; REGISTER_COUNT],
            last_modified: [None; REGISTER_COUNT],
            modification_counter: 0,
        }
    }

    /// Sets every register to zero and forgets the modification history.
    pub fn reset(&mut self) {
        *self = RegisterFile::new();
    }

    fn check(index: usize) -> Result<(), ExecutionError> {
        if index < REGISTER_COUNT {
            Ok(())
        } else {
            Err(ExecutionError::InvalidRegister { index })
        }
    }

    /// Reads the value of register `index`.
    ///
    /// # Errors
    /// [ExecutionError::InvalidRegister] if `index` is not in `0..=31`.
    pub fn read(&self, index: usize) -> Result<i64, ExecutionError> {
        RegisterFile::check(index)?;
        Ok(self.values[index])
    }

    /// Writes `value` into register `index`.
    ///
    /// Arithmetic results are already wrapped into the signed 64-bit range by the executing
    /// instruction, so the value is stored as is.
    ///
    /// # Returns
    /// `true` if the stored value changed. Writes to the zero register never do.
    ///
    /// # Errors
    /// [ExecutionError::InvalidRegister] if `index` is not in `0..=31`.
    pub fn write(&mut self, index: usize, value: i64) -> Result<bool, ExecutionError> {
        RegisterFile::check(index)?;

        if index == ZERO_REGISTER || self.values[index] == value {
            return Ok(false);
        }

        self.values[index] = value;
        self.modification_counter += 1;
        self.last_modified[index] = Some(self.modification_counter);

        Ok(true)
    }

    /// Value of a register. Cannot fail, as a [Register] is always in range.
    pub fn get(&self, register: Register) -> i64 {
        self.values[register.index()]
    }

    /// Copy of every register value, indexed by register number.
    pub fn all(&self) -> [i64; REGISTER_COUNT] {
        self.values
    }

    /// Returns up to `count` register numbers, the most recently modified first.
    pub fn get_recently_modified(&self, count: usize) -> Vec<usize> {
        let mut modified = self.last_modified.iter()
            .enumerate()
            .filter_map(|(index, stamp)| stamp.map(|stamp| (index, stamp)))
            .collect::<Vec<_>>();

        modified.sort_by(|a, b| b.1.cmp(&a.1));

        modified.into_iter()
            .take(count)
            .map(|(index, _)| index)
            .collect()
    }

    /// Returns true if register `index` was among the last `within` modifications.
    pub fn was_recently_modified(&self, index: usize, within: u64) -> bool {
        match self.last_modified.get(index).copied().flatten() {
            Some(stamp) => self.modification_counter - stamp < within,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_register() {
        let mut registers = RegisterFile::new();

        assert_eq!(registers.write(ZERO_REGISTER, 1234), Ok(false));
        assert_eq!(registers.read(ZERO_REGISTER), Ok(0));
        assert_eq!(registers.write(ZERO_REGISTER, -1), Ok(false));
        assert_eq!(registers.read(ZERO_REGISTER), Ok(0));
    }

    #[test]
    fn test_write_reports_changes() {
        let mut registers = RegisterFile::new();

        assert_eq!(registers.write(3, 30), Ok(true));
        assert_eq!(registers.write(3, 30), Ok(false));
        assert_eq!(registers.write(3, 0), Ok(true));
        assert_eq!(registers.write(4, 0), Ok(false));
    }

    #[test]
    fn test_write_read_extremes() {
        let mut registers = RegisterFile::new();

        for &value in &[i64::MIN, -1, 0, 1, i64::MAX] {
            for index in 0..ZERO_REGISTER {
                registers.write(index, value).unwrap();
                assert_eq!(registers.read(index), Ok(value));
            }
        }
    }

    #[test]
    fn test_invalid_register() {
        let mut registers = RegisterFile::new();

        assert_eq!(registers.read(32), Err(ExecutionError::InvalidRegister { index: 32 }));
        assert_eq!(registers.write(99, 1), Err(ExecutionError::InvalidRegister { index: 99 }));
    }

    #[test]
    fn test_recently_modified() {
        let mut registers = RegisterFile::new();

        registers.write(1, 10).unwrap();
        registers.write(2, 20).unwrap();
        registers.write(5, 50).unwrap();
        registers.write(1, 11).unwrap();

        assert_eq!(registers.get_recently_modified(2), vec![1, 5]);
        assert_eq!(registers.get_recently_modified(10), vec![1, 5, 2]);

        assert!(registers.was_recently_modified(1, 1));
        assert!(!registers.was_recently_modified(2, 2));
        assert!(registers.was_recently_modified(2, 3));
        assert!(!registers.was_recently_modified(7, 100));

        registers.reset();
        assert!(registers.get_recently_modified(5).is_empty());
        assert_eq!(registers.read(1), Ok(0));
    }

    #[test]
    fn test_get() {
        let mut registers = RegisterFile::new();

        registers.write(Register::LR.index(), 64).unwrap();

        assert_eq!(registers.get(Register::LR), 64);
        assert_eq!(registers.get(Register::XZR), 0);
    }
}
