//! Simulator configuration.

use crate::memory::DEFAULT_CAPACITY;

/// Default bound for [Cpu::run](crate::cpu::Cpu::run).
pub const DEFAULT_INSTRUCTION_LIMIT: u64 = 10_000;

/// Tunable limits of a [Cpu](crate::cpu::Cpu).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Size of the memory in bytes.
    pub memory_capacity: u64,

    /// Maximum number of instructions a single [run](crate::cpu::Cpu::run) executes before it
    /// gives up. Guards against programs that never terminate.
    pub instruction_limit: u64,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            memory_capacity: DEFAULT_CAPACITY,
            instruction_limit: DEFAULT_INSTRUCTION_LIMIT,
        }
    }
}

impl Config {
    pub fn memory_capacity(mut self, bytes: u64) -> Config {
        self.memory_capacity = bytes;
        self
    }

    pub fn instruction_limit(mut self, limit: u64) -> Config {
        self.instruction_limit = limit;
        self
    }
}
