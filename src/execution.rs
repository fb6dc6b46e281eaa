//! Execution semantics of the [Instructions](Instruction).
//!
//! Executing an instruction changes the state of the [Cpu] directly, but does not touch the
//! program counter unless the instruction jumps, nor the instruction counters. Those are the
//! responsibility of [Cpu::step].

use crate::cpu::Cpu;
use crate::error::ExecutionError;
use crate::instruction::{
    BranchTarget,
    ImmediateOpCode,
    Instruction,
    Operation,
    Register,
    RegisterOpCode,
    TransferOpCode,
    ZeroTest,
};
use crate::memory::Access;

/// A memory location touched by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryChange {
    pub address: u64,
    pub access: Access,

    /// The value read, or the value written after masking it to the width of the store.
    pub value: i64,
}

/// Side effects of a single executed instruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effects {
    /// True if the instruction wrote the program counter.
    pub pc_modified: bool,

    /// Registers whose value changed, in the order they were written.
    pub register_changes: Vec<Register>,

    pub memory_changes: Vec<MemoryChange>,
}

fn shift_left(value: i64, amount: i64) -> i64 {
    ((value as u64) << (amount & 63)) as i64
}

fn shift_right(value: i64, amount: i64) -> i64 {
    ((value as u64) >> (amount & 63)) as i64
}

/// Helper for executing a single instruction on a [Cpu].
struct ExecutionContext<'c, 'i> {
    /// The CPU whose state the instruction changes.
    cpu: &'c mut Cpu,

    /// The instruction that we are currently executing.
    instruction: &'i Instruction,

    effects: Effects,
}

impl<'c, 'i> ExecutionContext<'c, 'i> {
    fn read(&self, register: Register) -> Result<i64, ExecutionError> {
        self.cpu.registers.read(register.index())
    }

    fn write(&mut self, register: Register, value: i64) -> Result<(), ExecutionError> {
        if self.cpu.registers.write(register.index(), value)? {
            self.effects.register_changes.push(register);
        }

        Ok(())
    }

    fn record(&mut self, address: u64, access: Access, value: i64) {
        self.effects.memory_changes.push(MemoryChange { address, access, value });
    }

    fn jump(&mut self, address: u64) {
        self.cpu.pc = address;
        self.effects.pc_modified = true;
    }

    /// Address of a branch target.
    ///
    /// # Errors
    /// [ExecutionError::UnresolvedBranchTarget] if the assembler did not resolve the target.
    fn target(target: &BranchTarget) -> Result<u64, ExecutionError> {
        target.address().ok_or_else(|| ExecutionError::UnresolvedBranchTarget {
            label: target.label().to_string(),
        })
    }

    fn register_operation(&self, opcode: RegisterOpCode, rn: Register, rm: Register)
        -> Result<i64, ExecutionError>
    {
        let a = self.read(rn)?;
        let b = self.read(rm)?;

        let result = match opcode {
            RegisterOpCode::Add | RegisterOpCode::AddS => a.wrapping_add(b),
            RegisterOpCode::Sub | RegisterOpCode::SubS => a.wrapping_sub(b),
            RegisterOpCode::And => a & b,
            RegisterOpCode::Orr => a | b,
            RegisterOpCode::Eor => a ^ b,
            RegisterOpCode::Mul => a.wrapping_mul(b),
            RegisterOpCode::SDiv if b == 0 => return Err(ExecutionError::DivisionByZero),
            RegisterOpCode::SDiv => a.wrapping_div(b),
            RegisterOpCode::UDiv if b == 0 => return Err(ExecutionError::DivisionByZero),
            RegisterOpCode::UDiv => ((a as u64) / (b as u64)) as i64,
            RegisterOpCode::Lsl => shift_left(a, b),
            RegisterOpCode::Lsr => shift_right(a, b),
        };

        Ok(result)
    }

    fn immediate_operation(
        &self,
        opcode: ImmediateOpCode,
        rd: Register,
        rn: Register,
        immediate: i64,
        shift: u32,
    ) -> Result<i64, ExecutionError> {
        let result = match opcode {
            ImmediateOpCode::AddI | ImmediateOpCode::AddIS =>
                self.read(rn)?.wrapping_add(immediate),
            ImmediateOpCode::SubI | ImmediateOpCode::SubIS =>
                self.read(rn)?.wrapping_sub(immediate),
            ImmediateOpCode::AndI => self.read(rn)? & immediate,
            ImmediateOpCode::OrrI => self.read(rn)? | immediate,
            ImmediateOpCode::EorI => self.read(rn)? ^ immediate,
            ImmediateOpCode::Lsl => shift_left(self.read(rn)?, immediate),
            ImmediateOpCode::Lsr => shift_right(self.read(rn)?, immediate),
            // Negative immediates are sign-extended and never shifted.
            ImmediateOpCode::MovZ if immediate < 0 => immediate,
            ImmediateOpCode::MovZ => shift_left(immediate & 0xFFFF, shift as i64),
            ImmediateOpCode::MovK => {
                let mask = shift_left(0xFFFF, shift as i64);
                let field = shift_left(immediate, shift as i64) & mask;

                (self.read(rd)? & !mask) | field
            },
        };

        Ok(result)
    }

    fn transfer(&mut self, opcode: TransferOpCode, rt: Register, rn: Register, offset: i64)
        -> Result<(), ExecutionError>
    {
        let address = self.read(rn)?.wrapping_add(offset) as u64;

        if opcode.is_load() {
            let value = match opcode {
                TransferOpCode::LdurW => self.cpu.memory.read_word(address)? as i64,
                TransferOpCode::LdurB => self.cpu.memory.read_byte(address)? as i64,
                _ => self.cpu.memory.read_doubleword(address)?,
            };

            self.write(rt, value)?;
            self.record(address, Access::Read, value);
        } else {
            let value = self.read(rt)?;

            let stored = match opcode {
                TransferOpCode::SturW => {
                    let value = value & 0xFFFF_FFFF;
                    self.cpu.memory.write_word(address, value)?;
                    value
                },
                TransferOpCode::SturB => {
                    let value = value & 0xFF;
                    self.cpu.memory.write_byte(address, value as u8)?;
                    value
                },
                _ => {
                    self.cpu.memory.write_doubleword(address, value)?;
                    value
                },
            };

            self.record(address, Access::Write, stored);
        }

        Ok(())
    }

    /// Execute the instruction.
    ///
    /// Every error is raised before the first change to the CPU state, so a failed instruction
    /// leaves the CPU untouched.
    fn execute(mut self) -> Result<Effects, ExecutionError> {
        let instruction = self.instruction;

        match instruction.operation {
            Operation::Register { opcode, rd, rn, rm } => {
                let result = self.register_operation(opcode, rn, rm)?;

                if opcode.sets_flags() {
                    self.cpu.flags.update(result);
                }

                self.write(rd, result)?;
            },
            Operation::Immediate { opcode, rd, rn, immediate, shift } => {
                let result = self.immediate_operation(opcode, rd, rn, immediate, shift)?;

                if opcode.sets_flags() {
                    self.cpu.flags.update(result);
                }

                self.write(rd, result)?;
            },
            Operation::Transfer { opcode, rt, rn, offset } => {
                self.transfer(opcode, rt, rn, offset)?;
            },
            Operation::Branch { ref target } => {
                let address = Self::target(target)?;
                self.jump(address);
            },
            Operation::BranchLink { ref target } => {
                let address = Self::target(target)?;
                let link = self.cpu.pc.wrapping_add(4) as i64;

                self.write(Register::LR, link)?;
                self.jump(address);
            },
            Operation::BranchRegister { rn } => {
                let address = self.read(rn)? as u64;

                if address % 4 != 0 {
                    return Err(ExecutionError::MisalignedAccess { address, alignment: 4 });
                }

                self.jump(address);
            },
            Operation::CompareBranch { test, rt, ref target } => {
                let address = Self::target(target)?;
                let value = self.read(rt)?;

                let taken = match test {
                    ZeroTest::Zero => value == 0,
                    ZeroTest::NonZero => value != 0,
                };

                if taken {
                    self.jump(address);
                }
            },
            Operation::ConditionalBranch { condition, ref target } => {
                let address = Self::target(target)?;

                if self.cpu.flags.satisfies(condition) {
                    self.jump(address);
                }
            },
        }

        Ok(self.effects)
    }
}

impl Instruction {
    /// Executes the instruction on `cpu`.
    ///
    /// The program counter is only written by instructions that jump, which is reported through
    /// [Effects::pc_modified]. Use [Cpu::step] to also advance the program counter and update
    /// the counters.
    ///
    /// # Errors
    /// Returns an [ExecutionError] if the instruction makes an illegal memory access, divides by
    /// zero, jumps to a misaligned address or has an unresolved branch target.
    pub fn execute(&self, cpu: &mut Cpu) -> Result<Effects, ExecutionError> {
        let context = ExecutionContext {
            cpu,
            instruction: self,
            effects: Effects::default(),
        };

        context.execute()
    }
}
