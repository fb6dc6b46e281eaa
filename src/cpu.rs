//! The simulated LEGv8 processor.

use std::fmt;

use slog::{debug, o, trace, warn, Discard, Logger};

use crate::assembler::Program;
use crate::config::Config;
use crate::error::{ExecutionError, StepError};
use crate::event::{Event, EventDispatcher, EventListener};
use crate::execution::{Effects, MemoryChange};
use crate::instruction::{Condition, Instruction, Register};
use crate::memory::Memory;
use crate::registers::{RegisterFile, REGISTER_COUNT};

/// The condition flags.
///
/// Only `negative` and `zero` are ever computed. Flag-setting instructions always clear
/// `overflow` and `carry`, so the unsigned conditions behave as if every comparison borrowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub negative: bool,
    pub zero: bool,
    pub overflow: bool,
    pub carry: bool,
}

impl Flags {
    /// Updates the flags from the (wrapped) result of a flag-setting instruction.
    pub fn update(&mut self, result: i64) {
        self.negative = result < 0;
        self.zero = result == 0;
        self.overflow = false;
        self.carry = false;
    }

    /// Returns true if the flags satisfy `condition`.
    pub fn satisfies(&self, condition: Condition) -> bool {
        let Flags { negative: n, zero: z, overflow: v, carry: c } = *self;

        match condition {
            Condition::Eq => z,
            Condition::Ne => !z,
            Condition::Lt => n != v,
            Condition::Le => n != v || z,
            Condition::Gt => !z && n == v,
            Condition::Ge => n == v,
            Condition::Lo => !c,
            Condition::Ls => !c || z,
            Condition::Hi => c && !z,
            Condition::Hs => c,
        }
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "N={} Z={} V={} C={}",
            self.negative as u8,
            self.zero as u8,
            self.overflow as u8,
            self.carry as u8,
        )
    }
}

/// Snapshot of the architectural state of a [Cpu].
#[derive(Debug, Clone, PartialEq)]
pub struct CpuState {
    pub pc: u64,
    pub registers: [i64; REGISTER_COUNT],
    pub instruction_count: u64,
    pub cycle_count: u64,
    pub halted: bool,
    pub flags: Flags,
}

/// Outcome of a successful [Cpu::step].
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// The program counter after the step.
    pub pc: u64,
    pub instruction_count: u64,
    pub cycle_count: u64,
    pub register_changes: Vec<Register>,
    pub memory_changes: Vec<MemoryChange>,
}

/// Why [Cpu::run] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The program counter left the program and the CPU halted.
    Completed,

    /// The configured instruction limit was reached before the program completed.
    LimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,

    /// Number of instructions executed by the run.
    pub steps: u64,
}

/// The processor: program counter, registers, memory, flags and counters.
///
/// The CPU does not own the program it executes. Single instructions are executed with
/// [step](Cpu::step), whole [Programs](Program) with [step_program](Cpu::step_program) and
/// [run](Cpu::run).
///
/// ```
/// use legv8::{assembler::Program, cpu::{Cpu, RunOutcome}};
///
/// let program = Program::parse("ADDI X1, XZR, #10\nADDI X2, X1, #5").unwrap();
/// let mut cpu = Cpu::new();
///
/// let summary = cpu.run(&program).unwrap();
///
/// assert_eq!(summary.outcome, RunOutcome::Completed);
/// assert_eq!(cpu.registers.read(2), Ok(15));
/// ```
#[derive(Debug)]
pub struct Cpu {
    pub(crate) pc: u64,

    pub registers: RegisterFile,

    pub memory: Memory,

    pub flags: Flags,

    instruction_count: u64,

    cycle_count: u64,

    halted: bool,

    /// The most recently stepped instruction, even if it failed.
    last_instruction: Option<Instruction>,

    config: Config,

    logger: Logger,

    events: EventDispatcher,
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu::new()
    }
}

fn execution_logger<L: Into<Option<Logger>>>(logger: L) -> Logger {
    logger
        .into()
        .unwrap_or(Logger::root(Discard, o!()))
        .new(o!("stage" => "execution"))
}

impl Cpu {
    /// Creates a CPU with the default [Config].
    pub fn new() -> Cpu {
        Cpu::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Cpu {
        Cpu {
            pc: 0,
            registers: RegisterFile::new(),
            memory: Memory::new(config.memory_capacity),
            flags: Flags::default(),
            instruction_count: 0,
            cycle_count: 0,
            halted: false,
            last_instruction: None,
            config,
            logger: execution_logger(None),
            events: EventDispatcher::new(),
        }
    }

    /// Creates a CPU with the default [Config] that logs into `logger`.
    pub fn with_logger<L: Into<Option<Logger>>>(logger: L) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.set_logger(logger);
        cpu
    }

    pub fn set_logger<L: Into<Option<Logger>>>(&mut self, logger: L) {
        self.logger = execution_logger(logger);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers a listener for the [Events](Event) of every successful step.
    pub fn add_listener<L: EventListener + 'static>(&mut self, listener: L) {
        self.events.add_listener(listener);
    }

    /// Returns the CPU to its initial state. The configuration, logger and listeners are kept.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.registers.reset();
        self.memory.clear();
        self.flags = Flags::default();
        self.instruction_count = 0;
        self.cycle_count = 0;
        self.halted = false;
        self.last_instruction = None;

        debug!(self.logger, "reset");
    }

    pub fn pc(&self) -> u64 {
        self.pc
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    /// Stops the CPU. Every following step fails with [ExecutionError::CpuHalted] until the CPU
    /// is [reset](Cpu::reset).
    pub fn halt(&mut self) {
        if self.halted {
            return;
        }

        self.halted = true;

        debug!(self.logger, "halted"; "pc" => self.pc, "instructions" => self.instruction_count);
        self.events.dispatch(Event::Halted { pc: self.pc });
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn last_instruction(&self) -> Option<&Instruction> {
        self.last_instruction.as_ref()
    }

    pub fn get_state(&self) -> CpuState {
        CpuState {
            pc: self.pc,
            registers: self.registers.all(),
            instruction_count: self.instruction_count,
            cycle_count: self.cycle_count,
            halted: self.halted,
            flags: self.flags,
        }
    }

    /// Executes a single instruction.
    ///
    /// Advances the program counter by 4 unless the instruction jumped, and increments the
    /// instruction and cycle counters.
    ///
    /// # Errors
    /// Fails with [ExecutionError::CpuHalted] without side effects if the CPU is halted. If the
    /// instruction fails, the counters and the program counter are left as they were, but the
    /// instruction is still recorded as the [last instruction](Cpu::last_instruction).
    pub fn step(&mut self, instruction: &Instruction) -> Result<StepResult, StepError> {
        let pc = self.pc;

        if self.halted {
            return Err(StepError { pc, line: instruction.line, error: ExecutionError::CpuHalted });
        }

        self.last_instruction = Some(instruction.clone());

        let effects = match instruction.execute(self) {
            Ok(effects) => effects,
            Err(error) => {
                debug!(self.logger, "instruction failed";
                    "pc" => pc, "line" => instruction.line, "error" => %error);

                return Err(StepError { pc, line: instruction.line, error });
            },
        };

        self.instruction_count += 1;
        self.cycle_count += 1;

        if !effects.pc_modified {
            self.pc = self.pc.wrapping_add(4);
        }

        trace!(self.logger, "step";
            "pc" => pc,
            "line" => instruction.line,
            "instruction" => %instruction,
            "next" => self.pc);

        self.dispatch(instruction.line, &effects);

        Ok(StepResult {
            pc: self.pc,
            instruction_count: self.instruction_count,
            cycle_count: self.cycle_count,
            register_changes: effects.register_changes,
            memory_changes: effects.memory_changes,
        })
    }

    fn dispatch(&mut self, line: usize, effects: &Effects) {
        self.events.dispatch(Event::Step { line, pc: self.pc });

        for &register in &effects.register_changes {
            let value = self.registers.get(register);
            self.events.dispatch(Event::RegisterChange { register, value });
        }

        for change in &effects.memory_changes {
            self.events.dispatch(Event::MemoryChange {
                address: change.address,
                access: change.access,
                value: change.value,
            });
        }
    }

    /// Fetches the instruction at the program counter from `program` and steps it. Halts the CPU
    /// once the program counter leaves the program.
    ///
    /// # Errors
    /// As [step](Cpu::step). If the program counter does not point into the program, the CPU is
    /// halted and the error is [ExecutionError::CpuHalted] with a zero line number.
    pub fn step_program(&mut self, program: &Program) -> Result<StepResult, StepError> {
        let instruction = match program.fetch(self.pc) {
            Some(instruction) => instruction,
            None => {
                self.halt();

                return Err(StepError { pc: self.pc, line: 0, error: ExecutionError::CpuHalted });
            },
        };

        let result = self.step(instruction)?;

        if program.fetch(self.pc).is_none() {
            self.halt();
        }

        Ok(result)
    }

    /// Steps `program` until the CPU halts or the configured
    /// [instruction limit](Config::instruction_limit) is reached.
    ///
    /// # Errors
    /// Stops at the first failing instruction and returns its error.
    pub fn run(&mut self, program: &Program) -> Result<RunSummary, StepError> {
        let limit = self.config.instruction_limit;
        let mut steps = 0;

        if !self.halted && program.fetch(self.pc).is_none() {
            self.halt();
        }

        while !self.halted {
            if steps >= limit {
                warn!(self.logger, "instruction limit reached"; "limit" => limit, "pc" => self.pc);

                return Ok(RunSummary { outcome: RunOutcome::LimitReached, steps });
            }

            self.step_program(program)?;
            steps += 1;
        }

        Ok(RunSummary { outcome: RunOutcome::Completed, steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    fn parse(source: &str) -> Program {
        Program::parse(source).unwrap()
    }

    #[test]
    fn test_sum_and_store() {
        let program = parse(
            "ADDI X1, XZR, #10\nADDI X2, XZR, #20\nADD X3, X1, X2\nSTUR X3,[X28,#0]",
        );
        assert_eq!(program.len(), 4);

        let mut cpu = Cpu::new();

        for instruction in program.instructions() {
            cpu.step(instruction).unwrap();
        }

        assert_eq!(cpu.registers.read(3), Ok(30));
        assert_eq!(cpu.memory.read_doubleword(0), Ok(30));
        assert_eq!(cpu.pc(), 16);
        assert!(!cpu.halted());
        assert_eq!(cpu.instruction_count(), 4);
        assert_eq!(cpu.cycle_count(), 4);
    }

    #[test]
    fn test_step_result() {
        let program = parse("ADDI X1, XZR, #10\nSTUR X1, [SP, #8]");
        let mut cpu = Cpu::new();

        let result = cpu.step(&program.instructions()[0]).unwrap();

        assert_eq!(result, StepResult {
            pc: 4,
            instruction_count: 1,
            cycle_count: 1,
            register_changes: vec![Register::new(1).unwrap()],
            memory_changes: vec![],
        });

        let result = cpu.step(&program.instructions()[1]).unwrap();

        assert!(result.register_changes.is_empty());
        assert_eq!(result.memory_changes, vec![MemoryChange {
            address: 8,
            access: crate::memory::Access::Write,
            value: 10,
        }]);
    }

    #[test]
    fn test_flag_scenario() {
        let program = parse("ADDI X1, XZR, #7\nSUBS X4, X1, X1\nB.EQ target\nB.NE target\ntarget:");
        let mut cpu = Cpu::new();

        cpu.step(&program.instructions()[0]).unwrap();
        cpu.step(&program.instructions()[1]).unwrap();

        assert!(cpu.flags.zero);
        assert!(!cpu.flags.negative);

        assert_eq!(cpu.step(&program.instructions()[2]).unwrap().pc, 16);
        assert_eq!(cpu.step(&program.instructions()[3]).unwrap().pc, 20);
    }

    #[test]
    fn test_movk_preserves_upper_bits() {
        let program = parse("MOVZ X1, #0xABCD\nMOVK X1, #1");
        let mut cpu = Cpu::new();

        cpu.step(&program.instructions()[0]).unwrap();
        let before = cpu.registers.read(1).unwrap();

        cpu.step(&program.instructions()[1]).unwrap();
        let after = cpu.registers.read(1).unwrap();

        assert_eq!(after & 0xFFFF, 1);
        assert_eq!(after & !0xFFFF, before & !0xFFFF);
    }

    #[test]
    fn test_negative_movz_sign_extends() {
        let program = parse("MOVZ X1, #-5
MOVK X1, #-2");
        let mut cpu = Cpu::new();

        cpu.step(&program.instructions()[0]).unwrap();
        assert_eq!(cpu.registers.read(1), Ok(-5));

        cpu.step(&program.instructions()[1]).unwrap();
        assert_eq!(cpu.registers.read(1), Ok(-2));
    }

    #[test]
    fn test_infinite_loop_is_bounded() {
        let program = parse("loop: B loop");
        let mut cpu = Cpu::with_config(Config::default().instruction_limit(100));

        for _ in 0..10 {
            assert_eq!(cpu.step_program(&program).unwrap().pc, 0);
        }

        let summary = cpu.run(&program).unwrap();

        assert_eq!(summary, RunSummary { outcome: RunOutcome::LimitReached, steps: 100 });
        assert_eq!(cpu.pc(), 0);
        assert_eq!(cpu.instruction_count(), 110);
        assert!(!cpu.halted());
    }

    #[test]
    fn test_run_to_completion() {
        let program = parse(
            "ADDI X1, XZR, #5\n\
             ADDI X2, XZR, #0\n\
             loop: ADD X2, X2, X1\n\
             SUBIS X1, X1, #1\n\
             B.GT loop",
        );

        let mut cpu = Cpu::new();
        let summary = cpu.run(&program).unwrap();

        assert_eq!(summary, RunSummary { outcome: RunOutcome::Completed, steps: 17 });
        assert_eq!(cpu.registers.read(2), Ok(15));
        assert_eq!(cpu.pc(), 20);
        assert!(cpu.halted());

        let error = cpu.step_program(&program).unwrap_err();
        assert_eq!(error.error, ExecutionError::CpuHalted);
    }

    #[test]
    fn test_empty_program_completes() {
        let mut cpu = Cpu::new();
        let summary = cpu.run(&parse("")).unwrap();

        assert_eq!(summary, RunSummary { outcome: RunOutcome::Completed, steps: 0 });
        assert!(cpu.halted());
    }

    #[test]
    fn test_halted_cpu_refuses_to_step() {
        let program = parse("ADDI X1, XZR, #1");
        let mut cpu = Cpu::new();

        cpu.halt();

        let error = cpu.step(&program.instructions()[0]).unwrap_err();

        assert_eq!(error, StepError { pc: 0, line: 1, error: ExecutionError::CpuHalted });
        assert_eq!(cpu.registers.read(1), Ok(0));
        assert_eq!(cpu.instruction_count(), 0);
        assert_eq!(cpu.last_instruction(), None);
    }

    #[test]
    fn test_failed_step() {
        let program = parse("ADDI X1, XZR, #3\n\nLDUR X2, [X1, #0]");
        let mut cpu = Cpu::new();

        cpu.step_program(&program).unwrap();
        let error = cpu.step_program(&program).unwrap_err();

        assert_eq!(error.pc, 4);
        assert_eq!(error.line, 3);
        assert_eq!(error.error, ExecutionError::MisalignedAccess { address: 3, alignment: 8 });
        assert_eq!(
            error.to_string(),
            "line 3 (pc 0x0004): access must be aligned to 8 bytes, address: 0x3",
        );

        assert_eq!(cpu.pc(), 4);
        assert_eq!(cpu.instruction_count(), 1);
        assert_eq!(cpu.last_instruction(), Some(&program.instructions()[1]));
        assert!(!cpu.halted());
    }

    #[test]
    fn test_call_and_return() {
        let program = parse(
            "BL double\n\
             B end\n\
             double: ADD X0, X0, X0\n\
             BR LR\n\
             end:",
        );

        let mut cpu = Cpu::new();
        cpu.registers.write(0, 21).unwrap();

        let summary = cpu.run(&program).unwrap();

        assert_eq!(summary.steps, 4);
        assert_eq!(cpu.registers.read(0), Ok(42));
        assert_eq!(cpu.registers.read(Register::LR.index()), Ok(4));
        assert_eq!(cpu.pc(), 16);
    }

    #[test]
    fn test_reset() {
        let program = parse("ADDI X1, XZR, #1\nSUBIS X2, X1, #1\nSTUR X1, [SP, #16]");
        let mut cpu = Cpu::with_config(Config::default().memory_capacity(64));

        cpu.run(&program).unwrap();
        assert!(cpu.halted());

        cpu.reset();

        assert_eq!(cpu.get_state(), CpuState {
            pc: 0,
            registers: [0; REGISTER_COUNT],
            instruction_count: 0,
            cycle_count: 0,
            halted: false,
            flags: Flags::default(),
        });

        assert!(cpu.memory.get_used_addresses().is_empty());
        assert_eq!(cpu.memory.capacity(), 64);
        assert_eq!(cpu.last_instruction(), None);
    }

    #[test]
    fn test_events() {
        let program = parse("ADDI X1, XZR, #2\nSTUR X1, [SP, #0]");
        let events = Rc::new(RefCell::new(Vec::new()));

        let mut cpu = Cpu::new();

        let sink = events.clone();
        cpu.add_listener(move |event: &Event| sink.borrow_mut().push(event.clone()));

        cpu.run(&program).unwrap();

        assert_eq!(*events.borrow(), vec![
            Event::Step { line: 1, pc: 4 },
            Event::RegisterChange { register: Register::new(1).unwrap(), value: 2 },
            Event::Step { line: 2, pc: 8 },
            Event::MemoryChange { address: 0, access: crate::memory::Access::Write, value: 2 },
            Event::Halted { pc: 8 },
        ]);
    }

    #[test]
    fn test_condition_table() {
        let clear = Flags::default();
        let zero = Flags { zero: true, ..Flags::default() };
        let negative = Flags { negative: true, ..Flags::default() };
        let carry = Flags { carry: true, ..Flags::default() };
        let overflow = Flags { overflow: true, ..Flags::default() };

        assert!(zero.satisfies(Condition::Eq) && !clear.satisfies(Condition::Eq));
        assert!(clear.satisfies(Condition::Ne) && !zero.satisfies(Condition::Ne));
        assert!(negative.satisfies(Condition::Lt) && !overflow.satisfies(Condition::Ge));
        assert!(zero.satisfies(Condition::Le) && !clear.satisfies(Condition::Le));
        assert!(clear.satisfies(Condition::Gt) && !zero.satisfies(Condition::Gt));
        assert!(clear.satisfies(Condition::Ge) && !negative.satisfies(Condition::Ge));
        assert!(clear.satisfies(Condition::Lo) && !carry.satisfies(Condition::Lo));
        assert!(zero.satisfies(Condition::Ls) && !carry.satisfies(Condition::Ls));
        assert!(carry.satisfies(Condition::Hi) && !clear.satisfies(Condition::Hi));
        assert!(carry.satisfies(Condition::Hs) && !clear.satisfies(Condition::Hs));
    }
}
