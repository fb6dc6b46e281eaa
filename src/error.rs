//! Error types for assembling and executing programs.

use std::fmt::{self, Display};

use itertools::Itertools;

/// Errors raised while executing a single instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// A register index outside of `0..=31` was used.
    InvalidRegister {
        index: usize,
    },

    /// A memory access touched an address outside of the memory capacity.
    OutOfBounds {
        address: u64,
    },

    /// A multi-byte memory access (or a register branch) was not aligned to its size.
    MisalignedAccess {
        address: u64,
        alignment: u64,
    },

    /// A branch instruction whose label was never resolved by the assembler was executed.
    UnresolvedBranchTarget {
        label: String,
    },

    /// A divide instruction was executed with a zero divisor.
    DivisionByZero,

    /// The CPU has been halted and refuses to execute further instructions.
    CpuHalted,
}

impl Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionError::InvalidRegister { index } =>
                write!(f, "invalid register number: {}", index),
            ExecutionError::OutOfBounds { address } =>
                write!(f, "memory address out of bounds: 0x{:x}", address),
            ExecutionError::MisalignedAccess { address, alignment } =>
                write!(f, "access must be aligned to {} bytes, address: 0x{:x}",
                    alignment, address),
            ExecutionError::UnresolvedBranchTarget { label } =>
                write!(f, "branch target '{}' not resolved", label),
            ExecutionError::DivisionByZero => write!(f, "division by zero"),
            ExecutionError::CpuHalted => write!(f, "CPU is halted"),
        }
    }
}

impl std::error::Error for ExecutionError {}

/// An [ExecutionError] caught at the step boundary, tagged with the location of the failing
/// instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct StepError {
    /// Value of the program counter when the instruction was stepped.
    pub pc: u64,

    /// Source line of the failing instruction.
    pub line: usize,

    /// The reason of the failure.
    pub error: ExecutionError,
}

impl Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {} (pc 0x{:04x}): {}", self.line, self.pc, self.error)
    }
}

impl std::error::Error for StepError {}

/// The reason a single source line failed to assemble.
#[derive(Debug, Clone, PartialEq)]
pub enum LineErrorKind {
    /// The mnemonic is not part of the supported instruction set.
    UnsupportedInstruction {
        mnemonic: String,
        /// The closest known mnemonic, if any is close enough to be a likely typo.
        suggestion: Option<&'static str>,
    },

    /// A `B.cond` instruction used an unknown condition code.
    UnsupportedCondition {
        condition: String,
    },

    OperandCount {
        mnemonic: String,
        expected: usize,
        got: usize,
    },

    InvalidRegister {
        operand: String,
    },

    InvalidImmediate {
        operand: String,
    },

    ImmediateOutOfRange {
        value: i64,
        min: i64,
        max: i64,
    },

    InvalidMemoryOperand {
        operand: String,
    },

    /// The shift operand of a wide move was not `LSL #0`, `#16`, `#32` or `#48`.
    InvalidShift {
        operand: String,
    },

    InvalidLabel {
        operand: String,
    },

    UndefinedLabel {
        label: String,
    },

    UnexpectedCharacter {
        text: String,
    },
}

impl Display for LineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineErrorKind::UnsupportedInstruction { mnemonic, suggestion: Some(suggestion) } =>
                write!(f, "unknown instruction: {} (did you mean {}?)", mnemonic, suggestion),
            LineErrorKind::UnsupportedInstruction { mnemonic, suggestion: None } =>
                write!(f, "unknown instruction: {}", mnemonic),
            LineErrorKind::UnsupportedCondition { condition } =>
                write!(f, "unsupported branch condition: {}", condition),
            LineErrorKind::OperandCount { mnemonic, expected: 1, got } =>
                write!(f, "{} requires 1 operand, got {}", mnemonic, got),
            LineErrorKind::OperandCount { mnemonic, expected, got } =>
                write!(f, "{} requires {} operands, got {}", mnemonic, expected, got),
            LineErrorKind::InvalidRegister { operand } =>
                write!(f, "invalid register: {}", operand),
            LineErrorKind::InvalidImmediate { operand } =>
                write!(f, "invalid immediate value: {}", operand),
            LineErrorKind::ImmediateOutOfRange { value, min, max } =>
                write!(f, "immediate value out of range ({} to {}): {}", min, max, value),
            LineErrorKind::InvalidMemoryOperand { operand } =>
                write!(f, "invalid memory operand: {}", operand),
            LineErrorKind::InvalidShift { operand } =>
                write!(f, "invalid shift: {}, expected LSL #0, #16, #32 or #48", operand),
            LineErrorKind::InvalidLabel { operand } =>
                write!(f, "invalid label reference: {}", operand),
            LineErrorKind::UndefinedLabel { label } =>
                write!(f, "undefined label: {}", label),
            LineErrorKind::UnexpectedCharacter { text } =>
                write!(f, "unexpected input: {}", text),
        }
    }
}

/// A single assembly error, tagged with the (1-based) source line it occurred on.
#[derive(Debug, Clone, PartialEq)]
pub struct LineError {
    pub line: usize,
    pub kind: LineErrorKind,
}

impl LineError {
    pub(crate) fn new(line: usize, kind: LineErrorKind) -> LineError {
        LineError { line, kind }
    }
}

impl Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for LineError {}

/// Aggregate error returned by the assembler.
///
/// Contains every problem found in the source, not just the first one, ordered by the pass
/// that found them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    errors: Vec<LineError>,
}

impl ParseError {
    pub(crate) fn new(errors: Vec<LineError>) -> ParseError {
        ParseError { errors }
    }

    /// All the errors, in source order within each assembly pass.
    pub fn errors(&self) -> &[LineError] {
        &self.errors[..]
    }

    pub fn into_errors(self) -> Vec<LineError> {
        self.errors
    }

    /// Returns true if any of the contained errors matches the predicate.
    pub fn contains<P>(&self, predicate: P) -> bool
    where
        P: Fn(&LineErrorKind) -> bool,
    {
        self.errors.iter().any(|err| predicate(&err.kind))
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.errors.iter().join("\n"))
    }
}

impl std::error::Error for ParseError {}
