//! Types for representing instructions and their parts.

use std::fmt;
use std::str::FromStr;

/// One of the 32 integer registers, `X0`-`X31`.
///
/// `X31` is the zero register. `X28`, `X29` and `X30` are conventionally used as the stack
/// pointer, frame pointer and link register, but nothing enforces the convention.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Register(u8);

impl Register {
    pub const SP: Register = Register(28);
    pub const FP: Register = Register(29);
    pub const LR: Register = Register(30);
    pub const XZR: Register = Register(31);

    /// Returns the register with the given number, or `None` if it is not in `0..=31`.
    pub fn new(index: usize) -> Option<Register> {
        if index < 32 {
            Some(Register(index as u8))
        } else {
            None
        }
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// The conventional alias of the register, if it has one.
    pub fn alias(&self) -> Option<&'static str> {
        match self.0 {
            28 => Some("SP"),
            29 => Some("FP"),
            30 => Some("LR"),
            31 => Some("XZR"),
            _ => None,
        }
    }
}

impl FromStr for Register {
    type Err = ();

    /// Accepts `X0`-`X31` and the aliases `XZR`, `SP`, `FP` and `LR`, case-insensitively.
    fn from_str(input: &str) -> Result<Register, ()> {
        match input.to_uppercase().as_ref() {
            "XZR" => return Ok(Register::XZR),
            "SP" => return Ok(Register::SP),
            "FP" => return Ok(Register::FP),
            "LR" => return Ok(Register::LR),
            _ => (),
        }

        let digits = match input.get(..1) {
            Some("X") | Some("x") => &input[1..],
            _ => return Err(()),
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(());
        }

        digits.parse::<usize>()
            .ok()
            .and_then(Register::new)
            .ok_or(())
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}

/// Register-register operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegisterOpCode {
    Add,
    /// Like [Add](RegisterOpCode::Add), but also updates the condition flags.
    AddS,
    Sub,
    /// Like [Sub](RegisterOpCode::Sub), but also updates the condition flags.
    SubS,
    And,
    Orr,
    Eor,
    /// Low 64 bits of the product.
    Mul,
    SDiv,
    UDiv,
    /// Shift left by the low 6 bits of the second operand.
    Lsl,
    /// Logical shift right by the low 6 bits of the second operand.
    Lsr,
}

impl RegisterOpCode {
    pub fn sets_flags(&self) -> bool {
        matches!(self, RegisterOpCode::AddS | RegisterOpCode::SubS)
    }
}

impl fmt::Display for RegisterOpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            RegisterOpCode::Add => "ADD",
            RegisterOpCode::AddS => "ADDS",
            RegisterOpCode::Sub => "SUB",
            RegisterOpCode::SubS => "SUBS",
            RegisterOpCode::And => "AND",
            RegisterOpCode::Orr => "ORR",
            RegisterOpCode::Eor => "EOR",
            RegisterOpCode::Mul => "MUL",
            RegisterOpCode::SDiv => "SDIV",
            RegisterOpCode::UDiv => "UDIV",
            RegisterOpCode::Lsl => "LSL",
            RegisterOpCode::Lsr => "LSR",
        })
    }
}

/// Register-immediate operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImmediateOpCode {
    AddI,
    AddIS,
    SubI,
    SubIS,
    AndI,
    OrrI,
    EorI,
    /// Shift left by an immediate amount.
    Lsl,
    /// Logical shift right by an immediate amount.
    Lsr,
    /// Move a 16-bit immediate into the destination, zeroing every other bit.
    MovZ,
    /// Replace a 16-bit field of the destination, keeping every other bit.
    MovK,
}

impl ImmediateOpCode {
    pub fn sets_flags(&self) -> bool {
        matches!(self, ImmediateOpCode::AddIS | ImmediateOpCode::SubIS)
    }

    /// Wide moves take no source register and may carry a shift.
    pub fn is_wide_move(&self) -> bool {
        matches!(self, ImmediateOpCode::MovZ | ImmediateOpCode::MovK)
    }
}

impl fmt::Display for ImmediateOpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ImmediateOpCode::AddI => "ADDI",
            ImmediateOpCode::AddIS => "ADDIS",
            ImmediateOpCode::SubI => "SUBI",
            ImmediateOpCode::SubIS => "SUBIS",
            ImmediateOpCode::AndI => "ANDI",
            ImmediateOpCode::OrrI => "ORRI",
            ImmediateOpCode::EorI => "EORI",
            ImmediateOpCode::Lsl => "LSL",
            ImmediateOpCode::Lsr => "LSR",
            ImmediateOpCode::MovZ => "MOVZ",
            ImmediateOpCode::MovK => "MOVK",
        })
    }
}

/// Memory transfer operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransferOpCode {
    /// Load a doubleword.
    Ldur,
    /// Store a doubleword.
    Stur,
    /// Load a sign-extended word.
    LdurW,
    /// Store the low 32 bits.
    SturW,
    /// Load a zero-extended byte.
    LdurB,
    /// Store the low 8 bits.
    SturB,
}

impl TransferOpCode {
    pub fn is_load(&self) -> bool {
        matches!(self, TransferOpCode::Ldur | TransferOpCode::LdurW | TransferOpCode::LdurB)
    }

    /// Number of bytes moved by the operation.
    pub fn width(&self) -> u64 {
        match self {
            TransferOpCode::Ldur | TransferOpCode::Stur => 8,
            TransferOpCode::LdurW | TransferOpCode::SturW => 4,
            TransferOpCode::LdurB | TransferOpCode::SturB => 1,
        }
    }
}

impl fmt::Display for TransferOpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            TransferOpCode::Ldur => "LDUR",
            TransferOpCode::Stur => "STUR",
            TransferOpCode::LdurW => "LDURW",
            TransferOpCode::SturW => "STURW",
            TransferOpCode::LdurB => "LDURB",
            TransferOpCode::SturB => "STURB",
        })
    }
}

/// Predicate of a compare-and-branch instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ZeroTest {
    /// Branch if the register is zero. (`CBZ`)
    Zero,
    /// Branch if the register is not zero. (`CBNZ`)
    NonZero,
}

impl fmt::Display for ZeroTest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ZeroTest::Zero => write!(f, "CBZ"),
            ZeroTest::NonZero => write!(f, "CBNZ"),
        }
    }
}

/// Condition codes of the `B.cond` instructions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Equal. (`Z`)
    Eq,
    /// Not equal. (`!Z`)
    Ne,
    /// Signed less than. (`N != V`)
    Lt,
    /// Signed less than or equal. (`N != V || Z`)
    Le,
    /// Signed greater than. (`!Z && N == V`)
    Gt,
    /// Signed greater than or equal. (`N == V`)
    Ge,
    /// Unsigned lower. (`!C`)
    Lo,
    /// Unsigned lower or same. (`!C || Z`)
    Ls,
    /// Unsigned higher. (`C && !Z`)
    Hi,
    /// Unsigned higher or same. (`C`)
    Hs,
}

impl FromStr for Condition {
    type Err = ();

    fn from_str(input: &str) -> Result<Condition, ()> {
        let condition = match input.to_uppercase().as_ref() {
            "EQ" => Condition::Eq,
            "NE" => Condition::Ne,
            "LT" => Condition::Lt,
            "LE" => Condition::Le,
            "GT" => Condition::Gt,
            "GE" => Condition::Ge,
            "LO" => Condition::Lo,
            "LS" => Condition::Ls,
            "HI" => Condition::Hi,
            "HS" => Condition::Hs,
            _ => return Err(()),
        };

        Ok(condition)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Condition::Eq => "EQ",
            Condition::Ne => "NE",
            Condition::Lt => "LT",
            Condition::Le => "LE",
            Condition::Gt => "GT",
            Condition::Ge => "GE",
            Condition::Lo => "LO",
            Condition::Ls => "LS",
            Condition::Hi => "HI",
            Condition::Hs => "HS",
        })
    }
}

/// Destination of a PC-relative branch.
///
/// The first assembly pass produces [Unresolved](BranchTarget::Unresolved) targets, which the
/// second pass turns into [Resolved](BranchTarget::Resolved) byte addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BranchTarget {
    Unresolved {
        label: String,
    },
    Resolved {
        label: String,
        address: u64,
    },
}

impl BranchTarget {
    pub fn label(&self) -> &str {
        match self {
            BranchTarget::Unresolved { label } => label,
            BranchTarget::Resolved { label, .. } => label,
        }
    }

    pub fn address(&self) -> Option<u64> {
        match self {
            BranchTarget::Unresolved { .. } => None,
            BranchTarget::Resolved { address, .. } => Some(*address),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.address().is_some()
    }
}

/// Instruction shape category.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    R,
    I,
    D,
    B,
    BL,
    BR,
    CB,
    CondB,
}

/// The decoded operation of an [Instruction].
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// `rd = rn <op> rm`
    Register {
        opcode: RegisterOpCode,
        rd: Register,
        rn: Register,
        rm: Register,
    },

    /// `rd = rn <op> immediate`. Wide moves ignore `rn` and use `shift` to select the 16-bit
    /// field they write; every other operation has a zero `shift`.
    Immediate {
        opcode: ImmediateOpCode,
        rd: Register,
        rn: Register,
        immediate: i64,
        shift: u32,
    },

    /// Moves data between `rt` and the address `rn + offset`.
    Transfer {
        opcode: TransferOpCode,
        rt: Register,
        rn: Register,
        offset: i64,
    },

    /// Unconditional jump. (`B`)
    Branch {
        target: BranchTarget,
    },

    /// Stores the return address into the link register and jumps. (`BL`)
    BranchLink {
        target: BranchTarget,
    },

    /// Jumps to the address held in a register. (`BR`)
    BranchRegister {
        rn: Register,
    },

    /// Jumps if a register is (non-)zero. (`CBZ`, `CBNZ`)
    CompareBranch {
        test: ZeroTest,
        rt: Register,
        target: BranchTarget,
    },

    /// Jumps if the condition flags satisfy a condition. (`B.cond`)
    ConditionalBranch {
        condition: Condition,
        target: BranchTarget,
    },
}

impl Operation {
    pub fn format(&self) -> Format {
        match self {
            Operation::Register { .. } => Format::R,
            Operation::Immediate { .. } => Format::I,
            Operation::Transfer { .. } => Format::D,
            Operation::Branch { .. } => Format::B,
            Operation::BranchLink { .. } => Format::BL,
            Operation::BranchRegister { .. } => Format::BR,
            Operation::CompareBranch { .. } => Format::CB,
            Operation::ConditionalBranch { .. } => Format::CondB,
        }
    }

    pub fn target(&self) -> Option<&BranchTarget> {
        match self {
            Operation::Branch { target }
            | Operation::BranchLink { target }
            | Operation::CompareBranch { target, .. }
            | Operation::ConditionalBranch { target, .. } => Some(target),
            _ => None,
        }
    }

    pub(crate) fn target_mut(&mut self) -> Option<&mut BranchTarget> {
        match self {
            Operation::Branch { target }
            | Operation::BranchLink { target }
            | Operation::CompareBranch { target, .. }
            | Operation::ConditionalBranch { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// An assembled instruction together with the source line it was assembled from.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    /// 1-based line number in the assembly source.
    pub line: usize,
    pub operation: Operation,
}

impl Instruction {
    pub fn new(line: usize, operation: Operation) -> Instruction {
        Instruction { line, operation }
    }

    pub fn format(&self) -> Format {
        self.operation.format()
    }

    /// The branch target of the instruction, if it is a PC-relative branch.
    pub fn target(&self) -> Option<&BranchTarget> {
        self.operation.target()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.operation, f)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operation::Register { opcode, rd, rn, rm } =>
                write!(f, "{} {}, {}, {}", opcode, rd, rn, rm),
            Operation::Immediate { opcode, rd, immediate, shift, .. } if opcode.is_wide_move() => {
                write!(f, "{} {}, #{}", opcode, rd, immediate)?;

                if *shift != 0 {
                    write!(f, ", LSL #{}", shift)?;
                }

                Ok(())
            },
            Operation::Immediate { opcode, rd, rn, immediate, .. } =>
                write!(f, "{} {}, {}, #{}", opcode, rd, rn, immediate),
            Operation::Transfer { opcode, rt, rn, offset } =>
                write!(f, "{} {}, [{}, #{}]", opcode, rt, rn, offset),
            Operation::Branch { target } => write!(f, "B {}", target.label()),
            Operation::BranchLink { target } => write!(f, "BL {}", target.label()),
            Operation::BranchRegister { rn } => write!(f, "BR {}", rn),
            Operation::CompareBranch { test, rt, target } =>
                write!(f, "{} {}, {}", test, rt, target.label()),
            Operation::ConditionalBranch { condition, target } =>
                write!(f, "B.{} {}", condition, target.label()),
        }
    }
}
