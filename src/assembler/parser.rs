//! Two-pass assembler.
//!
//! The first pass turns every source line into an [Instruction] whose branch targets are still
//! [Unresolved](BranchTarget::Unresolved) and collects the label definitions. The second pass
//! resolves every branch target into the byte address of the labelled instruction.
//!
//! Both passes report every problem they find instead of stopping at the first one.

use std::collections::HashMap;

use slog::{debug, o, trace, warn, Discard, Logger};

use crate::error::{LineError, LineErrorKind, ParseError};
use crate::instruction::{
    BranchTarget,
    Condition,
    ImmediateOpCode,
    Instruction,
    Operation,
    Register,
    RegisterOpCode,
};
use crate::parsing;

use super::mnemonic::{self, Mnemonic};
use super::program::Program;
use super::token::{self, Span, Token};

/// Smallest immediate accepted by the arithmetic, logical and shift instructions.
pub const IMMEDIATE_MIN: i64 = -2048;

/// Largest immediate accepted by the arithmetic, logical and shift instructions.
pub const IMMEDIATE_MAX: i64 = 2047;

/// Largest immediate of `MOVZ` and `MOVK`, which take a 16-bit field. Their smallest immediate
/// is [IMMEDIATE_MIN], sign-extended and allowed only without a shift.
pub const WIDE_IMMEDIATE_MAX: i64 = 0xFFFF;

/// Size of every instruction in bytes.
const INSTRUCTION_SIZE: u64 = 4;

type Operand<'t, 'a> = &'t [(Token<'a>, Span)];

/// A single non-empty source line with its comment stripped.
struct Line<'a> {
    number: usize,
    code: &'a str,
}

impl<'a> Line<'a> {
    /// Source text of the operand, for error messages.
    fn text(&self, operand: Operand) -> String {
        match (operand.first(), operand.last()) {
            (Some((_, first)), Some((_, last))) => self.code[first.start..last.end].to_string(),
            _ => String::new(),
        }
    }

    fn expect(&self, mnemonic: &str, operands: &[Operand], expected: usize)
        -> Result<(), LineErrorKind>
    {
        if operands.len() == expected {
            Ok(())
        } else {
            Err(LineErrorKind::OperandCount {
                mnemonic: mnemonic.to_string(),
                expected,
                got: operands.len(),
            })
        }
    }

    fn register(&self, operand: Operand) -> Result<Register, LineErrorKind> {
        let register = match operand {
            [(Token::Identifier(name), _)] => name.parse().ok(),
            _ => None,
        };

        register.ok_or_else(|| LineErrorKind::InvalidRegister {
            operand: self.text(operand),
        })
    }

    fn immediate(&self, operand: Operand, min: i64, max: i64) -> Result<i64, LineErrorKind> {
        let value = self.literal(operand)?;

        if value < min || value > max {
            return Err(LineErrorKind::ImmediateOutOfRange { value, min, max });
        }

        Ok(value)
    }

    /// An integer literal of any size.
    fn literal(&self, operand: Operand) -> Result<i64, LineErrorKind> {
        let value = match operand {
            [(Token::Number(literal), _)] => parsing::immediate(literal),
            _ => None,
        };

        value.ok_or_else(|| LineErrorKind::InvalidImmediate {
            operand: self.text(operand),
        })
    }

    /// Parses `[Xn]` or `[Xn, #offset]`.
    fn memory(&self, operand: Operand) -> Result<(Register, i64), LineErrorKind> {
        let inner = match operand {
            [(Token::AddressBegin, _), inner @ .., (Token::AddressEnd, _)] => inner,
            _ => return Err(LineErrorKind::InvalidMemoryOperand { operand: self.text(operand) }),
        };

        match inner {
            [_] => Ok((self.register(inner)?, 0)),
            [_, (Token::ParameterSeparator, _), _] => {
                Ok((self.register(&inner[..1])?, self.literal(&inner[2..])?))
            },
            _ => Err(LineErrorKind::InvalidMemoryOperand { operand: self.text(operand) }),
        }
    }

    fn label(&self, operand: Operand) -> Result<BranchTarget, LineErrorKind> {
        match operand {
            [(Token::Identifier(name), _)] if is_label(name) => Ok(BranchTarget::Unresolved {
                label: name.to_string(),
            }),
            _ => Err(LineErrorKind::InvalidLabel { operand: self.text(operand) }),
        }
    }

    /// Parses the `LSL #n` operand of a wide move.
    fn shift(&self, operand: Operand) -> Result<u32, LineErrorKind> {
        let amount = match operand {
            [(Token::Identifier(lsl), _), (Token::Number(amount), _)]
                if lsl.eq_ignore_ascii_case("LSL") => parsing::immediate(amount),
            _ => None,
        };

        match amount {
            Some(amount @ 0) | Some(amount @ 16) | Some(amount @ 32) | Some(amount @ 48) =>
                Ok(amount as u32),
            _ => Err(LineErrorKind::InvalidShift { operand: self.text(operand) }),
        }
    }
}

fn is_label(name: &str) -> bool {
    !name.contains('.')
}

fn is_literal(operand: Operand) -> bool {
    matches!(operand, [(Token::Number(_), _)])
}

/// Output of the first pass.
struct Listing {
    instructions: Vec<Instruction>,
    labels: HashMap<String, usize>,
    errors: Vec<LineError>,
}

/// The assembler.
///
/// ```
/// use legv8::assembler::Parser;
///
/// let program = Parser::new()
///     .parse("loop: SUBI X1, X1, #1\nCBNZ X1, loop")
///     .unwrap();
///
/// assert_eq!(program.len(), 2);
/// assert_eq!(program.label_address("loop"), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    logger: Logger,
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::new()
    }
}

impl Parser {
    pub fn new() -> Parser {
        Parser::with_logger(None)
    }

    pub fn with_logger<L>(logger: L) -> Parser
    where
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()))
            .new(o!("stage" => "assembly"));

        Parser { logger }
    }

    /// Assembles `source` into a [Program] with every branch target resolved.
    ///
    /// # Errors
    /// If any line fails to assemble, the error lists every failing line. Undefined labels are
    /// only reported once every line has assembled.
    pub fn parse(&self, source: &str) -> Result<Program, ParseError> {
        let Listing { mut instructions, labels, errors } = self.first_pass(source);

        if !errors.is_empty() {
            debug!(self.logger, "assembly failed"; "errors" => errors.len());
            return Err(ParseError::new(errors));
        }

        let mut errors = Vec::new();

        for instruction in &mut instructions {
            let line = instruction.line;

            let target = match instruction.operation.target_mut() {
                Some(target) => target,
                None => continue,
            };

            match labels.get(target.label()) {
                Some(&index) => {
                    let address = index as u64 * INSTRUCTION_SIZE;

                    trace!(self.logger, "resolve branch target";
                        "label" => target.label(), "address" => address, "line" => line);

                    *target = BranchTarget::Resolved {
                        label: target.label().to_string(),
                        address,
                    };
                },
                None => errors.push(LineError::new(line, LineErrorKind::UndefinedLabel {
                    label: target.label().to_string(),
                })),
            }
        }

        if !errors.is_empty() {
            debug!(self.logger, "assembly failed"; "errors" => errors.len());
            return Err(ParseError::new(errors));
        }

        debug!(self.logger, "assembled program";
            "instructions" => instructions.len(), "labels" => labels.len());

        Ok(Program::new(instructions, labels))
    }

    /// Checks the syntax of every line without resolving labels.
    ///
    /// Returns the errors of every failing line, or an empty vector if every line assembles.
    pub fn validate(&self, source: &str) -> Vec<LineError> {
        self.first_pass(source).errors
    }

    fn first_pass(&self, source: &str) -> Listing {
        let mut listing = Listing {
            instructions: Vec::new(),
            labels: HashMap::new(),
            errors: Vec::new(),
        };

        for (index, source_line) in source.lines().enumerate() {
            let code = match source_line.find("//") {
                Some(comment) => &source_line[..comment],
                None => source_line,
            };

            let line = Line {
                number: index + 1,
                code: code.trim(),
            };

            if line.code.is_empty() {
                continue;
            }

            if let Err(kind) = self.assemble_line(&line, &mut listing) {
                listing.errors.push(LineError::new(line.number, kind));
            }
        }

        listing
    }

    fn assemble_line(&self, line: &Line, listing: &mut Listing) -> Result<(), LineErrorKind> {
        let tokens = token::tokenize(line.code);

        if let Some((_, span)) = tokens.iter().find(|(token, _)| *token == Token::Error) {
            return Err(LineErrorKind::UnexpectedCharacter {
                text: line.code[span.clone()].to_string(),
            });
        }

        let mut rest = &tokens[..];

        if let [(Token::Identifier(name), _), (Token::LabelEnd, _), tail @ ..] = rest {
            if !is_label(name) {
                return Err(LineErrorKind::InvalidLabel { operand: name.to_string() });
            }

            self.define_label(&mut listing.labels, name, listing.instructions.len(), line.number);
            rest = tail;
        }

        let (mnemonic, operands) = match rest {
            [] => return Ok(()),
            [(Token::Identifier(mnemonic), _), operands @ ..] => (*mnemonic, operands),
            [(_, span), ..] => return Err(LineErrorKind::UnexpectedCharacter {
                text: line.code[span.clone()].to_string(),
            }),
        };

        let operands = token::split_operands(operands);
        let operation = self.operation(line, mnemonic, &operands)?;

        trace!(self.logger, "assemble instruction";
            "line" => line.number, "instruction" => %operation);

        listing.instructions.push(Instruction::new(line.number, operation));

        Ok(())
    }

    fn define_label(
        &self,
        labels: &mut HashMap<String, usize>,
        name: &str,
        index: usize,
        line: usize,
    ) {
        trace!(self.logger, "define label"; "label" => name, "index" => index, "line" => line);

        if let Some(previous) = labels.insert(name.to_string(), index) {
            warn!(self.logger, "label redefined, using the last definition";
                "label" => name, "previous" => previous, "index" => index, "line" => line);
        }
    }

    fn operation(&self, line: &Line, name: &str, operands: &[Operand])
        -> Result<Operation, LineErrorKind>
    {
        let upper = name.to_uppercase();

        if let Some(condition) = upper.strip_prefix("B.") {
            let condition = condition.parse::<Condition>()
                .map_err(|()| LineErrorKind::UnsupportedCondition {
                    condition: name[2..].to_string(),
                })?;

            line.expect(&upper, operands, 1)?;

            return Ok(Operation::ConditionalBranch {
                condition,
                target: line.label(operands[0])?,
            });
        }

        let kind = match mnemonic::lookup(&upper) {
            Some(kind) => kind,
            None => return Err(LineErrorKind::UnsupportedInstruction {
                suggestion: mnemonic::suggest(&upper),
                mnemonic: upper,
            }),
        };

        let operation = match kind {
            Mnemonic::Register(opcode) => {
                line.expect(&upper, operands, 3)?;

                Operation::Register {
                    opcode,
                    rd: line.register(operands[0])?,
                    rn: line.register(operands[1])?,
                    rm: line.register(operands[2])?,
                }
            },
            Mnemonic::Immediate(opcode) => {
                line.expect(&upper, operands, 3)?;

                Operation::Immediate {
                    opcode,
                    rd: line.register(operands[0])?,
                    rn: line.register(operands[1])?,
                    immediate: line.immediate(operands[2], IMMEDIATE_MIN, IMMEDIATE_MAX)?,
                    shift: 0,
                }
            },
            Mnemonic::WideMove(opcode) => {
                if operands.len() != 2 && operands.len() != 3 {
                    line.expect(&upper, operands, 2)?;
                }

                let shift = match operands.get(2) {
                    Some(operand) => line.shift(operand)?,
                    None => 0,
                };

                let immediate = line.immediate(operands[1], IMMEDIATE_MIN, WIDE_IMMEDIATE_MAX)?;

                if immediate < 0 && shift != 0 {
                    return Err(LineErrorKind::InvalidShift { operand: line.text(operands[2]) });
                }

                Operation::Immediate {
                    opcode,
                    rd: line.register(operands[0])?,
                    rn: Register::XZR,
                    immediate,
                    shift,
                }
            },
            Mnemonic::Shift(register_opcode, immediate_opcode) => {
                line.expect(&upper, operands, 3)?;

                let rd = line.register(operands[0])?;
                let rn = line.register(operands[1])?;

                if is_literal(operands[2]) {
                    Operation::Immediate {
                        opcode: immediate_opcode,
                        rd,
                        rn,
                        immediate: line.immediate(operands[2], IMMEDIATE_MIN, IMMEDIATE_MAX)?,
                        shift: 0,
                    }
                } else {
                    Operation::Register {
                        opcode: register_opcode,
                        rd,
                        rn,
                        rm: line.register(operands[2])?,
                    }
                }
            },
            Mnemonic::Transfer(opcode) => {
                line.expect(&upper, operands, 2)?;

                let rt = line.register(operands[0])?;
                let (rn, offset) = line.memory(operands[1])?;

                Operation::Transfer { opcode, rt, rn, offset }
            },
            Mnemonic::Branch => {
                line.expect(&upper, operands, 1)?;
                Operation::Branch { target: line.label(operands[0])? }
            },
            Mnemonic::BranchLink => {
                line.expect(&upper, operands, 1)?;
                Operation::BranchLink { target: line.label(operands[0])? }
            },
            Mnemonic::BranchRegister => {
                line.expect(&upper, operands, 1)?;
                Operation::BranchRegister { rn: line.register(operands[0])? }
            },
            Mnemonic::CompareBranch(test) => {
                line.expect(&upper, operands, 2)?;

                Operation::CompareBranch {
                    test,
                    rt: line.register(operands[0])?,
                    target: line.label(operands[1])?,
                }
            },
            Mnemonic::Compare => {
                line.expect(&upper, operands, 2)?;

                Operation::Register {
                    opcode: RegisterOpCode::SubS,
                    rd: Register::XZR,
                    rn: line.register(operands[0])?,
                    rm: line.register(operands[1])?,
                }
            },
            Mnemonic::CompareImmediate => {
                line.expect(&upper, operands, 2)?;

                Operation::Immediate {
                    opcode: ImmediateOpCode::SubIS,
                    rd: Register::XZR,
                    rn: line.register(operands[0])?,
                    immediate: line.immediate(operands[1], IMMEDIATE_MIN, IMMEDIATE_MAX)?,
                    shift: 0,
                }
            },
            Mnemonic::Move => {
                line.expect(&upper, operands, 2)?;

                Operation::Register {
                    opcode: RegisterOpCode::Orr,
                    rd: line.register(operands[0])?,
                    rn: Register::XZR,
                    rm: line.register(operands[1])?,
                }
            },
        };

        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{TransferOpCode, ZeroTest};

    fn reg(index: usize) -> Register {
        Register::new(index).unwrap()
    }

    fn parse(source: &str) -> Program {
        Parser::new().parse(source).unwrap()
    }

    fn single_error(source: &str) -> LineError {
        let errors = Parser::new().parse(source).unwrap_err().into_errors();
        assert_eq!(errors.len(), 1, "{:?}", errors);
        errors.into_iter().next().unwrap()
    }

    #[test]
    fn test_parse_sum() {
        let program = parse(
            "ADDI X1, XZR, #10\n\
             ADDI X2, XZR, #20\n\
             ADD X3, X1, X2\n\
             STUR X3, [SP, #0]",
        );

        assert_eq!(program.len(), 4);

        assert_eq!(program.instructions()[0].operation, Operation::Immediate {
            opcode: ImmediateOpCode::AddI,
            rd: reg(1),
            rn: Register::XZR,
            immediate: 10,
            shift: 0,
        });

        assert_eq!(program.instructions()[2].operation, Operation::Register {
            opcode: RegisterOpCode::Add,
            rd: reg(3),
            rn: reg(1),
            rm: reg(2),
        });

        assert_eq!(program.instructions()[3].operation, Operation::Transfer {
            opcode: TransferOpCode::Stur,
            rt: reg(3),
            rn: Register::SP,
            offset: 0,
        });
    }

    #[test]
    fn test_comments_and_line_numbers() {
        let program = parse(
            "// sums two numbers\n\n    add x1, x2, x3 // x1 = x2 + x3\n  \n\tLDUR X4, [X5]",
        );

        assert_eq!(program.len(), 2);
        assert_eq!(program.instructions()[0].line, 3);
        assert_eq!(program.instructions()[1].line, 5);

        assert_eq!(program.instructions()[1].operation, Operation::Transfer {
            opcode: TransferOpCode::Ldur,
            rt: reg(4),
            rn: reg(5),
            offset: 0,
        });
    }

    #[test]
    fn test_label_resolution() {
        let program = parse(
            "ADDI X1, XZR, #3\n\
             loop: SUBI X1, X1, #1\n\
             CBNZ X1, loop\n\
             B done\n\
             ADD X2, X2, X2\n\
             done:",
        );

        assert_eq!(program.label_address("loop"), Some(4));
        assert_eq!(program.label_address("done"), Some(20));

        assert_eq!(program.instructions()[2].operation, Operation::CompareBranch {
            test: ZeroTest::NonZero,
            rt: reg(1),
            target: BranchTarget::Resolved { label: "loop".into(), address: 4 },
        });

        assert_eq!(program.instructions()[3].target().and_then(BranchTarget::address), Some(20));
    }

    #[test]
    fn test_self_loop() {
        let program = parse("ADDI X1, XZR, #1\nloop:\nB loop");
        let branch = &program.instructions()[1];

        assert_eq!(branch.target().and_then(BranchTarget::address), Some(4));
    }

    #[test]
    fn test_conditional_branch() {
        let program = parse("start: CMP X1, X2\nb.lt start\nB.HS start");

        assert_eq!(program.instructions()[1].operation, Operation::ConditionalBranch {
            condition: Condition::Lt,
            target: BranchTarget::Resolved { label: "start".into(), address: 0 },
        });

        assert_eq!(
            program.instructions()[2].target().map(BranchTarget::label),
            Some("start"),
        );
    }

    #[test]
    fn test_redefined_label() {
        let program = parse("a:\nADD X1, X1, X1\na:\nB a");

        assert_eq!(program.label_address("a"), Some(4));
        assert_eq!(program.instructions()[1].target().and_then(BranchTarget::address), Some(4));
    }

    #[test]
    fn test_pseudo_instructions() {
        let program = parse("CMP X1, X2\nCMPI X1, #-5\nMOV X3, X4");

        assert_eq!(program.instructions()[0].operation, Operation::Register {
            opcode: RegisterOpCode::SubS,
            rd: Register::XZR,
            rn: reg(1),
            rm: reg(2),
        });

        assert_eq!(program.instructions()[1].operation, Operation::Immediate {
            opcode: ImmediateOpCode::SubIS,
            rd: Register::XZR,
            rn: reg(1),
            immediate: -5,
            shift: 0,
        });

        assert_eq!(program.instructions()[2].operation, Operation::Register {
            opcode: RegisterOpCode::Orr,
            rd: reg(3),
            rn: Register::XZR,
            rm: reg(4),
        });
    }

    #[test]
    fn test_shift_forms() {
        let program = parse("LSL X1, X2, #3\nLSR X1, X2, X3");

        assert_eq!(program.instructions()[0].operation, Operation::Immediate {
            opcode: ImmediateOpCode::Lsl,
            rd: reg(1),
            rn: reg(2),
            immediate: 3,
            shift: 0,
        });

        assert_eq!(program.instructions()[1].operation, Operation::Register {
            opcode: RegisterOpCode::Lsr,
            rd: reg(1),
            rn: reg(2),
            rm: reg(3),
        });
    }

    #[test]
    fn test_wide_moves() {
        let program = parse("MOVZ X1, #0xFFFF, LSL #16\nMOVK X1, #42");

        assert_eq!(program.instructions()[0].operation, Operation::Immediate {
            opcode: ImmediateOpCode::MovZ,
            rd: reg(1),
            rn: Register::XZR,
            immediate: 0xFFFF,
            shift: 16,
        });

        assert_eq!(program.instructions()[1].operation, Operation::Immediate {
            opcode: ImmediateOpCode::MovK,
            rd: reg(1),
            rn: Register::XZR,
            immediate: 42,
            shift: 0,
        });

        assert_eq!(single_error("MOVK X1, #1, LSL #8").kind, LineErrorKind::InvalidShift {
            operand: "LSL #8".into(),
        });

        assert_eq!(single_error("MOVZ X1, #65536").kind, LineErrorKind::ImmediateOutOfRange {
            value: 65536,
            min: -2048,
            max: 0xFFFF,
        });
    }

    #[test]
    fn test_negative_wide_moves() {
        let program = parse("MOVZ X1, #-5
MOVK X2, #-2, LSL #0");

        assert_eq!(program.instructions()[0].operation, Operation::Immediate {
            opcode: ImmediateOpCode::MovZ,
            rd: reg(1),
            rn: Register::XZR,
            immediate: -5,
            shift: 0,
        });

        assert_eq!(program.instructions()[1].operation, Operation::Immediate {
            opcode: ImmediateOpCode::MovK,
            rd: reg(2),
            rn: Register::XZR,
            immediate: -2,
            shift: 0,
        });

        assert_eq!(single_error("MOVZ X1, #-5, LSL #16").kind, LineErrorKind::InvalidShift {
            operand: "LSL #16".into(),
        });

        assert_eq!(single_error("MOVZ X1, #-2049").kind, LineErrorKind::ImmediateOutOfRange {
            value: -2049,
            min: -2048,
            max: 0xFFFF,
        });
    }

    #[test]
    fn test_memory_offsets() {
        let program = parse("LDURW X1, [X2, #-8]\nSTURB X1, [X2, 0x10]");

        assert_eq!(program.instructions()[0].operation, Operation::Transfer {
            opcode: TransferOpCode::LdurW,
            rt: reg(1),
            rn: reg(2),
            offset: -8,
        });

        assert_eq!(program.instructions()[1].operation, Operation::Transfer {
            opcode: TransferOpCode::SturB,
            rt: reg(1),
            rn: reg(2),
            offset: 16,
        });
    }

    #[test]
    fn test_immediate_range() {
        assert!(Parser::new().parse("ADDI X1, X1, #-2048\nSUBI X1, X1, #2047").is_ok());

        let error = single_error("\nADDI X1, X1, #2048");

        assert_eq!(error.line, 2);
        assert_eq!(error.kind, LineErrorKind::ImmediateOutOfRange {
            value: 2048,
            min: IMMEDIATE_MIN,
            max: IMMEDIATE_MAX,
        });

        assert_eq!(single_error("ADDI X1, X1, #1x").kind, LineErrorKind::InvalidImmediate {
            operand: "#1x".into(),
        });
    }

    #[test]
    fn test_operand_errors() {
        assert_eq!(single_error("ADD X1, X2").kind, LineErrorKind::OperandCount {
            mnemonic: "ADD".into(),
            expected: 3,
            got: 2,
        });

        assert_eq!(single_error("ADD X1, X2, X32").kind, LineErrorKind::InvalidRegister {
            operand: "X32".into(),
        });

        assert_eq!(single_error("LDUR X1, X2").kind, LineErrorKind::InvalidMemoryOperand {
            operand: "X2".into(),
        });

        assert_eq!(single_error("STUR X1, [X2, #8").kind, LineErrorKind::InvalidMemoryOperand {
            operand: "[X2, #8".into(),
        });

        assert_eq!(single_error("B X1, X2").kind, LineErrorKind::OperandCount {
            mnemonic: "B".into(),
            expected: 1,
            got: 2,
        });

        assert_eq!(single_error("CBZ X1, #4").kind, LineErrorKind::InvalidLabel {
            operand: "#4".into(),
        });
    }

    #[test]
    fn test_unsupported_mnemonics() {
        assert_eq!(single_error("ADDD X1, X2, X3").kind, LineErrorKind::UnsupportedInstruction {
            mnemonic: "ADDD".into(),
            suggestion: Some("ADD"),
        });

        assert_eq!(single_error("B.XX done").kind, LineErrorKind::UnsupportedCondition {
            condition: "XX".into(),
        });

        assert_eq!(single_error("ADD X1, X2, X3 $").kind, LineErrorKind::UnexpectedCharacter {
            text: "$".into(),
        });

        assert_eq!(single_error("a.b: ADD X1, X2, X3").kind, LineErrorKind::InvalidLabel {
            operand: "a.b".into(),
        });
    }

    #[test]
    fn test_errors_are_aggregated() {
        let error = Parser::new()
            .parse("ADD X1, X2\nADDI X1, X1, #1\nFOO\nB nowhere\nLDUR X1, [X99]")
            .unwrap_err();

        let lines: Vec<usize> = error.errors().iter().map(|err| err.line).collect();

        assert_eq!(lines, vec![1, 3, 5]);
        assert!(!error.contains(|kind| matches!(kind, LineErrorKind::UndefinedLabel { .. })));
    }

    #[test]
    fn test_undefined_labels() {
        let error = Parser::new()
            .parse("B nowhere\nloop: ADD X1, X1, X1\nCBZ X1, elsewhere\nB loop")
            .unwrap_err();

        assert_eq!(error.errors(), &[
            LineError::new(1, LineErrorKind::UndefinedLabel { label: "nowhere".into() }),
            LineError::new(3, LineErrorKind::UndefinedLabel { label: "elsewhere".into() }),
        ][..]);
    }

    #[test]
    fn test_validate() {
        let parser = Parser::new();

        assert!(parser.validate("B nowhere").is_empty());

        let errors = parser.validate("ADD X1, X2, X3\nSUB X1\nB nowhere");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);
    }
}
