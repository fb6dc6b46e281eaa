use std::collections::HashMap;
use std::convert::TryFrom;

use crate::error::ParseError;
use crate::instruction::Instruction;

use super::parser::Parser;

/// An assembled program: the instructions in source order together with the label table.
///
/// The instruction at index `i` lives at byte address `4 * i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,

    /// Maps label names to the index of the instruction they precede.
    labels: HashMap<String, usize>,
}

impl Program {
    pub(crate) fn new(instructions: Vec<Instruction>, labels: HashMap<String, usize>) -> Program {
        Program { instructions, labels }
    }

    /// Assembles `source` with a [Parser] that does not log.
    pub fn parse(source: &str) -> Result<Program, ParseError> {
        Parser::new().parse(source)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions[..]
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the instruction at byte address `pc`, if `pc` is aligned and within the program.
    pub fn fetch(&self, pc: u64) -> Option<&Instruction> {
        if pc % 4 != 0 {
            return None;
        }

        usize::try_from(pc / 4)
            .ok()
            .and_then(|index| self.instructions.get(index))
    }

    /// Byte address of the instruction following the label.
    pub fn label_address(&self, label: &str) -> Option<u64> {
        self.labels.get(label).map(|&index| index as u64 * 4)
    }

    /// Source line of the instruction at `pc`.
    pub fn line_for_pc(&self, pc: u64) -> Option<usize> {
        self.fetch(pc).map(|instruction| instruction.line)
    }

    /// Iterates over every label and its byte address, in no particular order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, u64)> {
        self.labels
            .iter()
            .map(|(label, &index)| (label.as_str(), index as u64 * 4))
    }
}
