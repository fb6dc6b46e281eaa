//! Assembling LEGv8 source into [Programs](Program).

pub mod mnemonic;
pub mod token;

mod parser;
mod program;

pub use parser::{Parser, IMMEDIATE_MAX, IMMEDIATE_MIN, WIDE_IMMEDIATE_MAX};
pub use program::Program;
