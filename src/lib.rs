//! An assembler and instruction-set simulator for LEGv8, the 64-bit ARM subset used in teaching
//! computer organization.
//!
//! Currently this crate provides the functionality to:
//! - Assemble LEGv8 source into [Programs](assembler::Program), reporting every faulty line at
//!   once.
//! - Execute programs one instruction at a time or until they finish, with a bounded
//!   instruction count.
//! - Observe register and memory changes through [event listeners](event::EventListener).
//!
//! # Unimplemented stuff
//! - Floating point instructions
//! - True overflow and carry flags. Only `N` and `Z` are computed, `V` and `C` stay cleared.
//! - Binary encoding of instructions
//!
//! # Example
//! ```
//! use legv8::{
//!     assembler::Program,
//!     cpu::Cpu,
//! };
//!
//! // Adds 10 and 20 together and stores the sum on top of the stack.
//! let source = r#"
//!     ADDI X1, XZR, #10
//!     ADDI X2, XZR, #20
//!     ADD  X3, X1, X2
//!     STUR X3, [SP, #0]
//! "#;
//!
//! // Assemble the source. Labels are resolved into addresses.
//! let program = Program::parse(source).unwrap();
//!
//! // Execute the program until the program counter leaves it.
//! let mut cpu = Cpu::new();
//! cpu.run(&program).expect("an error occured while executing the program");
//!
//! assert_eq!(cpu.registers.read(3), Ok(30));
//! assert_eq!(cpu.memory.read_doubleword(0), Ok(30));
//! assert!(cpu.halted());
//! ```
//!
//! # Executables
//!
//! ## `legv8run`
//!
//! Assembles and executes a source file and prints the final state of the CPU. Built with the
//! `legv8run` (or `tools`) feature.
//!
//! ```text
//! $ legv8run --trace sum.s
//!     3  ADDI X1, X31, #10            -> 0x0004
//!        X1 = 10
//!     4  ADDI X2, X31, #20            -> 0x0008
//!        X2 = 20
//! ...
//! ```
pub mod assembler;
pub mod config;
pub mod cpu;
pub mod error;
pub mod event;
pub mod execution;
pub mod instruction;
pub mod memory;
pub mod parsing;
pub mod registers;

pub use assembler::{Parser, Program};
pub use config::Config;
pub use cpu::Cpu;
