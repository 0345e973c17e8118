//! Instruction decoder for CICERO bytecode.
//!
//! Every instruction is a single 16-bit word:
//!
//! | Bits | Field | Meaning |
//! |------|-------|---------|
//! | 15:13 | opcode | one of the eight [`Opcode`] kinds |
//! | 12:0 | operand | jump target, match character or split target |
//!
//! | Opcode | Mnemonic | Operand |
//! |--------|----------|---------|
//! | 0 | `ACCEPT` | unused |
//! | 1 | `SPLIT` | second branch target |
//! | 2 | `MATCH` | character |
//! | 3 | `JMP` | target |
//! | 4 | `END_WITHOUT_ACCEPTING` | unused |
//! | 5 | `MATCH_ANY` | unused |
//! | 6 | `ACCEPT_PARTIAL` | unused |
//! | 7 | `NOT_MATCH` | character |
//!
//! # Example
//!
//! ```
//! use cicero_emu::interpreter::decode::{Instruction, Opcode};
//!
//! let inst = Instruction::decode(0x4061).unwrap();
//! assert_eq!(inst.opcode(), Opcode::Match);
//! assert_eq!(inst.operand(), u16::from(b'a'));
//! ```

mod decoder;

pub use decoder::{Instruction, Opcode};

/// Width of an instruction word in bits.
pub const INSTRUCTION_BITS: u32 = 16;

/// Width of the opcode field in bits.
pub const OPCODE_BITS: u32 = 3;

/// Width of the operand field in bits.
pub const OPERAND_BITS: u32 = INSTRUCTION_BITS - OPCODE_BITS;

/// Mask selecting the operand field.
pub const OPERAND_MASK: u16 = (1 << OPERAND_BITS) - 1;
