//! Hexadecimal program text.
//!
//! One 16-bit instruction word per whitespace-separated token, written in
//! hex with an optional `0x` prefix. Compilers emit one word per line.
//!
//! # Example
//! ```
//! use cicero_emu::interpreter::state::Program;
//!
//! let program = Program::parse_hex("4061\n4062\n0000\n")?;
//! assert_eq!(program.len(), 3);
//! # Ok::<(), cicero_emu::parser::ProgramError>(())
//! ```

use std::path::Path;

use thiserror::Error;

use crate::interpreter::decode::Instruction;
use crate::interpreter::state::{Program, PROGRAM_CAPACITY};
use crate::interpreter::traits::DecodeError;

/// Errors raised while loading a program.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// A token is not a 16-bit hexadecimal number.
    #[error("line {line}: invalid instruction word {token:?}")]
    InvalidWord {
        /// 1-based line number.
        line: usize,
        token: String,
    },

    /// A word decoded to an unknown instruction.
    #[error("line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: DecodeError,
    },

    /// The program text contains no instructions.
    #[error("program contains no instructions")]
    Empty,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parse one token as a 16-bit word.
fn parse_word(token: &str) -> Option<u16> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u16::from_str_radix(digits, 16).ok()
}

impl Program {
    /// Parse program text.
    ///
    /// Words past [`PROGRAM_CAPACITY`] are dropped with a warning.
    pub fn parse_hex(text: &str) -> Result<Self, ProgramError> {
        let mut instructions = Vec::new();
        let mut total = 0usize;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            for token in line.split_whitespace() {
                let word = parse_word(token).ok_or_else(|| ProgramError::InvalidWord {
                    line: line_no,
                    token: token.to_string(),
                })?;

                total += 1;
                if instructions.len() < PROGRAM_CAPACITY {
                    let inst = Instruction::decode(word)
                        .map_err(|source| ProgramError::Decode { line: line_no, source })?;
                    instructions.push(inst);
                }
            }
        }

        if instructions.is_empty() {
            return Err(ProgramError::Empty);
        }

        if total > PROGRAM_CAPACITY {
            log::warn!(
                "Program memory exceeded. Only the first {} of {} instructions were read",
                PROGRAM_CAPACITY,
                total
            );
        }

        let program = Self::from_instructions(instructions);
        log::trace!("Loaded program:\n{}", program.listing());
        Ok(program)
    }

    /// Read and parse a program file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProgramError::Io {
            path: path.display().to_string(),
            source,
        })?;

        log::debug!("Reading program file {}", path.display());
        Self::parse_hex(&text)
    }
}
