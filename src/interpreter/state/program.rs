//! Instruction memory.

use std::fmt::Write as _;

use crate::interpreter::decode::Instruction;
use crate::interpreter::traits::DecodeError;

/// Number of instruction slots (the program counter is 9 bits wide).
pub const PROGRAM_CAPACITY: usize = 512;

/// Mask applied to every program counter.
pub const PC_MASK: u16 = (PROGRAM_CAPACITY - 1) as u16;

/// Fixed-capacity instruction memory.
///
/// Always holds [`PROGRAM_CAPACITY`] slots; slots past the loaded prefix
/// contain word `0x0000` (`ACCEPT`), as zero-initialised hardware memory
/// would. The engine borrows a `Program` immutably for its whole lifetime,
/// so a program cannot change underneath a running match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    slots: Vec<Instruction>,
    /// Number of slots explicitly loaded.
    len: usize,
}

impl Default for Program {
    fn default() -> Self {
        Self {
            slots: vec![Instruction::default(); PROGRAM_CAPACITY],
            len: 0,
        }
    }
}

impl Program {
    /// Create an empty program (every slot `ACCEPT`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a program from decoded instructions.
    ///
    /// Instructions beyond [`PROGRAM_CAPACITY`] are dropped with a warning.
    pub fn from_instructions(instructions: impl IntoIterator<Item = Instruction>) -> Self {
        let mut program = Self::new();
        let mut dropped = 0usize;

        for inst in instructions {
            if program.len < PROGRAM_CAPACITY {
                program.slots[program.len] = inst;
                program.len += 1;
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            log::warn!(
                "Program memory exceeded. Only the first {} instructions were kept ({} dropped)",
                PROGRAM_CAPACITY,
                dropped
            );
        }

        program
    }

    /// Build a program from raw instruction words.
    pub fn from_words(words: &[u16]) -> Result<Self, DecodeError> {
        let instructions = words
            .iter()
            .map(|&w| Instruction::decode(w))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_instructions(instructions))
    }

    /// Number of explicitly loaded instructions.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fetch the instruction at `pc` (masked to 9 bits).
    #[inline]
    pub fn fetch(&self, pc: u16) -> Instruction {
        self.slots[usize::from(pc & PC_MASK)]
    }

    /// The loaded prefix of the program.
    pub fn instructions(&self) -> &[Instruction] {
        &self.slots[..self.len]
    }

    /// Disassembly listing of the loaded prefix, one `PPP: WWWW  MNEMONIC` line per slot.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for (pc, inst) in self.instructions().iter().enumerate() {
            let pc = pc as u16;
            let _ = writeln!(out, "{:03}: {:04x}  {}", pc, inst.word(), inst.disassemble(pc));
        }
        out
    }
}
