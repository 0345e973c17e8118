//! Opcode and instruction word decoding.

use std::fmt;

use super::{OPERAND_BITS, OPERAND_MASK};
use crate::interpreter::traits::DecodeError;

/// The eight instruction kinds, numbered by their 3-bit encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Accept if the current symbol is end-of-input.
    Accept = 0,
    /// Fork: `pc + 1` now, `operand` one cycle later.
    Split = 1,
    /// Consume the current character if it equals `operand`.
    Match = 2,
    /// Unconditional jump to `operand`.
    Jmp = 3,
    /// Stop the whole engine without accepting.
    EndWithoutAccepting = 4,
    /// Consume any character.
    MatchAny = 5,
    /// Accept regardless of input position.
    AcceptPartial = 6,
    /// Continue (without consuming) if the current character differs from `operand`.
    NotMatch = 7,
}

impl Opcode {
    /// Decode a 3-bit opcode field.
    pub fn from_bits(bits: u8) -> Result<Self, DecodeError> {
        let opcode = match bits {
            0 => Opcode::Accept,
            1 => Opcode::Split,
            2 => Opcode::Match,
            3 => Opcode::Jmp,
            4 => Opcode::EndWithoutAccepting,
            5 => Opcode::MatchAny,
            6 => Opcode::AcceptPartial,
            7 => Opcode::NotMatch,
            _ => return Err(DecodeError::MalformedInstruction { opcode: bits }),
        };
        Ok(opcode)
    }

    /// The 3-bit encoding of this opcode.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Accept => "ACCEPT",
            Opcode::Split => "SPLIT",
            Opcode::Match => "MATCH",
            Opcode::Jmp => "JMP",
            Opcode::EndWithoutAccepting => "END_WITHOUT_ACCEPTING",
            Opcode::MatchAny => "MATCH_ANY",
            Opcode::AcceptPartial => "ACCEPT_PARTIAL",
            Opcode::NotMatch => "NOT_MATCH",
        }
    }

    /// Whether the operand is meaningful for this opcode.
    pub fn has_operand(self) -> bool {
        matches!(
            self,
            Opcode::Split | Opcode::Match | Opcode::Jmp | Opcode::NotMatch
        )
    }
}

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Opcode::from_bits(bits)
    }
}

/// A decoded 16-bit instruction.
///
/// Immutable; the word it was decoded from can be recovered with
/// [`Instruction::word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    opcode: Opcode,
    operand: u16,
}

impl Default for Instruction {
    /// Word `0x0000`, the content of unprogrammed instruction memory.
    fn default() -> Self {
        Self::accept()
    }
}

impl Instruction {
    /// Build an instruction from its fields. The operand is truncated to 13 bits.
    pub fn new(opcode: Opcode, operand: u16) -> Self {
        Self {
            opcode,
            operand: operand & OPERAND_MASK,
        }
    }

    /// Decode a raw instruction word.
    pub fn decode(word: u16) -> Result<Self, DecodeError> {
        let opcode = Opcode::from_bits((word >> OPERAND_BITS) as u8)?;
        Ok(Self::new(opcode, word))
    }

    /// Re-encode into a raw instruction word.
    pub fn word(self) -> u16 {
        (u16::from(self.opcode.bits()) << OPERAND_BITS) | self.operand
    }

    pub fn opcode(self) -> Opcode {
        self.opcode
    }

    pub fn operand(self) -> u16 {
        self.operand
    }

    pub fn accept() -> Self {
        Self::new(Opcode::Accept, 0)
    }

    pub fn split(target: u16) -> Self {
        Self::new(Opcode::Split, target)
    }

    pub fn match_char(ch: u8) -> Self {
        Self::new(Opcode::Match, u16::from(ch))
    }

    pub fn jmp(target: u16) -> Self {
        Self::new(Opcode::Jmp, target)
    }

    pub fn end_without_accepting() -> Self {
        Self::new(Opcode::EndWithoutAccepting, 0)
    }

    pub fn match_any() -> Self {
        Self::new(Opcode::MatchAny, 0)
    }

    pub fn accept_partial() -> Self {
        Self::new(Opcode::AcceptPartial, 0)
    }

    pub fn not_match(ch: u8) -> Self {
        Self::new(Opcode::NotMatch, u16::from(ch))
    }

    /// Disassemble with knowledge of the instruction's own address.
    ///
    /// Only `SPLIT` needs it, to show both branch targets.
    pub fn disassemble(self, pc: u16) -> String {
        match self.opcode {
            Opcode::Split => format!("SPLIT{{{},{}}}", pc.wrapping_add(1), self.operand),
            _ => self.to_string(),
        }
    }
}

/// Render a character operand: printable ASCII verbatim, anything else in hex.
fn fmt_char(operand: u16) -> String {
    match u8::try_from(operand) {
        Ok(b) if b.is_ascii_graphic() || b == b' ' => (b as char).to_string(),
        _ => format!("0x{:02X}", operand),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Opcode::Split | Opcode::Jmp => {
                write!(f, "{}({})", self.opcode.mnemonic(), self.operand)
            }
            Opcode::Match | Opcode::NotMatch => {
                write!(f, "{}({})", self.opcode.mnemonic(), fmt_char(self.operand))
            }
            _ => f.write_str(self.opcode.mnemonic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fields() {
        let inst = Instruction::decode(0x2003).unwrap();
        assert_eq!(inst.opcode(), Opcode::Split);
        assert_eq!(inst.operand(), 3);

        let inst = Instruction::decode(0xFFFF).unwrap();
        assert_eq!(inst.opcode(), Opcode::NotMatch);
        assert_eq!(inst.operand(), 0x1FFF);
    }

    #[test]
    fn test_word_reencodes() {
        for word in [0x0000u16, 0x2003, 0x4061, 0x6004, 0x8000, 0xA000, 0xC000, 0xE062] {
            assert_eq!(Instruction::decode(word).unwrap().word(), word);
        }
    }

    #[test]
    fn test_out_of_range_opcode_is_malformed() {
        assert_eq!(
            Opcode::from_bits(8),
            Err(DecodeError::MalformedInstruction { opcode: 8 })
        );
        assert!(Opcode::try_from(255u8).is_err());
        assert_eq!(Opcode::try_from(7u8), Ok(Opcode::NotMatch));
    }

    #[test]
    fn test_operand_truncated() {
        let inst = Instruction::new(Opcode::Jmp, 0xFFFF);
        assert_eq!(inst.operand(), 0x1FFF);
        assert_eq!(inst.opcode(), Opcode::Jmp);
    }

    #[test]
    fn test_default_is_accept() {
        assert_eq!(Instruction::default().word(), 0x0000);
        assert_eq!(Instruction::default().opcode(), Opcode::Accept);
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::accept().to_string(), "ACCEPT");
        assert_eq!(Instruction::match_char(b'a').to_string(), "MATCH(a)");
        assert_eq!(Instruction::not_match(b'\n').to_string(), "NOT_MATCH(0x0A)");
        assert_eq!(Instruction::jmp(12).to_string(), "JMP(12)");
        assert_eq!(Instruction::split(4).to_string(), "SPLIT(4)");
        assert_eq!(
            Instruction::end_without_accepting().to_string(),
            "END_WITHOUT_ACCEPTING"
        );
    }

    #[test]
    fn test_disassemble_split_shows_both_targets() {
        assert_eq!(Instruction::split(7).disassemble(2), "SPLIT{3,7}");
        assert_eq!(Instruction::match_any().disassemble(2), "MATCH_ANY");
    }

    #[test]
    fn test_has_operand() {
        assert!(Opcode::Match.has_operand());
        assert!(!Opcode::AcceptPartial.has_operand());
    }
}
