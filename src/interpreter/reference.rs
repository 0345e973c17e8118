//! Non-windowed reference simulation.
//!
//! A plain Thompson VM over the same bytecode: one thread list for the
//! current input position, one for the next, swapped after each position.
//! No pipeline, no lanes, no window. Used as the baseline the windowed
//! engine is checked against.

use std::collections::VecDeque;
use std::mem;

use crate::interpreter::core::Symbol;
use crate::interpreter::decode::Opcode;
use crate::interpreter::state::{Program, PC_MASK, PROGRAM_CAPACITY};
use crate::interpreter::traits::{Matcher, Verdict};

/// FIFO of program counters with at most one entry per PC per position.
#[derive(Debug, Clone)]
struct ThreadList {
    queue: VecDeque<u16>,
    seen: Vec<bool>,
}

impl ThreadList {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            seen: vec![false; PROGRAM_CAPACITY],
        }
    }

    fn add_thread(&mut self, pc: u16) {
        let pc = pc & PC_MASK;
        let seen = &mut self.seen[usize::from(pc)];
        if !*seen {
            *seen = true;
            self.queue.push_back(pc);
        }
    }

    fn next(&mut self) -> Option<u16> {
        self.queue.pop_front()
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.seen.fill(false);
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Breadth-first single-thread simulation of a program.
#[derive(Debug, Clone)]
pub struct ReferenceMatcher<'p> {
    program: &'p Program,
    current: ThreadList,
    next: ThreadList,
}

impl<'p> ReferenceMatcher<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            current: ThreadList::new(),
            next: ThreadList::new(),
        }
    }

    /// Run the program over `input` and return the verdict.
    pub fn run(&mut self, input: &[u8]) -> Verdict {
        self.current.clear();
        self.next.clear();
        self.current.add_thread(0);

        for index in 0..=input.len() {
            let symbol = Symbol::at(input, index).unwrap_or(Symbol::End);
            let last = index == input.len();

            while let Some(pc) = self.current.next() {
                let inst = self.program.fetch(pc);
                let next_pc = pc.wrapping_add(1);

                match inst.opcode() {
                    Opcode::Accept => {
                        if symbol == Symbol::End {
                            return Verdict::Accepted;
                        }
                    }
                    Opcode::AcceptPartial => return Verdict::Accepted,
                    Opcode::EndWithoutAccepting => return Verdict::Refused,
                    Opcode::Split => {
                        self.current.add_thread(next_pc);
                        self.current.add_thread(inst.operand());
                    }
                    Opcode::Jmp => self.current.add_thread(inst.operand()),
                    Opcode::Match => {
                        if symbol.is_char(inst.operand()) {
                            self.next.add_thread(next_pc);
                        }
                    }
                    Opcode::MatchAny => {
                        if !last {
                            self.next.add_thread(next_pc);
                        }
                    }
                    Opcode::NotMatch => {
                        if !symbol.is_char(inst.operand()) {
                            self.current.add_thread(next_pc);
                        }
                    }
                }
            }

            if self.next.is_empty() {
                break;
            }

            mem::swap(&mut self.current, &mut self.next);
            self.next.clear();
        }

        Verdict::Refused
    }
}

impl Matcher for ReferenceMatcher<'_> {
    fn is_match(&mut self, input: &[u8]) -> bool {
        self.run(input).is_match()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::decode::Instruction;

    fn program(instructions: &[Instruction]) -> Program {
        Program::from_instructions(instructions.iter().copied())
    }

    #[test]
    fn test_concatenation() {
        let program = program(&[
            Instruction::match_char(b'a'),
            Instruction::match_char(b'b'),
            Instruction::accept(),
        ]);
        let mut reference = ReferenceMatcher::new(&program);
        assert!(reference.is_match(b"ab"));
        assert!(!reference.is_match(b"a"));
        assert!(!reference.is_match(b"ac"));
        assert!(!reference.is_match(b"abc"));
    }

    #[test]
    fn test_alternation() {
        let program = program(&[
            Instruction::split(3),
            Instruction::match_char(b'a'),
            Instruction::jmp(4),
            Instruction::match_char(b'b'),
            Instruction::accept(),
        ]);
        let mut reference = ReferenceMatcher::new(&program);
        assert!(reference.is_match(b"a"));
        assert!(reference.is_match(b"b"));
        assert!(!reference.is_match(b"c"));
    }

    #[test]
    fn test_star() {
        // a*b
        let program = program(&[
            Instruction::split(3),
            Instruction::match_char(b'a'),
            Instruction::jmp(0),
            Instruction::match_char(b'b'),
            Instruction::accept(),
        ]);
        let mut reference = ReferenceMatcher::new(&program);
        assert!(reference.is_match(b"aaab"));
        assert!(reference.is_match(b"b"));
        assert!(!reference.is_match(b"aaac"));
    }

    #[test]
    fn test_epsilon_loop_terminates() {
        let program = program(&[Instruction::split(2), Instruction::jmp(0), Instruction::accept()]);
        let mut reference = ReferenceMatcher::new(&program);
        assert!(reference.is_match(b""));
        assert!(!reference.is_match(b"a"));
    }

    #[test]
    fn test_accept_partial_and_halt() {
        let partial = program(&[Instruction::accept_partial()]);
        assert!(ReferenceMatcher::new(&partial).is_match(b""));
        assert!(ReferenceMatcher::new(&partial).is_match(b"xyz"));

        let halt = program(&[Instruction::end_without_accepting()]);
        assert!(!ReferenceMatcher::new(&halt).is_match(b""));
    }

    #[test]
    fn test_not_match_is_zero_width() {
        // [^x] then 'y' on the same character.
        let program = program(&[
            Instruction::not_match(b'x'),
            Instruction::match_char(b'y'),
            Instruction::accept(),
        ]);
        let mut reference = ReferenceMatcher::new(&program);
        assert!(reference.is_match(b"y"));
        assert!(!reference.is_match(b"x"));
    }
}
