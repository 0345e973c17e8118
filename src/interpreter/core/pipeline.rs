//! Pipeline registers and per-cycle stage logic.

use crate::interpreter::decode::{Instruction, Opcode};
use crate::interpreter::state::{lane_offset, Buffers, Continuation, Program, PC_MASK};
use crate::interpreter::traits::{ClockResult, Verdict};

/// The character a thread runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// An input byte.
    Byte(u8),
    /// End-of-input sentinel, distinct from every byte.
    End,
}

impl Symbol {
    /// Symbol at `index`, or `None` if `index` lies past the sentinel.
    pub fn at(input: &[u8], index: usize) -> Option<Self> {
        match input.get(index) {
            Some(&b) => Some(Symbol::Byte(b)),
            None if index == input.len() => Some(Symbol::End),
            None => None,
        }
    }

    /// `true` if this is the byte whose code equals `operand`.
    pub fn is_char(self, operand: u16) -> bool {
        matches!(self, Symbol::Byte(b) if u16::from(b) == operand)
    }
}

/// Where the window currently sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowPosition {
    /// Absolute input offset of the window's first character.
    pub index: usize,
    /// Physical lane holding window offset 0.
    pub base_lane: usize,
}

/// One pipeline latch entry: an instruction and the thread that fetched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pub instruction: Instruction,
    pub thread: Continuation,
}

/// Output signals of the execute stage, as seen from the HDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreSignals {
    /// The last executed instruction accepted.
    pub accept: bool,
    /// The last executed instruction produced a successor.
    pub valid: bool,
    /// Cleared by `END_WITHOUT_ACCEPTING`.
    pub running: bool,
}

impl Default for CoreSignals {
    fn default() -> Self {
        Self {
            accept: false,
            valid: false,
            running: true,
        }
    }
}

/// Everything the three stages read during one cycle, captured before any write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSnapshot {
    /// Head of the first non-empty window lane, if any.
    pub fetch: Option<Continuation>,
    /// Stage-1 latch as it stood at the start of the cycle.
    pub stage2: Option<InFlight>,
    /// Stage-2 latch as it stood at the start of the cycle.
    pub stage3: Option<InFlight>,
}

impl CycleSnapshot {
    pub fn stage1_ready(&self) -> bool {
        self.fetch.is_some()
    }

    pub fn stage2_ready(&self) -> bool {
        self.stage2.is_some()
    }

    pub fn stage3_ready(&self) -> bool {
        self.stage3.is_some()
    }
}

/// What executing one latched instruction did to its thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// The thread continues at the given continuation (lane not yet wrapped).
    Successor(Continuation),
    /// The thread dies.
    Dead,
    /// The whole match accepts.
    Accept,
    /// The whole engine stops without accepting.
    Halt,
}

/// The three-stage pipeline.
///
/// Borrows its program for its whole lifetime; the latches store decoded
/// instructions by value, never references into the program.
#[derive(Debug, Clone)]
pub struct Core<'p> {
    program: &'p Program,
    /// Stage 1 -> 2 latch.
    stage1: Option<InFlight>,
    /// Stage 2 -> 3 latch; only ever holds a `SPLIT`.
    stage2: Option<InFlight>,
    signals: CoreSignals,
}

impl<'p> Core<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            stage1: None,
            stage2: None,
            signals: CoreSignals::default(),
        }
    }

    /// Clear both latches and all signals.
    pub fn reset(&mut self) {
        self.stage1 = None;
        self.stage2 = None;
        self.signals = CoreSignals::default();
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn signals(&self) -> CoreSignals {
        self.signals
    }

    pub fn is_accepted(&self) -> bool {
        self.signals.accept
    }

    pub fn is_valid(&self) -> bool {
        self.signals.valid
    }

    pub fn is_running(&self) -> bool {
        self.signals.running
    }

    /// Contents of the stage 1 -> 2 latch.
    pub fn stage1_latch(&self) -> Option<InFlight> {
        self.stage1
    }

    /// Contents of the stage 2 -> 3 latch.
    pub fn stage2_latch(&self) -> Option<InFlight> {
        self.stage2
    }

    /// `true` when no instruction is in flight.
    pub fn is_idle(&self) -> bool {
        self.stage1.is_none() && self.stage2.is_none()
    }

    /// Capture the read phase of a cycle.
    pub fn snapshot(&self, buffers: &Buffers, base_lane: usize) -> CycleSnapshot {
        CycleSnapshot {
            fetch: buffers
                .first_non_empty_lane(base_lane)
                .and_then(|lane| buffers.front(lane)),
            stage2: self.stage1,
            stage3: self.stage2,
        }
    }

    /// Run one clock cycle.
    ///
    /// Returns `Accepted` or `Refused` as soon as the execute stage decides
    /// the match; otherwise `Continue`.
    pub fn run_clock(
        &mut self,
        input: &[u8],
        window: WindowPosition,
        buffers: &mut Buffers,
    ) -> ClockResult {
        // Read phase: nothing below may observe a write made this cycle.
        let snapshot = self.snapshot(buffers, window.base_lane);

        log::trace!(
            "Stages ready: {}, {}, {}",
            snapshot.stage1_ready(),
            snapshot.stage2_ready(),
            snapshot.stage3_ready()
        );

        self.fetch(&snapshot);

        if let Some(verdict) = self.execute(&snapshot, input, window, buffers) {
            return verdict.into();
        }

        self.deliver_split(&snapshot, buffers);
        self.writeback(&snapshot, buffers);

        ClockResult::Continue
    }

    /// Stage 1: latch the fetched thread and its instruction, or stall.
    fn fetch(&mut self, snapshot: &CycleSnapshot) {
        self.stage1 = snapshot.fetch.map(|thread| {
            let instruction = self.program.fetch(thread.pc);
            log::trace!(
                "\t(PC{})(lane{})(S1) {}",
                thread.pc,
                thread.lane,
                instruction.disassemble(thread.pc)
            );
            InFlight { instruction, thread }
        });
    }

    /// Stage 2: execute the instruction latched last cycle.
    fn execute(
        &mut self,
        snapshot: &CycleSnapshot,
        input: &[u8],
        window: WindowPosition,
        buffers: &mut Buffers,
    ) -> Option<Verdict> {
        let Some(latched) = snapshot.stage2 else {
            self.stage2 = None;
            return None;
        };

        let offset = lane_offset(latched.thread.lane, window.base_lane, buffers.lane_count());
        let index = window.index + offset;

        let Some(symbol) = Symbol::at(input, index) else {
            // Past the end of the input: the thread leaves no successor.
            log::trace!(
                "\t(PC{})(lane{})(S2) input index {} out of range",
                latched.thread.pc,
                latched.thread.lane,
                index
            );
            self.stage2 = None;
            return None;
        };

        log::trace!(
            "\t(PC{})(lane{})(S2) {} on {:?}",
            latched.thread.pc,
            latched.thread.lane,
            latched.instruction.disassemble(latched.thread.pc),
            symbol
        );

        self.stage2 = (latched.instruction.opcode() == Opcode::Split).then_some(latched);

        match self.step_thread(latched, symbol) {
            Outcome::Successor(next) => {
                push(buffers, next);
                None
            }
            Outcome::Dead => None,
            Outcome::Accept => Some(Verdict::Accepted),
            Outcome::Halt => Some(Verdict::Refused),
        }
    }

    /// Opcode semantics. Updates the output signals.
    fn step_thread(&mut self, latched: InFlight, symbol: Symbol) -> Outcome {
        let InFlight { instruction, thread } = latched;
        let operand = instruction.operand();
        let next_pc = thread.pc.wrapping_add(1) & PC_MASK;

        self.signals = CoreSignals::default();

        let outcome = match instruction.opcode() {
            Opcode::Accept => {
                if symbol == Symbol::End {
                    Outcome::Accept
                } else {
                    Outcome::Dead
                }
            }
            Opcode::Split => Outcome::Successor(Continuation::new(next_pc, thread.lane)),
            Opcode::Match => {
                if symbol.is_char(operand) {
                    Outcome::Successor(Continuation::new(next_pc, thread.lane + 1))
                } else {
                    Outcome::Dead
                }
            }
            Opcode::Jmp => Outcome::Successor(Continuation::new(operand & PC_MASK, thread.lane)),
            Opcode::EndWithoutAccepting => Outcome::Halt,
            Opcode::MatchAny => Outcome::Successor(Continuation::new(next_pc, thread.lane + 1)),
            Opcode::AcceptPartial => Outcome::Accept,
            // Zero-width: the lane does not advance.
            Opcode::NotMatch => {
                if symbol.is_char(operand) {
                    Outcome::Dead
                } else {
                    Outcome::Successor(Continuation::new(next_pc, thread.lane))
                }
            }
        };

        match outcome {
            Outcome::Successor(_) => self.signals.valid = true,
            Outcome::Accept => self.signals.accept = true,
            Outcome::Halt => self.signals.running = false,
            Outcome::Dead => {}
        }

        outcome
    }

    /// Stage 3: deliver the second branch of last cycle's `SPLIT`.
    fn deliver_split(&self, snapshot: &CycleSnapshot, buffers: &mut Buffers) {
        if let Some(split) = snapshot.stage3 {
            log::trace!(
                "\t(PC{})(lane{})(S3) {}",
                split.thread.pc,
                split.thread.lane,
                split.instruction.disassemble(split.thread.pc)
            );
            let target = split.instruction.operand() & PC_MASK;
            push(buffers, Continuation::new(target, split.thread.lane));
        }
    }

    /// Writeback: consume the thread stage 1 fetched this cycle.
    fn writeback(&self, snapshot: &CycleSnapshot, buffers: &mut Buffers) {
        if let Some(thread) = snapshot.fetch {
            if buffers.pop_front(thread.lane).is_some() {
                log::trace!("\t\tConsumed PC{} from lane {}", thread.pc, thread.lane);
            } else {
                log::error!("Writeback found lane {} empty", thread.lane);
            }
        }
    }
}

/// Enqueue a continuation on its (wrapped) lane; bad lanes are reported and dropped.
fn push(buffers: &mut Buffers, thread: Continuation) {
    let lane = thread.lane % buffers.lane_count();
    log::trace!("\t\tPushing PC{} to lane {}", thread.pc, lane);
    if let Err(e) = buffers.push_to(lane, thread.pc) {
        log::error!("Dropped thread PC{}: {}", thread.pc, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(instructions: &[Instruction]) -> Program {
        Program::from_instructions(instructions.iter().copied())
    }

    /// Seed one thread, then clock twice: fetch, then execute.
    fn execute_single(
        program: &Program,
        input: &[u8],
        window: WindowPosition,
        window_width: usize,
        lane: usize,
    ) -> (ClockResult, Buffers, CoreSignals) {
        let mut core = Core::new(program);
        let mut buffers = Buffers::new(window_width);
        buffers.push_to(lane, 0).unwrap();

        assert_eq!(core.run_clock(input, window, &mut buffers), ClockResult::Continue);
        let result = core.run_clock(input, window, &mut buffers);
        (result, buffers, core.signals())
    }

    #[test]
    fn test_symbol_at() {
        assert_eq!(Symbol::at(b"ab", 1), Some(Symbol::Byte(b'b')));
        assert_eq!(Symbol::at(b"ab", 2), Some(Symbol::End));
        assert_eq!(Symbol::at(b"ab", 3), None);
        assert_eq!(Symbol::at(b"", 0), Some(Symbol::End));
    }

    #[test]
    fn test_fetch_pops_at_writeback() {
        let program = program(&[Instruction::match_char(b'a')]);
        let mut core = Core::new(&program);
        let mut buffers = Buffers::new(1);
        buffers.push_to(0, 0).unwrap();

        let snapshot = core.snapshot(&buffers, 0);
        assert_eq!(snapshot.fetch, Some(Continuation::new(0, 0)));
        assert!(!snapshot.stage2_ready());

        core.run_clock(b"a", WindowPosition::default(), &mut buffers);

        assert!(buffers.is_empty(0));
        let latched = core.stage1_latch().unwrap();
        assert_eq!(latched.instruction, Instruction::match_char(b'a'));
        assert_eq!(latched.thread, Continuation::new(0, 0));
    }

    #[test]
    fn test_execute_is_one_cycle_behind_fetch() {
        let program = program(&[Instruction::match_char(b'a')]);
        let mut core = Core::new(&program);
        let mut buffers = Buffers::new(1);
        buffers.push_to(0, 0).unwrap();

        core.run_clock(b"a", WindowPosition::default(), &mut buffers);
        // Fetched but not yet executed: no successor anywhere.
        assert!(buffers.are_all_empty());

        core.run_clock(b"a", WindowPosition::default(), &mut buffers);
        assert_eq!(buffers.front(1), Some(Continuation::new(1, 1)));
        assert!(core.is_idle());
    }

    #[test]
    fn test_split_fan_out_timing() {
        let program = program(&[Instruction::split(5)]);
        let mut core = Core::new(&program);
        let mut buffers = Buffers::new(1);
        let window = WindowPosition::default();
        buffers.push_to(0, 0).unwrap();

        // Cycle 1: fetch SPLIT.
        core.run_clock(b"x", window, &mut buffers);
        assert!(buffers.is_empty(0));

        // Cycle 2: execute. Only the first branch is delivered.
        core.run_clock(b"x", window, &mut buffers);
        assert_eq!(buffers.len(0), 1);
        assert_eq!(buffers.front(0), Some(Continuation::new(1, 0)));
        assert_eq!(core.stage2_latch().map(|l| l.thread), Some(Continuation::new(0, 0)));
        // The fetch of this cycle saw the lane empty.
        assert!(core.stage1_latch().is_none());

        // Cycle 3: stage 3 delivers the second branch while stage 1 fetches
        // the first one; writeback pops only the fetched head.
        core.run_clock(b"x", window, &mut buffers);
        assert_eq!(buffers.len(0), 1);
        assert_eq!(buffers.front(0), Some(Continuation::new(5, 0)));
        assert_eq!(core.stage1_latch().map(|l| l.thread), Some(Continuation::new(1, 0)));
        assert!(core.stage2_latch().is_none());
    }

    #[test]
    fn test_accept_only_at_end_of_input() {
        let program = program(&[Instruction::accept()]);

        let (result, buffers, signals) =
            execute_single(&program, b"a", WindowPosition::default(), 1, 0);
        assert_eq!(result, ClockResult::Continue);
        assert!(buffers.are_all_empty());
        assert!(!signals.accept);

        let (result, _, signals) = execute_single(&program, b"", WindowPosition::default(), 1, 0);
        assert_eq!(result, ClockResult::Accepted);
        assert!(signals.accept);
    }

    #[test]
    fn test_accept_partial_anywhere() {
        let program = program(&[Instruction::accept_partial()]);
        let (result, _, _) = execute_single(&program, b"abc", WindowPosition::default(), 1, 0);
        assert_eq!(result, ClockResult::Accepted);
    }

    #[test]
    fn test_end_without_accepting_refuses() {
        let program = program(&[Instruction::end_without_accepting()]);
        let (result, _, signals) = execute_single(&program, b"abc", WindowPosition::default(), 1, 0);
        assert_eq!(result, ClockResult::Refused);
        assert!(!signals.running);
    }

    #[test]
    fn test_match_advances_lane() {
        let program = program(&[Instruction::match_char(b'q')]);

        let (_, buffers, signals) = execute_single(&program, b"q", WindowPosition::default(), 2, 0);
        assert!(signals.valid);
        assert_eq!(buffers.front(1), Some(Continuation::new(1, 1)));

        let (_, buffers, signals) = execute_single(&program, b"r", WindowPosition::default(), 2, 0);
        assert!(!signals.valid);
        assert!(buffers.are_all_empty());

        // Never matches the sentinel.
        let (_, buffers, _) = execute_single(&program, b"", WindowPosition::default(), 2, 0);
        assert!(buffers.are_all_empty());
    }

    #[test]
    fn test_match_successor_wraps_lane() {
        // Window width 1: lanes 0 and 1. Base lane 1 means lane 1 is offset 0.
        let program = program(&[Instruction::match_char(b'b')]);
        let window = WindowPosition { index: 1, base_lane: 1 };
        let (_, buffers, _) = execute_single(&program, b"ab", window, 1, 1);
        assert_eq!(buffers.front(0), Some(Continuation::new(1, 0)));
    }

    #[test]
    fn test_not_match_keeps_lane() {
        let program = program(&[Instruction::not_match(b'x')]);

        let (_, buffers, signals) = execute_single(&program, b"y", WindowPosition::default(), 2, 0);
        assert!(signals.valid);
        // Zero-width: successor stays on the same lane.
        assert_eq!(buffers.front(0), Some(Continuation::new(1, 0)));
        assert!(buffers.is_empty(1));

        let (_, buffers, _) = execute_single(&program, b"x", WindowPosition::default(), 2, 0);
        assert!(buffers.are_all_empty());

        // The sentinel differs from every character.
        let (_, buffers, _) = execute_single(&program, b"", WindowPosition::default(), 2, 0);
        assert_eq!(buffers.front(0), Some(Continuation::new(1, 0)));
    }

    #[test]
    fn test_jmp_same_lane() {
        let program = program(&[Instruction::jmp(42)]);
        let (_, buffers, _) = execute_single(&program, b"z", WindowPosition::default(), 1, 0);
        assert_eq!(buffers.front(0), Some(Continuation::new(42, 0)));
    }

    #[test]
    fn test_match_any_consumes_even_the_sentinel() {
        let program = program(&[Instruction::match_any()]);
        let (_, buffers, signals) = execute_single(&program, b"", WindowPosition::default(), 1, 0);
        assert!(signals.valid);
        assert_eq!(buffers.front(1), Some(Continuation::new(1, 1)));
    }

    #[test]
    fn test_out_of_range_thread_is_suppressed() {
        let program = program(&[Instruction::match_any()]);
        // Lane 1 is offset 1 from base 0: index 1 + 1 = 2 > len 1.
        let window = WindowPosition { index: 1, base_lane: 0 };
        let (result, buffers, signals) = execute_single(&program, b"a", window, 2, 1);
        assert_eq!(result, ClockResult::Continue);
        assert!(buffers.are_all_empty());
        // Signals untouched by a suppressed thread.
        assert_eq!(signals, CoreSignals::default());
    }

    #[test]
    fn test_reset_clears_latches() {
        let program = program(&[Instruction::split(0)]);
        let mut core = Core::new(&program);
        let mut buffers = Buffers::new(1);
        buffers.push_to(0, 0).unwrap();
        core.run_clock(b"", WindowPosition::default(), &mut buffers);
        assert!(!core.is_idle());

        core.reset();
        assert!(core.is_idle());
        assert!(core.is_running());
    }
}
