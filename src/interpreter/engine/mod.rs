//! Windowed matching engine.
//!
//! The `Engine` drives the core one clock cycle at a time over a window of
//! `W` input characters. After every cycle it recomputes which lanes still
//! hold work (queued threads or threads in a pipeline latch) and retires the
//! leading run of idle lanes, sliding the window forward.
//!
//! # Termination
//!
//! | Condition | Verdict |
//! |-----------|---------|
//! | `ACCEPT` on the end-of-input sentinel, or `ACCEPT_PARTIAL` | Accepted |
//! | `END_WITHOUT_ACCEPTING` executed | Refused |
//! | Window moved past the end of input | Refused |
//! | No thread queued or in flight | Refused |
//!
//! # Example
//!
//! ```
//! use cicero_emu::interpreter::decode::Instruction;
//! use cicero_emu::interpreter::engine::Engine;
//! use cicero_emu::interpreter::state::Program;
//!
//! let program = Program::from_instructions([
//!     Instruction::match_char(b'a'),
//!     Instruction::match_char(b'b'),
//!     Instruction::accept(),
//! ]);
//! let mut engine = Engine::new(&program, 4);
//! assert!(engine.is_match(b"ab"));
//! assert!(!engine.is_match(b"ac"));
//! ```

mod coordinator;

pub use coordinator::{Engine, EngineStatus, LaneActivity, MatchOutcome};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::decode::Instruction;
    use crate::interpreter::state::Program;
    use crate::interpreter::traits::Matcher;

    #[test]
    fn test_engine_as_matcher() {
        let program = Program::from_instructions([Instruction::match_any(), Instruction::accept()]);
        let mut engine = Engine::new(&program, 2);
        let matcher: &mut dyn Matcher = &mut engine;

        assert!(matcher.is_match(b"z"));
        assert!(!matcher.is_match(b""));
        assert!(!matcher.is_match(b"zz"));
    }
}
