//! Core traits and shared result types for the interpreter.
//!
//! These define the boundaries between the pipeline model and anything that
//! drives it:
//!
//! - `Matcher`: anything that can decide whether an input matches the loaded
//!   program (the windowed engine, the reference simulation)
//! - `ClockResult`: what one clock cycle of the core or engine produced
//! - `DecodeError` / `LaneError`: the two internal failure kinds

use thiserror::Error;

/// Result of a single clock cycle.
///
/// `Accepted` and `Refused` are terminal for the current match attempt;
/// `Continue` means another cycle is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockResult {
    /// More cycles are needed.
    Continue,
    /// A thread reached an accepting instruction.
    Accepted,
    /// The match attempt ended without acceptance.
    Refused,
}

impl ClockResult {
    /// The terminal verdict carried by this result, if any.
    pub fn verdict(self) -> Option<Verdict> {
        match self {
            ClockResult::Continue => None,
            ClockResult::Accepted => Some(Verdict::Accepted),
            ClockResult::Refused => Some(Verdict::Refused),
        }
    }
}

/// Final verdict of a match attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Refused,
}

impl Verdict {
    /// `true` for `Accepted`.
    pub fn is_match(self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

impl From<Verdict> for ClockResult {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accepted => ClockResult::Accepted,
            Verdict::Refused => ClockResult::Refused,
        }
    }
}

/// Errors that can occur while decoding an instruction word.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The opcode field does not name one of the eight instruction kinds.
    #[error("malformed instruction: opcode {opcode} out of range")]
    MalformedInstruction {
        /// The offending opcode value.
        opcode: u8,
    },
}

/// Errors reported by the lane buffers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LaneError {
    /// A push addressed a lane that does not exist.
    #[error("pushing to non-existing lane {lane} (lane count {lanes})")]
    NoSuchLane {
        /// Requested lane.
        lane: usize,
        /// Number of physical lanes.
        lanes: usize,
    },
}

/// Trait for anything that can run the loaded program against an input.
///
/// Implementations must fully reinitialise their per-match state on every
/// call, so one matcher can serve any number of inputs in sequence.
///
/// # Example
///
/// ```ignore
/// let mut engine = Engine::new(&program, 4);
/// assert!(engine.is_match(b"ab"));
/// assert!(!engine.is_match(b"ac"));
/// ```
pub trait Matcher {
    /// Run one complete match attempt.
    fn is_match(&mut self, input: &[u8]) -> bool;
}
