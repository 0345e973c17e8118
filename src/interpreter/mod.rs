//! Cycle-level CICERO interpreter.
//!
//! This module models the CICERO matching datapath one clock cycle at a
//! time. It is designed for:
//!
//! - **Bit-exact decoding**: 16-bit instruction words, 3-bit opcode, 13-bit operand
//! - **Cycle accuracy**: three pipeline stages with explicit latches
//! - **Width-independent verdicts**: any window width gives the same answer
//! - **Easy testing**: a non-windowed reference matcher behind the same trait
//!
//! # Architecture
//!
//! - [`decode`]: instruction word decoding and disassembly
//! - [`state`]: program memory and per-lane thread queues
//! - [`core`]: the three-stage pipeline
//! - [`engine`]: clock driver and window slider
//! - [`reference`]: breadth-first simulation without pipeline or window
//!
//! # Example
//!
//! ```
//! use cicero_emu::interpreter::{Engine, Matcher, Program, ReferenceMatcher};
//!
//! // a|b
//! let program = Program::from_words(&[0x2003, 0x4061, 0x6004, 0x4062, 0x0000])?;
//! let mut engine = Engine::new(&program, 4);
//! let mut reference = ReferenceMatcher::new(&program);
//!
//! for input in [&b"a"[..], b"b", b"c"] {
//!     assert_eq!(engine.is_match(input), reference.is_match(input));
//! }
//! # Ok::<(), cicero_emu::interpreter::DecodeError>(())
//! ```

pub mod traits;
pub mod decode;
pub mod state;
pub mod core;
pub mod engine;
pub mod reference;

// Re-export key types for convenience
pub use traits::{ClockResult, DecodeError, LaneError, Matcher, Verdict};

pub use decode::{Instruction, Opcode};
pub use state::{Buffers, Continuation, Program, PC_MASK, PROGRAM_CAPACITY};
pub use self::core::{Core, CycleSnapshot, Symbol, WindowPosition};
pub use engine::{Engine, EngineStatus, MatchOutcome};
pub use reference::ReferenceMatcher;
