//! Storage owned by the matching pipeline.
//!
//! | Component | Owner | Lifetime |
//! |-----------|-------|----------|
//! | [`Program`] | caller | outlives the engine, borrowed read-only |
//! | [`Buffers`] | engine | one per engine, flushed on every reset |
//!
//! # Example
//!
//! ```
//! use cicero_emu::interpreter::state::{Buffers, Continuation};
//!
//! let mut buffers = Buffers::new(2);
//! buffers.push_to(0, 4).unwrap();
//! assert_eq!(buffers.pop_front(0), Some(Continuation::new(4, 0)));
//! ```

mod buffers;
mod program;

pub use buffers::{lane_offset, modulo, Buffers, Continuation};
pub use program::{Program, PC_MASK, PROGRAM_CAPACITY};
