//! cicero-emu library
//!
//! Cycle-level simulation of the CICERO regex coprocessor: compiled NFA
//! bytecode run through a three-stage pipeline over a sliding window of
//! input characters.

pub mod config;
pub mod interpreter;
pub mod parser;
pub mod testing;
