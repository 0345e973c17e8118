//! Program loaders
//!
//! - [`hex`] - hexadecimal instruction text, one word per line

pub mod hex;

pub use hex::ProgramError;
