//! Batch harness for running compiled regex programs over input strings.
//!
//! Programs live in one directory, one file per regex, named by index
//! (`0`, `1`, `2`, ...). Inputs come from a text file, one string per line.
//! Every program is matched against every input and each verdict is
//! reported as one line.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- batch ./programs ./strings.txt -w 4
//! ```

pub mod batch_suite;

pub use batch_suite::{BatchProgram, BatchResult, BatchSuite, SuiteResult};
