//! Three-stage matching pipeline.
//!
//! The `Core` models the CICERO datapath one clock cycle at a time:
//!
//! 1. **Fetch**: take the oldest thread of the lowest window lane with work
//!    and latch it together with its instruction
//! 2. **Execute**: run the instruction latched last cycle against its
//!    character and push the successor thread
//! 3. **Split delivery**: push the second branch of a `SPLIT` executed last
//!    cycle
//!
//! The stages run "simultaneously": every value they read is captured in a
//! [`CycleSnapshot`] before any of them writes, and the fetched thread is
//! only popped from its lane at writeback.
//!
//! # Example
//!
//! ```ignore
//! let mut core = Core::new(&program);
//! let mut buffers = Buffers::new(2);
//! buffers.push_to(0, 0)?;
//! let result = core.run_clock(b"ab", WindowPosition::default(), &mut buffers);
//! ```

mod pipeline;

pub use pipeline::{Core, CoreSignals, CycleSnapshot, InFlight, Symbol, WindowPosition};
