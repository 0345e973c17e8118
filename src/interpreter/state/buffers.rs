//! Per-lane thread queues.
//!
//! One FIFO of pending program counters per physical lane. A window of
//! width `W` uses `W + 1` physical lanes: window offsets `0..W` can be
//! fetched from, offset `W` is the staging lane that collects successors
//! of threads consuming the last window character. Lanes are addressed by
//! physical index; window offsets are relative to a base lane and wrap
//! modulo the lane count.

use std::collections::VecDeque;

use crate::interpreter::traits::LaneError;

/// Canonical non-negative modulo: the result is always in `[0, n)`.
///
/// # Panics
///
/// Panics if `n` is zero.
#[inline]
pub fn modulo(k: i64, n: usize) -> usize {
    k.rem_euclid(n as i64) as usize
}

/// Offset of `lane` within a window whose first character sits on `base`.
#[inline]
pub fn lane_offset(lane: usize, base: usize, lanes: usize) -> usize {
    modulo(lane as i64 - base as i64, lanes)
}

/// A suspended NFA thread: the instruction it will run next and the lane
/// holding the character it runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Continuation {
    /// Program counter (9 bits).
    pub pc: u16,
    /// Physical lane.
    pub lane: usize,
}

impl Continuation {
    pub fn new(pc: u16, lane: usize) -> Self {
        Self { pc, lane }
    }
}

/// Lane buffers for one engine.
#[derive(Debug, Clone)]
pub struct Buffers {
    lanes: Vec<VecDeque<u16>>,
    /// Number of fetchable lanes.
    window_width: usize,
}

impl Buffers {
    /// Create buffers for a window of `window_width` characters (at least 1).
    pub fn new(window_width: usize) -> Self {
        let window_width = window_width.max(1);
        Self {
            lanes: vec![VecDeque::new(); window_width + 1],
            window_width,
        }
    }

    /// Number of physical lanes (window width plus the staging lane).
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Number of lanes that may be fetched from.
    pub fn window_width(&self) -> usize {
        self.window_width
    }

    /// Empty every lane.
    pub fn flush(&mut self) {
        for lane in &mut self.lanes {
            lane.clear();
        }
    }

    /// Append `pc` to `lane`.
    ///
    /// A push to a lane that does not exist is rejected and nothing is stored.
    pub fn push_to(&mut self, lane: usize, pc: u16) -> Result<(), LaneError> {
        let lanes = self.lanes.len();
        match self.lanes.get_mut(lane) {
            Some(queue) => {
                queue.push_back(pc);
                Ok(())
            }
            None => Err(LaneError::NoSuchLane { lane, lanes }),
        }
    }

    /// Peek at the head of `lane` without removing it.
    pub fn front(&self, lane: usize) -> Option<Continuation> {
        self.lanes
            .get(lane)?
            .front()
            .map(|&pc| Continuation::new(pc, lane))
    }

    /// Remove and return the head of `lane`.
    pub fn pop_front(&mut self, lane: usize) -> Option<Continuation> {
        self.lanes
            .get_mut(lane)?
            .pop_front()
            .map(|pc| Continuation::new(pc, lane))
    }

    /// `true` if `lane` holds nothing. Nonexistent lanes are empty.
    pub fn is_empty(&self, lane: usize) -> bool {
        self.lanes.get(lane).map_or(true, VecDeque::is_empty)
    }

    /// Number of pending threads on `lane`.
    pub fn len(&self, lane: usize) -> usize {
        self.lanes.get(lane).map_or(0, VecDeque::len)
    }

    /// `true` if no lane holds anything, staging lane included.
    pub fn are_all_empty(&self) -> bool {
        self.lanes.iter().all(VecDeque::is_empty)
    }

    /// Whether any fetchable lane of the window starting at `base` has work.
    pub fn has_ready_instruction(&self, base: usize) -> bool {
        self.first_non_empty_lane(base).is_some()
    }

    /// Lowest-offset fetchable lane with work, scanning forward from `base`.
    ///
    /// Returns the physical lane index, or `None` if every window lane is empty.
    pub fn first_non_empty_lane(&self, base: usize) -> Option<usize> {
        let lanes = self.lanes.len();
        (0..self.window_width)
            .map(|offset| (base + offset) % lanes)
            .find(|&lane| !self.lanes[lane].is_empty())
    }
}
