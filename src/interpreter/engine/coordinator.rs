//! Clock driver and window slider.
//!
//! The engine owns the lane buffers and the core, feeds the core one clock
//! at a time, and decides after every cycle how far the window may slide.

use smallvec::{smallvec, SmallVec};

use crate::interpreter::core::{Core, WindowPosition};
use crate::interpreter::state::{Buffers, Program};
use crate::interpreter::traits::{ClockResult, Matcher, Verdict};

/// Per-lane activity flags, indexed by physical lane.
pub type LaneActivity = SmallVec<[bool; 8]>;

/// Engine execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Reset and waiting for the first cycle.
    Ready,
    /// At least one cycle has run and no verdict is known yet.
    Running,
    /// The match attempt is over.
    Finished(Verdict),
}

impl Default for EngineStatus {
    fn default() -> Self {
        EngineStatus::Ready
    }
}

/// Verdict of a match attempt and what it cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub verdict: Verdict,
    /// Clock cycles from reset to verdict, verdict cycle included.
    pub cycles: u64,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        self.verdict.is_match()
    }
}

/// Windowed matching engine.
///
/// Built once per (program, window width) pair and reused for any number of
/// inputs: every match attempt starts with [`Engine::reset`].
#[derive(Debug, Clone)]
pub struct Engine<'p> {
    core: Core<'p>,
    buffers: Buffers,
    /// Input of the current match attempt.
    input: Vec<u8>,
    /// Absolute input offset of window offset 0.
    window_index: usize,
    /// Physical lane holding window offset 0.
    buffer_index: usize,
    lane_activity: LaneActivity,
    clock_cycle: u64,
    status: EngineStatus,
}

impl<'p> Engine<'p> {
    /// Create an engine processing `window_width` characters per window.
    ///
    /// A width of zero is treated as one.
    pub fn new(program: &'p Program, window_width: usize) -> Self {
        if window_width == 0 {
            log::warn!("Window width 0 is not supported, using 1");
        }

        let buffers = Buffers::new(window_width);
        let lanes = buffers.lane_count();

        let mut engine = Self {
            core: Core::new(program),
            buffers,
            input: Vec::new(),
            window_index: 0,
            buffer_index: 0,
            lane_activity: smallvec![false; lanes],
            clock_cycle: 0,
            status: EngineStatus::Ready,
        };
        engine.reset(&[]);
        engine
    }

    pub fn program(&self) -> &'p Program {
        self.core.program()
    }

    pub fn window_width(&self) -> usize {
        self.buffers.window_width()
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn clock_cycle(&self) -> u64 {
        self.clock_cycle
    }

    pub fn window_index(&self) -> usize {
        self.window_index
    }

    pub fn buffer_index(&self) -> usize {
        self.buffer_index
    }

    /// Activity flags computed at the end of the last cycle.
    pub fn lane_activity(&self) -> &[bool] {
        &self.lane_activity
    }

    pub fn core(&self) -> &Core<'p> {
        &self.core
    }

    pub fn buffers(&self) -> &Buffers {
        &self.buffers
    }

    /// Input of the current match attempt.
    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// Prepare a new match attempt over `input`.
    ///
    /// Flushes every lane, clears the pipeline and window state, and seeds
    /// the initial thread (PC 0 on lane 0).
    pub fn reset(&mut self, input: &[u8]) {
        self.buffers.flush();
        self.core.reset();

        self.input.clear();
        self.input.extend_from_slice(input);

        self.window_index = 0;
        self.buffer_index = 0;
        self.lane_activity.fill(false);
        self.clock_cycle = 0;
        self.status = EngineStatus::Ready;

        if let Err(e) = self.buffers.push_to(0, 0) {
            log::error!("Failed to seed initial thread: {}", e);
        }
    }

    /// Run one clock cycle.
    ///
    /// Once a verdict is known, further calls return it without running the
    /// core again.
    pub fn step(&mut self) -> ClockResult {
        if let EngineStatus::Finished(verdict) = self.status {
            return verdict.into();
        }
        self.status = EngineStatus::Running;

        let window = WindowPosition {
            index: self.window_index,
            base_lane: self.buffer_index,
        };
        let result = self.core.run_clock(&self.input, window, &mut self.buffers);
        self.clock_cycle += 1;

        log::trace!(
            "Cycle {}: window {} (lane {}) -> {:?}",
            self.clock_cycle,
            self.window_index,
            self.buffer_index,
            result
        );

        if let Some(verdict) = result.verdict() {
            return self.finish(verdict);
        }

        self.update_lane_activity();
        self.slide_window();

        if self.window_index > self.input.len() {
            log::debug!("Window moved past end of input");
            return self.finish(Verdict::Refused);
        }

        if self.buffers.are_all_empty() && self.core.is_idle() {
            log::debug!("No threads left");
            return self.finish(Verdict::Refused);
        }

        ClockResult::Continue
    }

    /// Run until a verdict is reached.
    ///
    /// Does not detect programs that loop forever without consuming input.
    pub fn run(&mut self) -> MatchOutcome {
        loop {
            if let Some(verdict) = self.step().verdict() {
                return MatchOutcome {
                    verdict,
                    cycles: self.clock_cycle,
                };
            }
        }
    }

    /// Run for up to `max_cycles` more cycles.
    ///
    /// Returns `None` if no verdict was reached in time.
    pub fn run_for(&mut self, max_cycles: u64) -> Option<MatchOutcome> {
        for _ in 0..max_cycles {
            if let Some(verdict) = self.step().verdict() {
                return Some(MatchOutcome {
                    verdict,
                    cycles: self.clock_cycle,
                });
            }
        }
        None
    }

    /// Reset onto `input` and run to a verdict.
    pub fn match_input(&mut self, input: &[u8]) -> MatchOutcome {
        self.reset(input);
        let outcome = self.run();
        log::debug!(
            "Match of {} bytes finished after {} cycles: {:?}",
            input.len(),
            outcome.cycles,
            outcome.verdict
        );
        outcome
    }

    /// `true` if the program matches `input`.
    pub fn is_match(&mut self, input: &[u8]) -> bool {
        self.match_input(input).is_match()
    }

    /// Get status as string for display.
    pub fn status_string(&self) -> &'static str {
        match self.status {
            EngineStatus::Ready => "Ready",
            EngineStatus::Running => "Running",
            EngineStatus::Finished(Verdict::Accepted) => "Accepted",
            EngineStatus::Finished(Verdict::Refused) => "Refused",
        }
    }

    // Private helpers

    fn finish(&mut self, verdict: Verdict) -> ClockResult {
        self.status = EngineStatus::Finished(verdict);
        verdict.into()
    }

    /// A lane is active while it has queued threads or one in the pipeline.
    fn update_lane_activity(&mut self) {
        let stage1 = self.core.stage1_latch().map(|l| l.thread.lane);
        let stage2 = self.core.stage2_latch().map(|l| l.thread.lane);

        for (lane, active) in self.lane_activity.iter_mut().enumerate() {
            *active = !self.buffers.is_empty(lane) || stage1 == Some(lane) || stage2 == Some(lane);
        }
    }

    /// Retire the leading run of inactive lanes.
    fn slide_window(&mut self) {
        let lanes = self.buffers.lane_count();
        let retired = (0..lanes)
            .map(|offset| (self.buffer_index + offset) % lanes)
            .take_while(|&lane| !self.lane_activity[lane])
            .count();

        if retired > 0 {
            self.window_index += retired;
            self.buffer_index = (self.buffer_index + retired) % lanes;
            log::debug!(
                "Window slid by {} to index {} (lane {})",
                retired,
                self.window_index,
                self.buffer_index
            );
        }
    }
}

impl Matcher for Engine<'_> {
    fn is_match(&mut self, input: &[u8]) -> bool {
        self.match_input(input).is_match()
    }
}
