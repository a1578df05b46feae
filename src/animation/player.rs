//! Playback engine replaying a recorded trace.

use super::scheduler::{FrameClock, FrameHandle, FrameScheduler, SchedulerError};
use super::stats::{Counters, Stat};
use super::surface::{Color, Surface, column_rect};
use crate::schema::PlaybackConfig;
use crate::trace::{Step, StepKind, Trace, TraceError};

/// Lifecycle of a [`PlaybackEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// No trace loaded yet.
    Idle,
    /// Consuming steps.
    Playing,
    /// Trace exhausted, restoring and revealing cells.
    Draining,
    Finished,
}

/// Visual state of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visual {
    Settled,
    /// Marked by a step of this kind.
    Highlighted(StepKind),
}

/// Per-index playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellState {
    pub index: usize,
    /// Cycle-clock value when the cell was last marked.
    pub last_highlight_cycle: u64,
    pub value: i64,
    pub visual: Visual,
}

impl CellState {
    fn new(index: usize, value: i64) -> Self {
        Self {
            index,
            last_highlight_cycle: 0,
            value,
            visual: Visual::Settled,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.visual == Visual::Settled
    }

    /// Settled and compare-marked cells may be marked again; anything else
    /// keeps its highlight until it expires.
    fn can_mark(&self) -> bool {
        matches!(
            self.visual,
            Visual::Settled | Visual::Highlighted(StepKind::Cmp)
        )
    }
}

/// Work carried by one scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tick {
    Play,
    Drain,
}

/// Per-frame callback; the argument is `true` while steps remain.
pub type FrameCallback = Box<dyn FnMut(bool)>;

/// Playback engine errors. Both scheduler and trace errors are fatal.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error("Playback already started")]
    AlreadyStarted,
}

fn step_color(kind: StepKind) -> Color {
    match kind {
        StepKind::Start => Color::Neutral,
        StepKind::Cmp => Color::Compare,
        StepKind::Swap => Color::Swap,
        StepKind::Copy => Color::Transfer,
        StepKind::Set => Color::Write,
    }
}

/// Replays a [`Trace`] onto a [`Surface`], one cost-bounded batch of steps
/// per frame.
///
/// Usage:
/// ```ignore
/// let mut engine = PlaybackEngine::new(surface, clock, PlaybackConfig::default());
/// engine.play(trace, |more| println!("more pending: {more}"))?;
/// engine.run_to_end()?;
/// println!("{} cycles", engine.get(Stat::Cycles));
/// ```
pub struct PlaybackEngine<S: Surface, C: FrameClock> {
    surface: S,
    scheduler: FrameScheduler<C, Tick>,
    config: PlaybackConfig,
    state: PlaybackState,
    trace: Trace,
    /// Next unconsumed step.
    cursor: usize,
    cells: Vec<CellState>,
    max_value: i64,
    counters: Counters,
    /// Cycles charged in the current frame, carried over when the budget
    /// is overshot.
    frame_cycles: u64,
    /// Advances once per tick.
    cycle_clock: u64,
    /// Next cell to reveal while draining.
    reveal_cursor: usize,
    on_frame: Option<FrameCallback>,
}

impl<S: Surface, C: FrameClock> PlaybackEngine<S, C> {
    pub fn new(surface: S, clock: C, config: PlaybackConfig) -> Self {
        Self {
            surface,
            scheduler: FrameScheduler::new(clock),
            config,
            state: PlaybackState::Idle,
            trace: Trace::default(),
            cursor: 0,
            cells: Vec::new(),
            max_value: 0,
            counters: Counters::new(),
            frame_cycles: 0,
            cycle_clock: 0,
            reveal_cursor: 0,
            on_frame: None,
        }
    }

    /// Load `trace` and schedule the first tick.
    pub fn play<F>(&mut self, trace: Trace, on_frame: F) -> Result<(), PlaybackError>
    where
        F: FnMut(bool) + 'static,
    {
        if self.state != PlaybackState::Idle {
            return Err(PlaybackError::AlreadyStarted);
        }

        self.surface.clear(Color::Background);

        self.cells = (0..trace.cell_count())
            .map(|i| CellState::new(i, 0))
            .collect();
        self.max_value = 0;
        for step in trace.iter().filter(|s| s.kind == StepKind::Start) {
            self.cells[step.index].value = step.value;
            self.max_value = self.max_value.max(step.value);
        }

        log::debug!(
            "Playing {} steps over {} cells (max value {})",
            trace.len(),
            self.cells.len(),
            self.max_value
        );

        self.trace = trace;
        self.cursor = 0;
        self.counters = Counters::new();
        self.frame_cycles = 0;
        self.cycle_clock = 0;
        self.reveal_cursor = 0;
        self.on_frame = Some(Box::new(on_frame));
        self.state = PlaybackState::Playing;
        self.scheduler.schedule(Tick::Play)?;
        Ok(())
    }

    /// Run the task for frame `handle`, if it is the pending one.
    pub fn on_frame(&mut self, handle: FrameHandle) -> Result<PlaybackState, PlaybackError> {
        if let Some(tick) = self.scheduler.fire(handle) {
            self.run(tick)?;
        }
        Ok(self.state)
    }

    /// Wait for the clock's next frame and run one tick.
    ///
    /// Returns `false` when the clock had no frame to deliver.
    pub fn pump(&mut self) -> Result<bool, PlaybackError> {
        match self.scheduler.wait() {
            Some(tick) => {
                self.run(tick)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Pump until nothing is left to schedule.
    pub fn run_to_end(&mut self) -> Result<(), PlaybackError> {
        while self.pump()? {}
        Ok(())
    }

    /// Revoke the pending tick, leaving the surface as painted.
    pub fn cancel(&mut self) {
        self.scheduler.cancel();
    }

    fn run(&mut self, tick: Tick) -> Result<(), PlaybackError> {
        log::trace!("{:?} tick at cycle clock {}", tick, self.cycle_clock);
        match tick {
            Tick::Play => self.play_tick(),
            Tick::Drain => self.drain_tick(),
        }
    }

    fn play_tick(&mut self) -> Result<(), PlaybackError> {
        loop {
            let Some(&step) = self.trace.get(self.cursor) else {
                self.notify(false);
                self.state = PlaybackState::Draining;
                log::debug!(
                    "Trace exhausted after {} cycles, draining",
                    self.counters.cycles()
                );
                self.scheduler.schedule(Tick::Drain)?;
                break;
            };
            self.cursor += 1;

            self.frame_cycles += self.counters.record(&step);
            self.apply(&step);

            if self.frame_cycles >= self.config.cycles_per_frame {
                self.frame_cycles -= self.config.cycles_per_frame;
                self.scheduler.schedule(Tick::Play)?;
                self.notify(true);
                break;
            }
        }

        self.cycle_clock += 1;
        self.restore_expired(Color::Neutral);
        Ok(())
    }

    fn drain_tick(&mut self) -> Result<(), PlaybackError> {
        if let Some(cell) = self.cells.get_mut(self.reveal_cursor) {
            cell.visual = Visual::Settled;
            let (index, value) = (cell.index, cell.value);
            self.reveal_cursor += 1;
            self.draw(index, value, Color::Reveal);
        }
        self.restore_expired(Color::Sweep);
        self.cycle_clock += 1;

        let unsettled = self.cells.iter().any(|c| !c.is_settled());
        if self.reveal_cursor < self.cells.len() || unsettled {
            self.scheduler.schedule(Tick::Drain)?;
        } else {
            self.state = PlaybackState::Finished;
            log::info!(
                "Playback finished: {} ({} ticks)",
                self.counters.snapshot(),
                self.cycle_clock
            );
        }
        Ok(())
    }

    fn apply(&mut self, step: &Step) {
        match step.kind {
            StepKind::Start => self.draw(step.index, step.value, Color::Neutral),
            StepKind::Cmp => {
                if self.mark(step) {
                    self.draw(step.index, step.value, Color::Compare);
                }
            }
            StepKind::Swap | StepKind::Copy | StepKind::Set => {
                self.draw(step.index, step.value, step_color(step.kind));
                self.mark(step);
            }
        }
    }

    /// Store the step's value and highlight the cell if it may be marked.
    fn mark(&mut self, step: &Step) -> bool {
        let cell = &mut self.cells[step.index];
        cell.value = step.value;
        if !cell.can_mark() {
            return false;
        }
        cell.visual = Visual::Highlighted(step.kind);
        cell.last_highlight_cycle = self.cycle_clock;
        true
    }

    fn restore_expired(&mut self, color: Color) {
        let now = self.cycle_clock;
        let threshold = self.config.restore_threshold;
        for i in 0..self.cells.len() {
            let cell = self.cells[i];
            if !cell.is_settled() && now.saturating_sub(cell.last_highlight_cycle) > threshold {
                self.cells[i].visual = Visual::Settled;
                self.draw(i, cell.value, color);
            }
        }
    }

    fn draw(&mut self, index: usize, value: i64, color: Color) {
        let height = self.surface.height();
        let rect = column_rect(
            self.surface.width(),
            height,
            self.cells.len(),
            self.max_value,
            index,
            value,
        );
        self.surface
            .fill_rect(rect.x, 0.0, rect.width, height, Color::Background);
        self.surface
            .fill_rect(rect.x, rect.y, rect.width, rect.height, color);
    }

    fn notify(&mut self, more: bool) {
        if let Some(callback) = self.on_frame.as_mut() {
            callback(more);
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == PlaybackState::Finished
    }

    /// Whether a tick is waiting for its frame.
    pub fn is_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Frame the pending tick is waiting for.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.scheduler.pending_handle()
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Number of steps consumed so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cycle_clock(&self) -> u64 {
        self.cycle_clock
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Reported statistic; see [`Counters::get`].
    pub fn get(&self, stat: impl Into<Stat>) -> u64 {
        self.counters.get(stat)
    }

    /// Reported statistic by name (`"cmp"`, `"swap"`, `"cycles"`, ...).
    pub fn get_named(&self, name: &str) -> u64 {
        self.counters.get_named(name)
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn clock(&self) -> &C {
        self.scheduler.clock()
    }

    pub fn clock_mut(&mut self) -> &mut C {
        self.scheduler.clock_mut()
    }
}

impl<S: Surface, C: FrameClock> Drop for PlaybackEngine<S, C> {
    fn drop(&mut self) {
        self.scheduler.cancel();
    }
}
