//! Cooperative single-task frame scheduler.
//!
//! A [`FrameScheduler`] holds at most one pending task and hands it back
//! exactly once, on the next frame delivered by its [`FrameClock`]. Tasks
//! continue themselves by scheduling again from inside their own run.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Identifies one frame request made to a [`FrameClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Display-refresh notification source.
pub trait FrameClock {
    /// Ask to be notified at the next refresh opportunity.
    fn request(&mut self) -> FrameHandle;

    /// Withdraw a request. Unknown or already delivered handles are ignored.
    fn cancel(&mut self, handle: FrameHandle);

    /// Wait for the next requested refresh and return its handle.
    ///
    /// Returns `None` when nothing is requested, or when frames are delivered
    /// by the host instead (e.g. a browser callback).
    fn next_frame(&mut self) -> Option<FrameHandle>;
}

/// Errors raised by [`FrameScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("Task already queued")]
    AlreadyPending,
}

/// At-most-one-pending-task scheduler.
#[derive(Debug)]
pub struct FrameScheduler<C, T> {
    clock: C,
    pending: Option<(FrameHandle, T)>,
}

impl<C: FrameClock, T> FrameScheduler<C, T> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            pending: None,
        }
    }

    /// Arrange for `task` to be handed out on the next frame.
    pub fn schedule(&mut self, task: T) -> Result<(), SchedulerError> {
        if self.pending.is_some() {
            return Err(SchedulerError::AlreadyPending);
        }
        let handle = self.clock.request();
        self.pending = Some((handle, task));
        Ok(())
    }

    /// Revoke the pending task, if any.
    pub fn cancel(&mut self) {
        if let Some((handle, _)) = self.pending.take() {
            log::debug!("Frame request {} canceled", handle.id());
            self.clock.cancel(handle);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Handle of the outstanding frame request.
    pub fn pending_handle(&self) -> Option<FrameHandle> {
        self.pending.as_ref().map(|(h, _)| *h)
    }

    /// Deliver frame `handle`, releasing the pending task if it matches.
    pub fn fire(&mut self, handle: FrameHandle) -> Option<T> {
        match self.pending.take() {
            Some((h, task)) if h == handle => Some(task),
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Block on the clock for the next frame and release the pending task.
    pub fn wait(&mut self) -> Option<T> {
        let handle = self.clock.next_frame()?;
        self.fire(handle)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

#[derive(Debug, Default)]
struct ManualClockState {
    next_id: u64,
    outstanding: VecDeque<FrameHandle>,
    requested: u64,
    canceled: u64,
    delivered: u64,
}

/// Deterministic clock that delivers frames as soon as they are asked for.
///
/// Clones share state, so a test can keep one to observe requests made
/// through a clock owned by an engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Rc<RefCell<ManualClockState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame requests still outstanding.
    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding.len()
    }

    /// Total `request` calls.
    pub fn requested(&self) -> u64 {
        self.state.borrow().requested
    }

    /// Total `cancel` calls that withdrew an outstanding request.
    pub fn canceled(&self) -> u64 {
        self.state.borrow().canceled
    }

    /// Frames delivered through `next_frame`.
    pub fn delivered(&self) -> u64 {
        self.state.borrow().delivered
    }
}

impl FrameClock for ManualClock {
    fn request(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        let handle = FrameHandle::new(state.next_id);
        state.next_id += 1;
        state.requested += 1;
        state.outstanding.push_back(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.outstanding.iter().position(|h| *h == handle) {
            state.outstanding.remove(pos);
            state.canceled += 1;
        }
    }

    fn next_frame(&mut self) -> Option<FrameHandle> {
        let mut state = self.state.borrow_mut();
        let handle = state.outstanding.pop_front()?;
        state.delivered += 1;
        Some(handle)
    }
}

/// Fixed-interval timer, for hosts without a display-refresh signal.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct IntervalClock {
    interval: std::time::Duration,
    last_frame: Option<std::time::Instant>,
    pending: Option<FrameHandle>,
    next_id: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl IntervalClock {
    pub fn new(interval: std::time::Duration) -> Self {
        Self {
            interval,
            last_frame: None,
            pending: None,
            next_id: 0,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(std::time::Duration::from_millis(ms))
    }

    pub fn interval(&self) -> std::time::Duration {
        self.interval
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl FrameClock for IntervalClock {
    fn request(&mut self) -> FrameHandle {
        let handle = FrameHandle::new(self.next_id);
        self.next_id += 1;
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn next_frame(&mut self) -> Option<FrameHandle> {
        let handle = self.pending.take()?;
        if let Some(last) = self.last_frame {
            let due = last + self.interval;
            let now = std::time::Instant::now();
            if due > now {
                std::thread::sleep(due - now);
            }
        }
        self.last_frame = Some(std::time::Instant::now());
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Task {
        A,
        B,
    }

    #[test]
    fn test_schedule_then_fire_once() {
        let mut scheduler = FrameScheduler::new(ManualClock::new());
        scheduler.schedule(Task::A).unwrap();
        assert!(scheduler.is_pending());

        assert_eq!(scheduler.wait(), Some(Task::A));
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.wait(), None);
    }

    #[test]
    fn test_double_schedule_is_rejected() {
        let mut scheduler = FrameScheduler::new(ManualClock::new());
        scheduler.schedule(Task::A).unwrap();
        assert_eq!(
            scheduler.schedule(Task::B),
            Err(SchedulerError::AlreadyPending)
        );
        // The original task is untouched.
        assert_eq!(scheduler.wait(), Some(Task::A));
    }

    #[test]
    fn test_reschedule_after_fire() {
        let mut scheduler = FrameScheduler::new(ManualClock::new());
        scheduler.schedule(Task::A).unwrap();
        assert_eq!(scheduler.wait(), Some(Task::A));
        scheduler.schedule(Task::B).unwrap();
        assert_eq!(scheduler.wait(), Some(Task::B));
        assert_eq!(scheduler.clock().requested(), 2);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let clock = ManualClock::new();
        let mut scheduler = FrameScheduler::<_, Task>::new(clock.clone());

        scheduler.cancel();
        scheduler.cancel();
        assert!(!scheduler.is_pending());
        assert_eq!(clock.canceled(), 0);

        scheduler.schedule(Task::A).unwrap();
        scheduler.cancel();
        scheduler.cancel();
        assert!(!scheduler.is_pending());
        assert_eq!(clock.canceled(), 1);
        assert_eq!(clock.outstanding(), 0);
        assert_eq!(scheduler.wait(), None);
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let mut scheduler = FrameScheduler::new(ManualClock::new());
        scheduler.schedule(Task::A).unwrap();
        let handle = scheduler.pending_handle().unwrap();

        assert_eq!(scheduler.fire(FrameHandle::new(handle.id() + 100)), None);
        assert!(scheduler.is_pending());
        assert_eq!(scheduler.fire(handle), Some(Task::A));
        assert_eq!(scheduler.fire(handle), None);
    }

    #[test]
    fn test_interval_clock_paces_frames() {
        let mut clock = IntervalClock::from_millis(5);
        let start = std::time::Instant::now();
        for _ in 0..3 {
            let h = clock.request();
            assert_eq!(clock.next_frame(), Some(h));
        }
        // First frame is immediate, the next two wait one interval each.
        assert!(start.elapsed() >= std::time::Duration::from_millis(10));
        assert_eq!(clock.next_frame(), None);
    }

    #[test]
    fn test_interval_clock_cancel() {
        let mut clock = IntervalClock::from_millis(0);
        let h = clock.request();
        clock.cancel(h);
        clock.cancel(h);
        assert_eq!(clock.next_frame(), None);
    }
}
