//! A single-threaded timer queue driven by a virtual clock.
//!
//! Nothing runs on its own: the host calls [`Scheduler::advance`] (from its
//! event loop, or from a test) and every action whose deadline has passed
//! runs in deadline order. Actions may schedule or cancel other timers.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

struct Timer {
    token: TimerToken,
    action: Box<dyn FnOnce(TimerToken)>,
    deadline: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    /// A token that does not correspond to any timer.
    pub const INVALID: TimerToken = TimerToken(0);

    /// Create a new token.
    pub fn next() -> TimerToken {
        static TIMER_COUNTER: AtomicU64 = AtomicU64::new(1);
        TimerToken(TIMER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Create a new token from a raw value.
    pub const fn from_raw(id: u64) -> TimerToken {
        TimerToken(id)
    }

    /// Get the raw value for a token.
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

#[derive(Default)]
struct SchedulerInner {
    now: Cell<Duration>,
    timers: RefCell<Vec<Timer>>,
}

/// A shared handle to a timer queue. Clones refer to the same queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.inner.now.get()
    }

    /// Run `action` once `duration` has elapsed.
    pub fn exec_after(
        &self,
        duration: Duration,
        action: impl FnOnce(TimerToken) + 'static,
    ) -> TimerToken {
        let token = TimerToken::next();
        let deadline = self.now() + duration;
        self.inner.timers.borrow_mut().push(Timer {
            token,
            action: Box::new(action),
            deadline,
        });
        tracing::trace!(token = token.into_raw(), ?deadline, "timer scheduled");
        token
    }

    /// Drop a pending timer. Returns whether it was still pending.
    pub fn cancel(&self, token: TimerToken) -> bool {
        let mut timers = self.inner.timers.borrow_mut();
        let before = timers.len();
        timers.retain(|timer| timer.token != token);
        before != timers.len()
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.inner.timers.borrow().iter().any(|timer| timer.token == token)
    }

    pub fn pending(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    /// Move the clock forward by `by`, running every timer that falls due.
    ///
    /// Timers run one at a time with the clock set to their own deadline, so
    /// a timer scheduled from inside an action still fires within this call
    /// if its deadline is reached.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        while let Some(timer) = self.take_due(target) {
            self.inner.now.set(timer.deadline);
            (timer.action)(timer.token);
        }
        self.inner.now.set(target);
    }

    fn take_due(&self, target: Duration) -> Option<Timer> {
        let mut timers = self.inner.timers.borrow_mut();
        let next = timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= target)
            .min_by_key(|(_, timer)| (timer.deadline, timer.token))
            .map(|(index, _)| index)?;
        Some(timers.remove(next))
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}
