//! One-shot timers serviced by the event loop.

use crate::handler::Handler;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

pub type TimerRef = Rc<Timer>;

#[derive(Default)]
pub struct Timer {
    deadline: Cell<Option<Instant>>,
    pub on_timeout: Handler<dyn FnMut()>,
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("deadline", &self.deadline.get())
            .finish_non_exhaustive()
    }
}

impl Timer {
    /// Fire once after `milliseconds`, replacing any pending firing.
    pub fn wind_up(&self, milliseconds: u32) {
        self.wind_up_at(Instant::now(), milliseconds);
    }

    pub fn wind_up_at(&self, now: Instant, milliseconds: u32) {
        self.deadline
            .set(Some(now + Duration::from_millis(u64::from(milliseconds))));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.get()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.get().is_some()
    }
}

/// Timers created for one event loop. The queue only keeps weak references,
/// so dropping a timer cancels it.
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: RefCell<Vec<Weak<Timer>>>,
}

impl TimerQueue {
    pub fn create_timer(&self) -> TimerRef {
        let timer = Rc::new(Timer::default());
        self.timers.borrow_mut().push(Rc::downgrade(&timer));
        timer
    }

    fn live_timers(&self) -> Vec<TimerRef> {
        let mut timers = self.timers.borrow_mut();
        timers.retain(|timer| timer.strong_count() > 0);
        timers.iter().filter_map(Weak::upgrade).collect()
    }

    /// Fire every timer due at `now` and return the earliest deadline still
    /// pending afterwards.
    pub fn fire_due(&self, now: Instant) -> Option<Instant> {
        for timer in self.live_timers() {
            let due = timer.deadline.get().is_some_and(|deadline| deadline <= now);
            if due {
                timer.deadline.set(None);
                tracing::trace!("timer fired");
                timer.on_timeout.with(|timeout| timeout());
            }
        }
        self.next_deadline()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.live_timers()
            .iter()
            .filter_map(|timer| timer.deadline.get())
            .min()
    }
}
