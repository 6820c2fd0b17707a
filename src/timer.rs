//!
//! Support for timers.
//!
//! A field writes the caret and then needs to check a bit later if the
//! host kept it. That, and the deferred caret correction after focus,
//! runs with timers from this queue. The queue is owned by the host,
//! which polls it and hands each [TimerEvent] back to the field together
//! with the current state of the text.
//!

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

/// Holds all the timers.
#[derive(Debug, Default)]
pub struct Timers {
    tags: Cell<usize>,
    timers: RefCell<Vec<TimerImpl>>,
}

/// Handle for a submitted timer.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
pub struct TimerHandle(usize);

#[derive(Debug)]
struct TimerImpl {
    tag: usize,
    next: Instant,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next sleep time.
    pub fn sleep_time(&self) -> Option<Duration> {
        let timers = self.timers.borrow();
        if let Some(timer) = timers.last() {
            let now = Instant::now();
            if now > timer.next {
                Some(Duration::from_nanos(0))
            } else {
                Some(timer.next.duration_since(now))
            }
        } else {
            None
        }
    }

    /// Is any timer due.
    pub fn poll(&self) -> bool {
        let timers = self.timers.borrow();
        if let Some(timer) = timers.last() {
            Instant::now() >= timer.next
        } else {
            false
        }
    }

    /// Removes and returns the next due timer.
    pub fn read(&self) -> Option<TimerEvent> {
        let mut timers = self.timers.borrow_mut();

        let timer = timers.pop();
        if let Some(timer) = timer {
            if Instant::now() >= timer.next {
                Some(TimerEvent(TimeOut {
                    handle: TimerHandle(timer.tag),
                }))
            } else {
                timers.push(timer);
                None
            }
        } else {
            None
        }
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.borrow().is_empty()
    }

    /// Is this timer still pending.
    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.timers.borrow().iter().any(|v| v.tag == handle.0)
    }

    // ordered by due time, the next one last.
    fn add_impl(timers: &mut Vec<TimerImpl>, t: TimerImpl) {
        'f: {
            for i in 0..timers.len() {
                if timers[i].next <= t.next {
                    timers.insert(i, t);
                    break 'f;
                }
            }
            timers.push(t);
        }
    }

    /// Add a timer.
    #[must_use]
    pub fn add(&self, t: TimerDef) -> TimerHandle {
        let tag = self.tags.get() + 1;
        self.tags.set(tag);

        let t = TimerImpl {
            tag,
            next: if let Some(next) = t.next {
                next
            } else {
                Instant::now() + t.timer
            },
        };

        let mut timers = self.timers.borrow_mut();
        Self::add_impl(timers.as_mut(), t);

        TimerHandle(tag)
    }

    /// Remove a timer. Unknown or already fired timers are ignored.
    pub fn remove(&self, tag: TimerHandle) {
        let mut timer = self.timers.borrow_mut();
        for i in 0..timer.len() {
            if timer[i].tag == tag.0 {
                timer.remove(i);
                break;
            }
        }
    }
}

/// Timing event data. Used by [TimerEvent].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOut {
    pub handle: TimerHandle,
}

/// Timer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent(pub TimeOut);

/// Holds the information to start a timer.
#[derive(Debug, Default)]
pub struct TimerDef {
    /// Duration
    timer: Duration,
    /// Specific time.
    next: Option<Instant>,
}

impl TimerDef {
    pub fn new() -> Self {
        Default::default()
    }

    /// Delay.
    pub fn timer(mut self, timer: Duration) -> Self {
        self.timer = timer;
        self
    }

    /// Fire at the given instant instead.
    pub fn next(mut self, next: Instant) -> Self {
        self.next = Some(next);
        self
    }
}
