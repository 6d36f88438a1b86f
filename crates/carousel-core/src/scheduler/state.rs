//! Auto-advance timer as an explicit state machine
//!
//! The scheduler never owns a real timer. It keeps a single deadline slot
//! that the host polls, so replacing the deadline is the same as cancelling
//! the previous timer: two deadlines can never coexist.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Not counting: too few items, hidden, or torn down
    Idle,
    /// Timer running
    Armed,
    /// Timer discarded while the user drags
    Suspended,
}

/// A due auto-advance, stamped with the epoch that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub epoch: u64,
    pub due: Instant,
}

/// Forward-only wraparound: `(current + 1) mod item_count`
#[inline]
pub fn advance(current: usize, item_count: usize) -> Option<usize> {
    if item_count == 0 {
        None
    } else {
        Some((current + 1) % item_count)
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    state: SchedulerState,
    interval: Duration,
    due: Option<Instant>,
    /// Bumped every time a fresh interval starts or the timer is dropped
    epoch: u64,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            interval,
            due: None,
            epoch: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Takes effect the next time the timer is armed or resumed
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// When the next tick is due, if armed
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.due
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Idle -> Armed, first tick one full interval after `now`
    pub fn arm(&mut self, now: Instant) -> bool {
        if self.state != SchedulerState::Idle || self.interval.is_zero() {
            return false;
        }
        self.start_interval(now);
        debug!(epoch = self.epoch, interval_ms = self.interval.as_millis(), "Scheduler armed");
        true
    }

    /// Armed -> Suspended; the pending tick is discarded
    pub fn suspend(&mut self) -> bool {
        if self.state != SchedulerState::Armed {
            return false;
        }
        self.state = SchedulerState::Suspended;
        self.due = None;
        self.epoch += 1;
        debug!(epoch = self.epoch, "Scheduler suspended");
        true
    }

    /// Suspended -> Armed with a fresh interval; time before suspension is not credited
    pub fn resume(&mut self, now: Instant) -> bool {
        if self.state != SchedulerState::Suspended || self.interval.is_zero() {
            return false;
        }
        self.start_interval(now);
        debug!(epoch = self.epoch, "Scheduler resumed");
        true
    }

    /// Any state -> Idle
    pub fn cancel(&mut self) -> bool {
        if self.state == SchedulerState::Idle {
            return false;
        }
        self.state = SchedulerState::Idle;
        self.due = None;
        self.epoch += 1;
        debug!(epoch = self.epoch, "Scheduler cancelled");
        true
    }

    /// Fire the pending tick if it is due at `now`.
    ///
    /// The next deadline is one interval after the fired one. A host that
    /// fell more than an interval behind gets a single tick, not a burst.
    pub fn poll(&mut self, now: Instant) -> Option<Tick> {
        if self.state != SchedulerState::Armed {
            return None;
        }
        let due = self.due?;
        if due > now {
            return None;
        }
        let mut next = due + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.due = Some(next);
        Some(Tick {
            epoch: self.epoch,
            due,
        })
    }

    /// A tick may only be applied while armed and within the epoch that made it
    pub fn accept(&self, tick: &Tick) -> bool {
        self.state == SchedulerState::Armed && tick.epoch == self.epoch
    }

    fn start_interval(&mut self, now: Instant) {
        self.state = SchedulerState::Armed;
        self.epoch += 1;
        self.due = Some(now + self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_advance_is_forward_only() {
        for count in 2..7usize {
            for current in 0..count {
                let next = advance(current, count).unwrap();
                assert_ne!(next, current);
                assert!(next == current + 1 || (current == count - 1 && next == 0));
            }
        }
        assert_eq!(advance(0, 1), Some(0));
        assert_eq!(advance(0, 0), None);
    }

    #[test]
    fn test_arm_and_tick() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(ms(2000));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.poll(t0 + ms(5000)).is_none());

        assert!(scheduler.arm(t0));
        assert!(!scheduler.arm(t0 + ms(100)));
        assert_eq!(scheduler.deadline(), Some(t0 + ms(2000)));

        assert!(scheduler.poll(t0 + ms(1999)).is_none());
        let tick = scheduler.poll(t0 + ms(2000)).unwrap();
        assert_eq!(tick.due, t0 + ms(2000));
        assert!(scheduler.accept(&tick));
        assert_eq!(scheduler.deadline(), Some(t0 + ms(4000)));
    }

    #[test]
    fn test_late_poll_does_not_burst() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(ms(1000));
        scheduler.arm(t0);
        assert!(scheduler.poll(t0 + ms(3500)).is_some());
        assert!(scheduler.poll(t0 + ms(3500)).is_none());
        assert_eq!(scheduler.deadline(), Some(t0 + ms(4500)));
    }

    #[test]
    fn test_suspend_resume_restarts_interval() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(ms(2000));
        scheduler.arm(t0);

        assert!(scheduler.suspend());
        assert!(!scheduler.suspend());
        assert_eq!(scheduler.state(), SchedulerState::Suspended);
        assert_eq!(scheduler.deadline(), None);
        assert!(scheduler.poll(t0 + ms(2500)).is_none());

        assert!(scheduler.resume(t0 + ms(1800)));
        assert!(!scheduler.resume(t0 + ms(1900)));
        assert_eq!(scheduler.deadline(), Some(t0 + ms(3800)));
    }

    #[test]
    fn test_stale_tick_rejected() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(ms(1000));
        scheduler.arm(t0);
        let tick = scheduler.poll(t0 + ms(1000)).unwrap();

        scheduler.cancel();
        scheduler.arm(t0 + ms(1000));
        assert!(!scheduler.accept(&tick));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(ms(1000));
        assert!(!scheduler.cancel());
        scheduler.arm(t0);
        assert!(scheduler.cancel());
        assert!(!scheduler.cancel());
        assert_eq!(scheduler.deadline(), None);
        assert!(!scheduler.resume(t0));
    }

    #[test]
    fn test_zero_interval_never_arms() {
        let mut scheduler = Scheduler::new(Duration::ZERO);
        assert!(!scheduler.arm(Instant::now()));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }
}
