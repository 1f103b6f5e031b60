//! Fixed-period callback timer driven by the owner's event loop
//!
//! The callback slot and the schedule are independent: swapping the callback
//! never restarts the schedule, and only a change of period does.

use std::time::{Duration, Instant};

pub struct Interval<'a> {
    callback: Box<dyn FnMut() + 'a>,
    period: Option<Duration>,
    next_due: Option<Instant>,
}

impl<'a> Interval<'a> {
    /// A disabled interval holding `callback`.
    pub fn new(callback: impl FnMut() + 'a) -> Self {
        Self {
            callback: Box::new(callback),
            period: None,
            next_due: None,
        }
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Replace the callback and apply `period`.
    pub fn schedule(&mut self, callback: impl FnMut() + 'a, period: Option<Duration>) {
        self.set_callback(callback);
        self.set_period(period);
    }

    /// Replace the callback invoked by future firings. The schedule is untouched.
    pub fn set_callback(&mut self, callback: impl FnMut() + 'a) {
        self.callback = Box::new(callback);
    }

    pub fn set_period(&mut self, period: Option<Duration>) {
        self.set_period_at(period, Instant::now());
    }

    /// Restart the schedule from `now` if `period` differs from the current one.
    /// `None` and zero periods disable the interval.
    pub fn set_period_at(&mut self, period: Option<Duration>, now: Instant) {
        let period = period.filter(|p| !p.is_zero());
        if period == self.period {
            return;
        }
        self.cancel();
        self.period = period;
        self.next_due = period.map(|p| now + p);
    }

    /// Stop firing until a new period is set.
    pub fn cancel(&mut self) {
        self.period = None;
        self.next_due = None;
    }

    /// Time left before the next firing, `None` while disabled.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Fire the callback if it is due. Fires at most once per call: a loop that
    /// fell behind by more than a period resumes from `now` instead of bursting.
    pub fn poll(&mut self, now: Instant) -> bool {
        let (Some(due), Some(period)) = (self.next_due, self.period) else {
            return false;
        };
        if now < due {
            return false;
        }
        let next = due + period;
        self.next_due = Some(if next <= now { now + period } else { next });
        (self.callback)();
        true
    }
}

impl Drop for Interval<'_> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn disabled_interval_never_fires() {
        let fired = Cell::new(0);
        let mut interval = Interval::new(|| fired.set(fired.get() + 1));
        let t0 = Instant::now();

        assert!(!interval.poll(t0 + 10 * MS));
        assert_eq!(interval.time_until_due(t0), None);
        drop(interval);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn fires_once_per_period() {
        let fired = Cell::new(0);
        let mut interval = Interval::new(|| fired.set(fired.get() + 1));
        let t0 = Instant::now();
        interval.set_period_at(Some(80 * MS), t0);

        assert!(!interval.poll(t0 + 79 * MS));
        assert!(interval.poll(t0 + 80 * MS));
        assert!(!interval.poll(t0 + 100 * MS));
        assert!(interval.poll(t0 + 160 * MS));
        assert_eq!(interval.time_until_due(t0 + 200 * MS), Some(40 * MS));
        drop(interval);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn same_period_does_not_restart() {
        let mut interval = Interval::new(|| {});
        let t0 = Instant::now();
        interval.set_period_at(Some(80 * MS), t0);
        interval.set_period_at(Some(80 * MS), t0 + 50 * MS);

        assert_eq!(interval.time_until_due(t0 + 50 * MS), Some(30 * MS));
    }

    #[test]
    fn new_period_restarts_from_now() {
        let mut interval = Interval::new(|| {});
        let t0 = Instant::now();
        interval.set_period_at(Some(80 * MS), t0);
        interval.set_period_at(Some(40 * MS), t0 + 50 * MS);

        assert!(!interval.poll(t0 + 80 * MS));
        assert!(interval.poll(t0 + 90 * MS));
    }

    #[test]
    fn disabling_then_reenabling() {
        let fired = Cell::new(0);
        let mut interval = Interval::new(|| fired.set(fired.get() + 1));
        let t0 = Instant::now();
        interval.set_period_at(Some(80 * MS), t0);
        interval.set_period_at(None, t0 + 10 * MS);

        assert!(!interval.is_active());
        assert!(!interval.poll(t0 + 500 * MS));

        interval.set_period_at(Some(80 * MS), t0 + 500 * MS);
        assert!(!interval.poll(t0 + 520 * MS));
        assert!(interval.poll(t0 + 580 * MS));
        drop(interval);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn swapped_callback_keeps_schedule() {
        let first = Cell::new(0);
        let second = Cell::new(0);
        let mut interval = Interval::new(|| first.set(first.get() + 1));
        let t0 = Instant::now();
        interval.set_period_at(Some(80 * MS), t0);

        interval.set_callback(|| second.set(second.get() + 1));
        assert_eq!(interval.time_until_due(t0 + 20 * MS), Some(60 * MS));
        assert!(interval.poll(t0 + 80 * MS));
        drop(interval);

        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn late_poll_does_not_burst() {
        let fired = Cell::new(0);
        let mut interval = Interval::new(|| fired.set(fired.get() + 1));
        let t0 = Instant::now();
        interval.set_period_at(Some(80 * MS), t0);

        assert!(interval.poll(t0 + 400 * MS));
        assert!(!interval.poll(t0 + 401 * MS));
        assert_eq!(interval.time_until_due(t0 + 400 * MS), Some(80 * MS));
        drop(interval);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn schedule_swaps_callback_and_period() {
        let first = Cell::new(0);
        let second = Cell::new(0);
        let mut interval = Interval::new(|| first.set(first.get() + 1));
        interval.schedule(|| second.set(second.get() + 1), Some(80 * MS));
        assert!(interval.is_active());

        let due = Instant::now() + 100 * MS;
        assert!(interval.poll(due));
        interval.schedule(|| {}, None);
        assert!(!interval.poll(due + 200 * MS));
        drop(interval);

        assert_eq!((first.get(), second.get()), (0, 1));
    }

    #[test]
    fn zero_period_is_disabled() {
        let mut interval = Interval::new(|| {});
        interval.set_period(Some(Duration::ZERO));
        assert!(!interval.is_active());
        assert_eq!(interval.period(), None);
    }
}
