use std::time::{Duration, Instant};

/// Every multiple of this amount earns a coin drop
pub const BUCKET_SIZE: f64 = 10.0;

/// Nominal spacing between accumulation ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Most ticks replayed by one poll; an older backlog is dropped
pub const MAX_CATCH_UP: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub total: f64,
    /// At least one bucket boundary was crossed by this tick
    pub crossed: bool,
}

/// Adds one tick's worth of `rate` to `total`.
///
/// Crossing several buckets in one step still reports a single crossing.
pub fn apply_tick(total: f64, rate: f64) -> TickOutcome {
    let new_total = total + rate;
    let previous_bucket = (total / BUCKET_SIZE).floor();
    let new_bucket = (new_total / BUCKET_SIZE).floor();

    TickOutcome {
        total: new_total,
        crossed: new_bucket > previous_bucket,
    }
}

/// The one periodic schedule driving accumulation.
///
/// Holds at most a single pending deadline; arming always drops the
/// previous one first, so two schedules can never run side by side.
#[derive(Debug)]
pub struct AccumulationTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl AccumulationTimer {
    pub fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Cancel any existing schedule, then start a fresh one whose first tick
    /// is one period after `now`.
    pub fn arm(&mut self, now: Instant) {
        self.cancel();
        self.next_due = Some(now + self.period);
        tracing::trace!(period_ms = self.period.as_millis() as u64, "accumulation timer armed");
    }

    pub fn cancel(&mut self) {
        if self.next_due.take().is_some() {
            tracing::trace!("accumulation timer cancelled");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Returns how many ticks came due by `now`, advancing the schedule past
    /// them. Polling late replays the ticks in between, so the count keeps up
    /// with wall-clock time however coarse the caller's polling is.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };

        let mut fired = 0;
        while due <= now {
            fired += 1;
            due += self.period;
            if fired == MAX_CATCH_UP {
                // stalled far too long (e.g. suspend): drop the rest
                if due <= now {
                    due = now + self.period;
                }
                break;
            }
        }
        self.next_due = Some(due);
        fired
    }
}

impl Default for AccumulationTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_tick_adds_rate() {
        let outcome = apply_tick(1.5, 0.25);
        assert_eq!(outcome.total, 1.75);
        assert!(!outcome.crossed);
    }

    #[test]
    fn test_apply_tick_detects_single_crossing() {
        let outcome = apply_tick(9.5, 1.0);
        assert!(outcome.crossed);
        assert_eq!(outcome.total, 10.5);
    }

    #[test]
    fn test_apply_tick_exact_boundary_counts_as_crossing() {
        assert!(apply_tick(9.0, 1.0).crossed);
        // leaving the boundary does not cross again
        assert!(!apply_tick(10.0, 1.0).crossed);
    }

    #[test]
    fn test_apply_tick_multiple_buckets_signal_once() {
        let outcome = apply_tick(5.0, 37.0);
        assert!(outcome.crossed);
        assert_eq!(outcome.total, 42.0);
    }

    #[test]
    fn test_apply_tick_zero_rate_never_crosses() {
        assert!(!apply_tick(9.999, 0.0).crossed);
    }

    #[test]
    fn test_unarmed_timer_never_fires() {
        let mut timer = AccumulationTimer::new();
        let now = Instant::now();
        assert!(!timer.is_armed());
        assert_eq!(timer.poll(now + Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_timer_fires_once_per_period() {
        let mut timer = AccumulationTimer::new();
        let start = Instant::now();
        timer.arm(start);

        assert_eq!(timer.poll(start + Duration::from_millis(999)), 0);
        assert_eq!(timer.poll(start + Duration::from_millis(1000)), 1);
        assert_eq!(timer.poll(start + Duration::from_millis(1500)), 0);
        assert_eq!(timer.poll(start + Duration::from_millis(2050)), 1);
        assert_eq!(timer.next_due(), Some(start + Duration::from_secs(3)));
    }

    #[test]
    fn test_late_poll_keeps_nominal_phase() {
        let mut timer = AccumulationTimer::new();
        let start = Instant::now();
        timer.arm(start);

        assert_eq!(timer.poll(start + Duration::from_millis(1080)), 1);
        // next tick is one period after the previous due time, not after the poll
        assert_eq!(timer.next_due(), Some(start + Duration::from_secs(2)));
    }

    #[test]
    fn test_coarse_polling_keeps_up_with_wall_clock() {
        let mut timer = AccumulationTimer::new();
        let start = Instant::now();
        timer.arm(start);

        let mut fired = 0;
        for n in 1..=400u32 {
            fired += timer.poll(start + Duration::from_millis(1005) * n);
        }

        // 402.0s elapsed
        assert_eq!(fired, 402);
    }

    #[test]
    fn test_late_poll_replays_missed_ticks() {
        let mut timer = AccumulationTimer::new();
        let start = Instant::now();
        timer.arm(start);

        let late = start + Duration::from_millis(5200);
        assert_eq!(timer.poll(late), 5);
        assert_eq!(timer.poll(late), 0);
        assert_eq!(timer.next_due(), Some(start + Duration::from_secs(6)));
    }

    #[test]
    fn test_long_stall_replays_at_most_the_cap() {
        let mut timer = AccumulationTimer::new();
        let start = Instant::now();
        timer.arm(start);

        let late = start + Duration::from_secs(3600);
        assert_eq!(timer.poll(late), MAX_CATCH_UP);
        assert_eq!(timer.next_due(), Some(late + TICK_PERIOD));
    }

    #[test]
    fn test_rearm_replaces_previous_schedule() {
        let mut timer = AccumulationTimer::new();
        let start = Instant::now();
        timer.arm(start);
        timer.arm(start + Duration::from_millis(600));

        // the first schedule would have fired at 1.0s
        assert_eq!(timer.poll(start + Duration::from_millis(1000)), 0);
        assert_eq!(timer.poll(start + Duration::from_millis(1600)), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timer = AccumulationTimer::new();
        let start = Instant::now();
        timer.arm(start);
        timer.cancel();
        timer.cancel();

        assert!(!timer.is_armed());
        assert_eq!(timer.poll(start + Duration::from_secs(3)), 0);
    }
}
