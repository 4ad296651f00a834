use crate::accumulator::{apply_tick, AccumulationTimer};
use crate::cue::{Cue, CueController};
use crate::feedback::{FeedbackPlayer, SilentPlayer};
use crate::rate::{compute_rate, PayPeriod};
use crate::runtime::{Clock, SystemClock};

/// Startup values for a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub salary: String,
    pub pay_period: PayPeriod,
    pub feedback_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            salary: String::new(),
            pay_period: PayPeriod::Yearly,
            feedback_enabled: true,
        }
    }
}

/// What a call to [`SessionController::poll`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Accumulation ticks applied, including any caught up after a late poll
    pub ticks: u32,
    /// Ticks among them that crossed a bucket boundary
    pub crossings: usize,
    pub expired: usize,
}

impl PollReport {
    pub fn changed(&self) -> bool {
        self.ticks > 0 || self.expired > 0
    }
}

/// Owns all mutable state of the earnings screen.
///
/// Every mutation goes through `&mut self` on one thread. Timers are plain
/// deadlines checked in [`poll`](Self::poll), so a cancelled tick can never
/// land after `stop()` or `reset()` returns.
pub struct SessionController {
    salary_input: String,
    pay_period: PayPeriod,
    running: bool,
    total: f64,
    /// Rate the timer is currently armed for
    armed_rate: f64,
    viewport_width: u16,
    timer: AccumulationTimer,
    cues: CueController,
    player: Box<dyn FeedbackPlayer>,
    clock: Box<dyn Clock>,
}

impl SessionController {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            salary_input: config.salary,
            pay_period: config.pay_period,
            running: false,
            total: 0.0,
            armed_rate: 0.0,
            viewport_width: 80,
            timer: AccumulationTimer::new(),
            cues: CueController::new(config.feedback_enabled),
            player: Box::new(SilentPlayer),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_player(mut self, player: Box<dyn FeedbackPlayer>) -> Self {
        self.player = player;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Makes coin placement reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.cues = CueController::with_seed(self.cues.is_enabled(), seed);
        self
    }

    // --- inputs ---

    pub fn salary_input(&self) -> &str {
        &self.salary_input
    }

    pub fn set_salary_input(&mut self, text: impl Into<String>) {
        self.salary_input = text.into();
        self.sync_timer();
    }

    /// Appends to the salary field. Only digits and a decimal point are
    /// accepted; returns false if `c` was rejected.
    pub fn push_salary_char(&mut self, c: char) -> bool {
        if !(c.is_ascii_digit() || c == '.') {
            return false;
        }
        self.salary_input.push(c);
        self.sync_timer();
        true
    }

    pub fn pop_salary_char(&mut self) {
        if self.salary_input.pop().is_some() {
            self.sync_timer();
        }
    }

    pub fn clear_salary_input(&mut self) {
        self.set_salary_input(String::new());
    }

    pub fn pay_period(&self) -> PayPeriod {
        self.pay_period
    }

    pub fn set_pay_period(&mut self, period: PayPeriod) {
        self.pay_period = period;
        self.sync_timer();
    }

    pub fn cycle_pay_period(&mut self) {
        self.set_pay_period(self.pay_period.next());
    }

    /// Earnings per second for the current input, re-derived on every call
    pub fn rate(&self) -> f64 {
        compute_rate(&self.salary_input, self.pay_period)
    }

    pub fn can_start(&self) -> bool {
        self.rate() > 0.0
    }

    // --- running state ---

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Begin accruing. Does nothing while the rate is zero or when already
    /// running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        if !self.can_start() {
            tracing::debug!("start ignored: no earnings rate");
            return;
        }
        self.running = true;
        tracing::info!(rate = self.rate(), period = %self.pay_period, "started working");
        self.sync_timer();
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.sync_timer();
        tracing::info!(total = self.total, "stopped working");
    }

    pub fn toggle(&mut self) {
        if self.running {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Zero the total, stop, and drop every active coin in one step.
    pub fn reset(&mut self) {
        self.running = false;
        self.timer.cancel();
        self.armed_rate = 0.0;
        self.total = 0.0;
        self.cues.clear();
        tracing::info!("session reset");
    }

    // --- feedback ---

    pub fn feedback_enabled(&self) -> bool {
        self.cues.is_enabled()
    }

    pub fn set_feedback_enabled(&mut self, enabled: bool) {
        self.cues.set_enabled(enabled);
        tracing::debug!(enabled, "coin animation toggled");
    }

    pub fn toggle_feedback(&mut self) {
        self.set_feedback_enabled(!self.feedback_enabled());
    }

    pub fn cues(&self) -> impl Iterator<Item = &Cue> {
        self.cues.active()
    }

    pub fn active_cue_count(&self) -> usize {
        self.cues.active_len()
    }

    pub fn set_viewport_width(&mut self, width: u16) {
        self.viewport_width = width;
    }

    pub fn now(&self) -> std::time::Instant {
        self.clock.now()
    }

    // --- timers ---

    /// Run whichever timer callbacks are due: every accumulation tick that
    /// came due since the last poll, in order, then every due coin expiry.
    pub fn poll(&mut self) -> PollReport {
        let now = self.clock.now();
        let mut report = PollReport {
            ticks: self.timer.poll(now),
            ..PollReport::default()
        };

        for _ in 0..report.ticks {
            let outcome = apply_tick(self.total, self.armed_rate);
            self.total = outcome.total;

            if outcome.crossed {
                report.crossings += 1;
                self.cues
                    .on_threshold_crossed(now, self.viewport_width, self.player.as_mut());
            }
        }
        if report.ticks > 0 {
            tracing::trace!(ticks = report.ticks, total = self.total, "tick");
        }

        report.expired = self.cues.poll_expiries(now);
        report
    }

    /// Keeps the schedule armed exactly while running with a positive rate.
    /// A rate change re-arms with the new rate.
    fn sync_timer(&mut self) {
        let rate = self.rate();
        if self.running && rate > 0.0 {
            if !self.timer.is_armed() || rate != self.armed_rate {
                self.timer.arm(self.clock.now());
                self.armed_rate = rate;
            }
        } else {
            self.timer.cancel();
            self.armed_rate = 0.0;
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("salary_input", &self.salary_input)
            .field("pay_period", &self.pay_period)
            .field("running", &self.running)
            .field("total", &self.total)
            .field("timer", &self.timer)
            .field("cues", &self.cues.active_len())
            .finish()
    }
}

/// Renders an amount with four decimals behind the currency symbol
pub fn format_amount(amount: f64, symbol: &str) -> String {
    format!("{}{:.4}", symbol, amount)
}
