use std::sync::mpsc;
use std::time::Duration;

use wfhtrack::{
    cue::{COINS_PER_BATCH, CUE_LIFETIME},
    rate::PayPeriod,
    runtime::{AppEvent, FixedTicker, ManualClock, Runner, TestEventSource},
    session::{SessionConfig, SessionController},
};

const FRAME: Duration = Duration::from_millis(100);

fn session(salary: &str, period: PayPeriod, clock: &ManualClock) -> SessionController {
    SessionController::new(SessionConfig {
        salary: salary.to_string(),
        pay_period: period,
        feedback_enabled: true,
    })
    .with_clock(Box::new(clock.clone()))
    .with_seed(99)
}

/// Steps the runner `frames` times, advancing the clock one frame per Tick
fn drive(
    runner: &Runner<TestEventSource, FixedTicker>,
    session: &mut SessionController,
    clock: &ManualClock,
    frames: usize,
) -> usize {
    let mut crossings = 0;
    for _ in 0..frames {
        match runner.step() {
            AppEvent::Tick => clock.advance(FRAME),
            AppEvent::Resize(width, _) => session.set_viewport_width(width),
            AppEvent::Key(_) => {}
        }
        crossings += session.poll().crossings;
    }
    crossings
}

// Headless run of the event loop: frames arrive as Ticks from the runner,
// accumulation happens once per simulated second.
#[test]
fn headless_session_accrues_once_per_second() {
    let clock = ManualClock::new();
    // 1 unit per second
    let mut session = session("7488000", PayPeriod::Yearly, &clock);

    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    session.start();
    drive(&runner, &mut session, &clock, 35);

    assert!(session.is_running());
    assert_eq!(session.total(), 3.0);
}

#[test]
fn headless_monthly_salary_drops_coins_and_expires_them() {
    let clock = ManualClock::new();
    // 780000 a month is 12 * 780000 / 7488000 = 1.25 per second
    let mut session = session("780000", PayPeriod::Monthly, &clock);

    let (tx, rx) = mpsc::channel();
    tx.send(AppEvent::Resize(120, 40)).unwrap();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    session.start();
    // 13 seconds (plus the resize step): first bucket crossed on tick 8
    let crossings = drive(&runner, &mut session, &clock, 131);

    assert_eq!(crossings, 1);
    assert_eq!(session.active_cue_count(), COINS_PER_BATCH);
    assert!(session.cues().all(|c| c.x < 120.0));

    session.stop();
    clock.advance(CUE_LIFETIME);
    assert_eq!(session.poll().expired, COINS_PER_BATCH);
    assert_eq!(session.active_cue_count(), 0);
}

#[test]
fn headless_reset_mid_run() {
    let clock = ManualClock::new();
    let mut session = session("2880000", PayPeriod::Biweekly, &clock);
    // 26 * 2880000 / 7488000 = 10 per second
    assert_eq!(session.rate(), 10.0);

    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    session.start();
    let crossings = drive(&runner, &mut session, &clock, 25);
    assert_eq!(crossings, 2);
    assert_eq!(session.active_cue_count(), 2 * COINS_PER_BATCH);

    session.reset();
    drive(&runner, &mut session, &clock, 20);

    assert_eq!(session.total(), 0.0);
    assert!(!session.is_running());
    assert_eq!(session.active_cue_count(), 0);
}
