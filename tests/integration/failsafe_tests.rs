//! Failsafe watering against a fake link and a virtual clock.

use std::time::Duration;

use farmnode::app::ports::TimePort;
use farmnode::app::state::{Actuator, DriveSource, SharedFarmState};
use farmnode::config::SystemConfig;
use farmnode::tasks::{FailsafePhase, FailsafeTask};

use crate::mock_hw::{FakeClock, FakeLink, MockOutputs};

type Task = FailsafeTask<FakeLink, MockOutputs>;

fn make_task(soil: u8) -> (Task, FakeLink, SharedFarmState<MockOutputs>) {
    let link = FakeLink::default();
    let shared = SharedFarmState::new(MockOutputs::new());
    shared.with_exclusive_access(|s| s.soil_moisture = soil);
    let task = FailsafeTask::new(link.clone(), shared.clone(), &SystemConfig::default());
    (task, link, shared)
}

/// Step once and let the virtual clock absorb the returned delay.
fn tick(task: &mut Task, clock: &FakeClock) -> Duration {
    let d = task.step();
    clock.sleep(d);
    d
}

/// Run until `phase` is reached, bounded so a broken machine fails fast.
fn run_until(task: &mut Task, clock: &FakeClock, phase: FailsafePhase) {
    for _ in 0..1_000 {
        if task.phase() == phase {
            return;
        }
        tick(task, clock);
    }
    panic!("never reached {:?}, stuck in {:?}", phase, task.phase());
}

// ── Offline watering cycle ────────────────────────────────────

#[test]
fn dry_soil_offline_waters_thirty_seconds_then_cools_down() {
    let (mut task, _link, shared) = make_task(20);
    let clock = FakeClock::new();

    // 60 offline ticks are tolerated.
    for _ in 0..60 {
        assert_eq!(tick(&mut task, &clock), Duration::from_secs(1));
        assert_eq!(task.phase(), FailsafePhase::Monitoring);
    }
    assert!(!shared.snapshot().pump_on());

    // The 61st tips it over.
    tick(&mut task, &clock);
    assert_eq!(task.phase(), FailsafePhase::Evaluating);
    assert_eq!(task.outage_ticks(), 61);

    tick(&mut task, &clock);
    assert_eq!(task.phase(), FailsafePhase::Watering { pump_started: false });

    let pump_on_at = clock.uptime_ms();
    let hold = tick(&mut task, &clock);
    assert_eq!(hold, Duration::from_secs(30));
    assert!(shared.snapshot().pump_on());
    assert_eq!(shared.snapshot().actuator(Actuator::Pump).source, DriveSource::Failsafe);

    let cooldown = tick(&mut task, &clock);
    assert_eq!(task.phase(), FailsafePhase::Cooldown);
    assert!(!shared.snapshot().pump_on());
    assert_eq!(cooldown, Duration::from_secs(300));
    // Pump released exactly at the end of the hold, then the cooldown sleep.
    assert_eq!(clock.uptime_ms() - pump_on_at, 30_000 + 300_000);

    shared.inspect_outputs(|_, outputs| {
        assert_eq!(outputs.writes_to(Actuator::Pump), vec![true, false]);
    });
    assert_eq!(task.cycles(), 1);
}

#[test]
fn outage_counter_survives_cooldown() {
    let (mut task, _link, shared) = make_task(20);
    let clock = FakeClock::new();

    run_until(&mut task, &clock, FailsafePhase::Cooldown);
    tick(&mut task, &clock);
    assert_eq!(task.phase(), FailsafePhase::Monitoring);

    // Still offline and still dry: the very next tick re-evaluates.
    tick(&mut task, &clock);
    assert_eq!(task.phase(), FailsafePhase::Evaluating);
    run_until(&mut task, &clock, FailsafePhase::Cooldown);
    assert_eq!(task.cycles(), 2);
    assert!(!shared.snapshot().pump_on());
}

#[test]
fn moist_soil_never_starts_the_pump() {
    let (mut task, _link, shared) = make_task(40);
    let clock = FakeClock::new();

    for _ in 0..500 {
        tick(&mut task, &clock);
        assert!(!matches!(task.phase(), FailsafePhase::Watering { .. }));
    }
    assert!(!shared.snapshot().pump_on());
    assert_eq!(task.cycles(), 0);
    shared.inspect_outputs(|_, outputs| assert!(outputs.calls.is_empty()));
}

#[test]
fn soil_exactly_at_threshold_counts_as_moist() {
    let (mut task, _link, shared) = make_task(35);
    let clock = FakeClock::new();

    run_until(&mut task, &clock, FailsafePhase::Evaluating);
    tick(&mut task, &clock);
    assert_eq!(task.phase(), FailsafePhase::Monitoring);
    assert!(!shared.snapshot().pump_on());
}

#[test]
fn link_flap_resets_the_counter() {
    let (mut task, link, shared) = make_task(20);
    let clock = FakeClock::new();

    for _ in 0..50 {
        tick(&mut task, &clock);
    }
    assert_eq!(task.outage_ticks(), 50);

    link.set(true);
    tick(&mut task, &clock);
    assert_eq!(task.outage_ticks(), 0);

    link.set(false);
    for _ in 0..50 {
        tick(&mut task, &clock);
    }
    assert_eq!(task.phase(), FailsafePhase::Monitoring);
    assert!(!shared.snapshot().pump_on());
}

#[test]
fn link_up_keeps_monitoring() {
    let (mut task, link, shared) = make_task(0);
    let clock = FakeClock::new();
    link.set(true);

    for _ in 0..200 {
        assert_eq!(tick(&mut task, &clock), Duration::from_secs(1));
    }
    assert_eq!(task.phase(), FailsafePhase::Monitoring);
    assert!(!shared.snapshot().pump_on());
}

// ── Ownership of the pump ─────────────────────────────────────

#[test]
fn remote_command_mid_cycle_is_not_overridden() {
    let (mut task, _link, shared) = make_task(20);
    let clock = FakeClock::new();

    run_until(&mut task, &clock, FailsafePhase::Watering { pump_started: true });
    assert!(shared.snapshot().pump_on());

    // Operator takes over while the hold is running.
    shared.drive(Actuator::Pump, true, DriveSource::Remote).unwrap();

    tick(&mut task, &clock);
    assert_eq!(task.phase(), FailsafePhase::Cooldown);
    let s = shared.snapshot();
    assert!(s.pump_on());
    assert_eq!(s.actuator(Actuator::Pump).source, DriveSource::Remote);
}

#[test]
fn stuck_relay_retries_pump_off_every_tick() {
    let (mut task, _link, shared) = make_task(20);
    let clock = FakeClock::new();

    run_until(&mut task, &clock, FailsafePhase::Watering { pump_started: true });
    let fail = shared.inspect_outputs(|_, outputs| outputs.fail_handle());
    fail.store(true, std::sync::atomic::Ordering::SeqCst);

    assert_eq!(tick(&mut task, &clock), Duration::from_secs(1));
    assert_eq!(task.phase(), FailsafePhase::Watering { pump_started: true });

    fail.store(false, std::sync::atomic::Ordering::SeqCst);
    tick(&mut task, &clock);
    assert_eq!(task.phase(), FailsafePhase::Cooldown);
    assert!(!shared.snapshot().pump_on());
}
