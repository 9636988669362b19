//! Broker session, publish schedule, and remote command application.

use std::sync::Arc;
use std::time::Duration;

use farmnode::app::commands::CommandQueue;
use farmnode::app::state::{Actuator, DriveSource, SharedFarmState};
use farmnode::config::SystemConfig;
use farmnode::tasks::{LinkState, TelemetryCommandTask};

use crate::mock_hw::{MockBroker, MockOutputs};

type Task = TelemetryCommandTask<MockBroker, MockOutputs>;

fn make_task() -> (Task, SharedFarmState<MockOutputs>, SystemConfig) {
    let config = SystemConfig::default();
    let queue = Arc::new(CommandQueue::new());
    let shared = SharedFarmState::new(MockOutputs::new());
    let broker = MockBroker::new(Arc::clone(&queue));
    let task = TelemetryCommandTask::new(broker, shared.clone(), queue, &config);
    (task, shared, config)
}

// ── Session ───────────────────────────────────────────────────

#[test]
fn first_step_connects_subscribes_and_publishes() {
    let (mut task, _shared, config) = make_task();

    let delay = task.step(0);

    assert_eq!(task.link_state(), LinkState::Connected);
    assert_eq!(delay, Duration::from_millis(u64::from(config.command_poll_interval_ms)));
    assert_eq!(task.broker().subscriptions, vec![config.command_topic.to_string()]);
    assert_eq!(task.published(), 1);
    assert_eq!(task.broker().published[0].0, config.telemetry_topic.as_str());
}

#[test]
fn unreachable_broker_backs_off_five_seconds() {
    let (mut task, _shared, _config) = make_task();
    task.broker_mut().reachable = false;

    let delay = task.step(0);

    assert_eq!(delay, Duration::from_secs(5));
    assert_eq!(task.link_state(), LinkState::Disconnected);
    assert_eq!(task.broker().connect_attempts, 1);
}

#[test]
fn subscribe_failure_counts_as_failed_connect() {
    let (mut task, _shared, _config) = make_task();
    task.broker_mut().subscribe_ok = false;

    assert_eq!(task.step(0), Duration::from_secs(5));
    assert_eq!(task.link_state(), LinkState::Disconnected);
}

#[test]
fn dropped_session_reconnects_on_next_step() {
    let (mut task, _shared, _config) = make_task();
    task.step(0);
    task.broker_mut().drop_next = true;

    let delay = task.step(100);
    assert_eq!(delay, Duration::ZERO);
    assert_eq!(task.link_state(), LinkState::Disconnected);

    task.step(100);
    assert_eq!(task.link_state(), LinkState::Connected);
    assert_eq!(task.broker().connect_attempts, 2);
}

#[test]
fn publish_while_disconnected_is_skipped_not_queued() {
    let (mut task, _shared, _config) = make_task();
    task.broker_mut().reachable = false;

    task.step(0);
    task.step(5_000);
    assert_eq!(task.published(), 0);
    assert!(task.broker().published.is_empty());

    // Back online: one snapshot at the next due time, no backlog.
    task.broker_mut().reachable = true;
    task.step(7_000);
    assert_eq!(task.published(), 0);
    task.step(10_000);
    assert_eq!(task.published(), 1);
}

#[test]
fn telemetry_publishes_every_five_seconds() {
    let (mut task, _shared, _config) = make_task();

    let mut now = 0;
    while now <= 20_000 {
        task.step(now);
        now += 100;
    }

    // t = 0, 5, 10, 15, 20 s
    assert_eq!(task.published(), 5);
}

#[test]
fn telemetry_carries_every_field() {
    let (mut task, shared, config) = make_task();
    shared.with_exclusive_access(|s| {
        s.temperature = 24.5;
        s.air_humidity = 61.0;
        s.soil_moisture = 20;
        s.light_level = 75;
    });
    shared.drive(Actuator::Mist, true, DriveSource::Remote).unwrap();

    task.step(0);

    let json = task.broker().last_json();
    assert_eq!(json["device_id"], config.device_id.as_str());
    assert_eq!(json["temp"], 24.5);
    assert_eq!(json["hum_air"], 61.0);
    assert_eq!(json["hum_soil"], 20);
    assert_eq!(json["light"], 75);
    assert_eq!(json["pump_state"], false);
    assert_eq!(json["light_state"], false);
    assert_eq!(json["mist_state"], true);
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn light_on_command_changes_only_light() {
    let (mut task, shared, _config) = make_task();
    task.step(0);
    let before = shared.snapshot();

    task.broker().deliver(br#"{"device":"LIGHT","status":"ON"}"#);
    task.step(100);

    let after = shared.snapshot();
    assert!(after.light_on());
    assert_eq!(after.actuator(Actuator::Light).source, DriveSource::Remote);
    assert_eq!(after.pump_on(), before.pump_on());
    assert_eq!(after.mist_on(), before.mist_on());
    shared.inspect_outputs(|_, outputs| {
        assert_eq!(outputs.writes_to(Actuator::Light), vec![true]);
        assert!(outputs.writes_to(Actuator::Pump).is_empty());
    });
}

#[test]
fn unknown_device_is_dropped_without_side_effects() {
    let (mut task, shared, _config) = make_task();
    task.step(0);
    let before = shared.snapshot();

    task.broker().deliver(br#"{"device":"HEATER","status":"ON"}"#);
    task.broker().deliver(b"not json");
    task.broker().deliver(br#"{"device":"PUMP"}"#);
    task.step(100);

    assert_eq!(shared.snapshot(), before);
    assert_eq!(task.rejected_commands(), 3);
    shared.inspect_outputs(|_, outputs| assert!(outputs.calls.is_empty()));
}

#[test]
fn commands_apply_in_arrival_order() {
    let (mut task, shared, _config) = make_task();
    task.step(0);

    task.broker().deliver(br#"{"device":"PUMP","status":"ON"}"#);
    task.broker().deliver(br#"{"device":"PUMP","status":"OFF"}"#);
    task.broker().deliver(br#"{"device":"PUMP","status":"ON"}"#);
    task.step(100);

    assert!(shared.snapshot().pump_on());
    shared.inspect_outputs(|_, outputs| {
        assert_eq!(outputs.writes_to(Actuator::Pump), vec![true, false, true]);
    });
}

#[test]
fn relay_failure_is_counted_and_state_kept() {
    let (mut task, shared, _config) = make_task();
    task.step(0);
    let fail = shared.inspect_outputs(|_, outputs| outputs.fail_handle());
    fail.store(true, std::sync::atomic::Ordering::SeqCst);

    task.broker().deliver(br#"{"device":"MIST","status":"ON"}"#);
    task.step(100);

    assert!(!shared.snapshot().mist_on());
    assert_eq!(task.rejected_commands(), 1);
}
