//! Shared record under concurrent access from several threads.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use farmnode::app::state::{Actuator, DriveSource, SharedFarmState};

use crate::mock_hw::MockOutputs;

// ── Readers never observe a half-written sample ───────────────

const READERS: u32 = 3;
const SNAPSHOTS_PER_READER: u32 = 2_000;

#[test]
fn concurrent_readers_see_whole_samples_only() {
    let shared = SharedFarmState::new(MockOutputs::new());
    // Writer and readers leave the gate together.
    let gate = Arc::new(Barrier::new(READERS as usize + 1));
    // Completed four-field writes; readers start sampling after the first.
    let writes = Arc::new(AtomicU32::new(0));
    // Readers that have taken their full quota of snapshots.
    let finished = Arc::new(AtomicU32::new(0));

    let writer = {
        let shared = shared.clone();
        let gate = Arc::clone(&gate);
        let writes = Arc::clone(&writes);
        let finished = Arc::clone(&finished);
        thread::spawn(move || {
            gate.wait();
            let mut n = 0u32;
            loop {
                let v = (n % 100) as u8 + 1;
                shared.with_exclusive_access(|s| {
                    s.temperature = f32::from(v);
                    s.air_humidity = f32::from(v);
                    s.soil_moisture = v;
                    s.light_level = v;
                });
                n = n.wrapping_add(1);
                writes.store(n, Ordering::Release);
                if finished.load(Ordering::Acquire) == READERS {
                    break;
                }
            }
        })
    };

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let shared = shared.clone();
            let gate = Arc::clone(&gate);
            let writes = Arc::clone(&writes);
            let finished = Arc::clone(&finished);
            thread::spawn(move || {
                gate.wait();
                while writes.load(Ordering::Acquire) == 0 {
                    thread::yield_now();
                }
                for _ in 0..SNAPSHOTS_PER_READER {
                    let s = shared.snapshot();
                    let v = s.soil_moisture;
                    assert!(v >= 1, "sampled before any write: {:?}", s);
                    assert_eq!(s.light_level, v, "torn read: {:?}", s);
                    assert_eq!(s.temperature, f32::from(v), "torn read: {:?}", s);
                    assert_eq!(s.air_humidity, f32::from(v), "torn read: {:?}", s);
                    thread::yield_now();
                }
                finished.fetch_add(1, Ordering::Release);
            })
        })
        .collect();

    for r in readers {
        r.join().unwrap();
    }
    writer.join().unwrap();

    assert_eq!(finished.load(Ordering::Acquire), READERS);
    assert!(writes.load(Ordering::Acquire) > 0);
}

// ── Recorded state always matches the relay level ─────────────

#[test]
fn recorded_actuator_state_tracks_output_under_contention() {
    let shared = SharedFarmState::new(MockOutputs::new());

    let drivers: Vec<_> = [DriveSource::Remote, DriveSource::Failsafe]
        .into_iter()
        .map(|source| {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..2_000 {
                    let on = (i % 2 == 0) ^ (source == DriveSource::Failsafe);
                    shared.drive(Actuator::Pump, on, source).unwrap();
                }
            })
        })
        .collect();

    for _ in 0..2_000 {
        shared.inspect_outputs(|state, outputs| {
            for a in Actuator::ALL {
                assert_eq!(state.actuator(a).on, outputs.is_on(a));
            }
        });
    }

    for d in drivers {
        d.join().unwrap();
    }
    shared.inspect_outputs(|state, outputs| {
        assert_eq!(state.pump_on(), outputs.is_on(Actuator::Pump));
        assert_eq!(outputs.writes_to(Actuator::Pump).len(), 4_000);
        assert!(outputs.writes_to(Actuator::Light).is_empty());
    });
}

#[test]
fn failed_relay_write_leaves_record_untouched() {
    let outputs = MockOutputs::new();
    let fail = outputs.fail_handle();
    let shared = SharedFarmState::new(outputs);

    shared.drive(Actuator::Light, true, DriveSource::Remote).unwrap();
    fail.store(true, Ordering::SeqCst);
    assert!(shared.drive(Actuator::Light, false, DriveSource::Remote).is_err());

    let s = shared.snapshot();
    assert!(s.light_on());
    assert_eq!(s.actuator(Actuator::Light).source, DriveSource::Remote);
}
