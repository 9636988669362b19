//! Fuzz target: `PeerRecord::decode` and `GatewayRules::evaluate`
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Only 24-byte inputs decode
//! - A decoded record re-encodes to exactly the input bytes
//! - The gateway never answers anything but a sensor record
//!
//! cargo fuzz run fuzz_peer_record

#![no_main]

use farmnode::config::SystemConfig;
use farmnode::peer::{GatewayRules, NodeRole, PeerRecord, RECORD_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(record) = PeerRecord::decode(data) else {
        return;
    };
    assert_eq!(data.len(), RECORD_LEN);
    assert_eq!(&record.encode()[..], data);

    let mut rules = GatewayRules::from_config(&SystemConfig::default());
    let out = rules.evaluate(&record);
    if record.role != NodeRole::Sensor {
        assert!(out.is_empty());
    }
    for cmd in &out {
        assert_eq!(cmd.role, NodeRole::Gateway);
    }
});
