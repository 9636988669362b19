//! Fuzz target: broker command path
//!
//! Pushes arbitrary payloads through `CommandQueue` and
//! `ActuationCommand::parse` and verifies:
//! - No panics under arbitrary byte inputs
//! - Oversize frames are refused and counted, never truncated
//! - A frame that comes out of the queue is byte-identical to what went in
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use critical_section as _;
use farmnode::app::commands::{ActuationCommand, CommandQueue, MAX_COMMAND_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let queue = CommandQueue::new();

    match queue.push(data) {
        Ok(()) => {
            let frame = queue.pop().expect("pushed frame must be poppable");
            assert_eq!(&frame[..], data);
            if let Ok(cmd) = ActuationCommand::parse(&frame) {
                let _ = (cmd.actuator(), cmd.turns_on());
            }
        }
        Err(_) => {
            assert!(data.len() > MAX_COMMAND_LEN);
            assert_eq!(queue.dropped(), 1);
        }
    }
});
