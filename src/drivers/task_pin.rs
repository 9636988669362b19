//! Core-pinned FreeRTOS task spawning for the ESP32 dual-core.
//!
//! ESP-IDF implements `std::thread` on pthreads, which are thin wrappers
//! around FreeRTOS tasks. `esp_pthread_set_cfg()` sets thread-local
//! configuration for the *next* `pthread_create()` from the calling thread,
//! so the config→spawn pair must not interleave with other thread creation
//! on the same thread. Only `main()` spawns, so this holds.
//!
//! On non-ESP targets core and priority are ignored.

use std::io;
use std::thread::JoinHandle;

/// CPU core identifiers for the ESP32 Xtensa LX6 dual-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU): Wi-Fi / lwIP live here, so network tasks do too.
    Pro = 0,
    /// Core 1 (APP_CPU): sensing and the failsafe.
    App = 1,
}

/// Placement of one long-running task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    /// Null-terminated, e.g. `"sampling\0"`.
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

pub const SAMPLING_TASK: TaskSpec = TaskSpec {
    name: "sampling\0",
    core: Core::App,
    priority: 1,
    stack_kb: 4,
};

/// MQTT client calls and JSON encoding need the larger stack.
pub const TELEMETRY_TASK: TaskSpec = TaskSpec {
    name: "telemetry\0",
    core: Core::Pro,
    priority: 2,
    stack_kb: 8,
};

pub const FAILSAFE_TASK: TaskSpec = TaskSpec {
    name: "failsafe\0",
    core: Core::App,
    priority: 1,
    stack_kb: 4,
};

impl TaskSpec {
    pub fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

/// Spawn a thread pinned to `spec.core` with its priority and stack.
#[cfg(target_os = "espidf")]
pub fn spawn_on_core(
    spec: TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    // SAFETY: the default config is plain data; `name` is 'static and
    // null-terminated, so the pointer outlives the pthread_create call.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = spec.core as i32;
        cfg.prio = spec.priority as i32;
        cfg.stack_size = (spec.stack_kb * 1024) as _;
        cfg.thread_name = spec.name.as_ptr() as *const _;
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as i32 {
            return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
        }
    }

    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        spec.display_name(),
        spec.core,
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .spawn(f)
}

/// Simulation fallback: ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core(
    spec: TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    log::info!(
        "Spawning '{}' (sim, no core pinning, stack={}KB)",
        spec.display_name(),
        spec.stack_kb
    );

    // Host threads need more headroom than the FreeRTOS budget.
    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size(spec.stack_kb.max(64) * 1024)
        .spawn(f)
}
