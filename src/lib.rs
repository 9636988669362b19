//! Farm node firmware library.
//!
//! Exposes the domain, task loops, and adapters for integration testing.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod peer;
pub mod pins;
pub mod tasks;

pub mod adapters;
pub mod drivers;
pub mod sensors;

// Host unit tests need a critical-section implementation for embassy-sync.
#[cfg(test)]
use critical_section as _;
