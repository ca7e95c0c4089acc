#![no_std]

// Timed-sequencing core for the flame-effect fixture.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library: every timing decision runs on a caller-supplied
// millisecond reading, and hardware is reached only through the traits in
// `io`.

pub mod clock;
pub mod config;
pub mod console;
pub mod deadline;
pub mod debounce;
pub mod drive;
pub mod generator;
pub mod io;
pub mod orchestrator;
pub mod telemetry;
