#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared status storage for the firmware target.
//!
//! Lightweight atomics track poll progress, output activity, and watchdog
//! services so the heartbeat task can surface a [`StatusSnapshot`] without
//! touching the orchestrator's state directly.

use fixture_core::clock::TickInstant;
use fixture_core::config::{OUTPUT_COUNT, OutputId};
use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

/// Completed poll cycles since boot.
static POLL_COUNT: AtomicU32 = AtomicU32::new(0);
/// Bitmask of outputs currently in their active phase (1 == active).
static ACTIVE_MASK: AtomicU8 = AtomicU8::new(0);
/// Watchdog services since boot.
static WATCHDOG_SERVICES: AtomicU32 = AtomicU32::new(0);
/// Tick (+1) of the most recent committed input edge (0 == none yet).
static LAST_EDGE_TICKS: AtomicU32 = AtomicU32::new(0);
/// Debounced logical state of the trigger input.
static INPUT_ACTIVE: AtomicBool = AtomicBool::new(false);

fn bit_for(id: OutputId) -> u8 {
    1 << id.as_index()
}

fn encode_ticks(ticks: u32) -> u32 {
    ticks.wrapping_add(1)
}

fn decode_ticks(raw: u32) -> Option<u32> {
    if raw == 0 {
        None
    } else {
        Some(raw.wrapping_sub(1))
    }
}

/// Counts one completed poll cycle.
pub fn record_poll() {
    POLL_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Records whether an output is currently driving its active value.
pub fn record_output_active(id: OutputId, active: bool) {
    let bit = bit_for(id);
    if active {
        ACTIVE_MASK.fetch_or(bit, Ordering::Relaxed);
    } else {
        ACTIVE_MASK.fetch_and(!bit, Ordering::Relaxed);
    }
}

/// Clears every output bit, marking them all idle.
pub fn reset_outputs() {
    ACTIVE_MASK.store(0, Ordering::Relaxed);
}

/// Counts one watchdog service.
pub fn record_watchdog_service() {
    WATCHDOG_SERVICES.fetch_add(1, Ordering::Relaxed);
}

/// Stores the tick of the latest committed input edge.
pub fn record_edge(at: TickInstant) {
    LAST_EDGE_TICKS.store(encode_ticks(at.ticks()), Ordering::Relaxed);
}

/// Stores the debounced logical input state.
pub fn record_input_active(active: bool) {
    INPUT_ACTIVE.store(active, Ordering::Relaxed);
}

/// Point-in-time copy of the status cells.
pub struct StatusSnapshot {
    pub polls: u32,
    pub active: [bool; OUTPUT_COUNT],
    pub watchdog_services: u32,
    pub last_edge_ticks: Option<u32>,
    pub input_active: bool,
}

/// Builds a [`StatusSnapshot`] from the stored metrics.
pub fn snapshot() -> StatusSnapshot {
    let mask = ACTIVE_MASK.load(Ordering::Relaxed);
    StatusSnapshot {
        polls: POLL_COUNT.load(Ordering::Relaxed),
        active: core::array::from_fn(|index| mask & (1 << index) != 0),
        watchdog_services: WATCHDOG_SERVICES.load(Ordering::Relaxed),
        last_edge_ticks: decode_ticks(LAST_EDGE_TICKS.load(Ordering::Relaxed)),
        input_active: INPUT_ACTIVE.load(Ordering::Relaxed),
    }
}
