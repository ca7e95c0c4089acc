//! Hardware-facing seams: logic levels, edges, and the narrow traits the
//! firmware and emulator implement.
//!
//! The core never touches pins or timers directly. Each generator owns one
//! output port exclusively, the orchestrator owns the input port and the
//! watchdog, and everything else is plain data.

use core::fmt;

/// Digital logic level.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[must_use]
    pub const fn toggled(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }

    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => f.write_str("low"),
            Level::High => f.write_str("high"),
        }
    }
}

/// Committed change of a debounced logical level.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Edge {
    /// The stable level became logically active.
    Rising,
    /// The stable level became logically inactive.
    Falling,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Rising => f.write_str("rising"),
            Edge::Falling => f.write_str("falling"),
        }
    }
}

/// Wiring sense of a switched line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// Physical level that counts as "on" for this wiring.
    #[must_use]
    pub const fn active_level(self) -> Level {
        match self {
            Polarity::ActiveHigh => Level::High,
            Polarity::ActiveLow => Level::Low,
        }
    }

    /// Physical level that counts as "off" for this wiring.
    #[must_use]
    pub const fn inactive_level(self) -> Level {
        self.active_level().toggled()
    }

    /// Map a physical sample onto the logical domain, where active is high.
    #[must_use]
    pub const fn logical(self, raw: Level) -> Level {
        match self {
            Polarity::ActiveHigh => raw,
            Polarity::ActiveLow => raw.toggled(),
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::ActiveHigh => f.write_str("active-high"),
            Polarity::ActiveLow => f.write_str("active-low"),
        }
    }
}

/// Polled digital input, e.g. the pressure plate.
pub trait DigitalInput {
    fn read_level(&mut self) -> Level;
}

/// Fire-and-forget binary output. Assumed to always succeed.
pub trait DigitalOutput {
    fn set_level(&mut self, level: Level);
}

/// Fire-and-forget 8-bit duty-cycle output. Assumed to always succeed.
pub trait PwmOutput {
    fn set_duty(&mut self, duty: u8);
}

/// Hardware liveness timer. Must be serviced at least once per poll cycle or
/// the device resets; the reset is the system's only recovery path from a
/// stuck cycle.
pub trait Watchdog {
    fn service(&mut self);
}

/// Watchdog stand-in for wiring paths without a hardware timer.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopWatchdog;

impl Watchdog for NoopWatchdog {
    fn service(&mut self) {}
}
