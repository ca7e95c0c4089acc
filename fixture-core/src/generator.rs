//! The retriggerable two-phase timer behind every fixture output.
//!
//! One generic machine covers both output families: [`OutputGenerator`] is
//! parameterized over an [`OutputDrive`], so the binary dispenser/valve
//! lines and the servo-swept igniter share the trigger acceptance rule,
//! phase derivation, and idempotent-write policy.

use core::fmt;

use crate::clock::{Millis, TickInstant};
use crate::config::OutputId;
use crate::deadline::Deadline;
use crate::drive::{BinaryDrive, OutputDrive, ServoDrive};

/// Phase of a timer cycle, derived from the two deadlines on every query.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Both deadlines expired; output at its idle value.
    Idle,
    /// Delay running; output holds whatever was last driven.
    Delaying,
    /// Delay elapsed, duration running; output at its active value.
    Active,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => f.write_str("idle"),
            Phase::Delaying => f.write_str("delaying"),
            Phase::Active => f.write_str("active"),
        }
    }
}

/// Two-deadline monostable: delay, then active, then idle.
///
/// The deadlines are always re-armed together from the same instant, with
/// `off = delay + duration`, so `on` can never expire after `off`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Monostable {
    delay: Millis,
    duration: Millis,
    on_deadline: Deadline,
    off_deadline: Deadline,
}

impl Monostable {
    #[must_use]
    pub const fn new(delay: Millis, duration: Millis) -> Self {
        Self {
            delay,
            duration,
            on_deadline: Deadline::ready(),
            off_deadline: Deadline::ready(),
        }
    }

    /// Force both deadlines back to expired; the next [`Self::phase`] query
    /// reads Idle.
    pub fn reset(&mut self) {
        self.on_deadline = Deadline::ready();
        self.off_deadline = Deadline::ready();
    }

    /// Start a cycle at `now`.
    ///
    /// Rejected while the delay phase is still running (the guard against
    /// restart storms); accepted in Active or Idle, restarting the full
    /// schedule from `now`.
    pub fn trigger(&mut self, now: TickInstant) -> bool {
        if !self.on_deadline.expired(now) {
            return false;
        }

        self.on_deadline.arm(now, self.delay);
        self.off_deadline
            .arm(now, self.delay.saturating_add(self.duration));
        true
    }

    /// Phase at `now`. Priority order matters: an expired off deadline wins
    /// over an expired on deadline.
    #[must_use]
    pub const fn phase(&self, now: TickInstant) -> Phase {
        if self.off_deadline.expired(now) {
            Phase::Idle
        } else if self.on_deadline.expired(now) {
            Phase::Active
        } else {
            Phase::Delaying
        }
    }
}

/// One fixture output: a [`Monostable`] bound to the drive it swings.
///
/// `tick` writes to the hardware only when the computed value differs from
/// the last driven one, and reports exactly those transitions, which is
/// where transition logging hangs off.
pub struct OutputGenerator<D: OutputDrive> {
    id: OutputId,
    timer: Monostable,
    drive: D,
    current: D::Value,
}

/// Binary generator: dispenser, valve.
pub type PulseGenerator<O> = OutputGenerator<BinaryDrive<O>>;

/// Servo generator: igniter arm.
pub type ServoGenerator<O> = OutputGenerator<ServoDrive<O>>;

impl<D: OutputDrive> OutputGenerator<D> {
    /// Bind a schedule to a drive. No hardware write happens here; call
    /// [`Self::setup`] once the port is ready.
    #[must_use]
    pub fn new(id: OutputId, delay: Millis, duration: Millis, drive: D) -> Self {
        let current = drive.idle_value();
        Self {
            id,
            timer: Monostable::new(delay, duration),
            drive,
            current,
        }
    }

    /// Drive the configured idle value and pre-expire both deadlines.
    pub fn setup(&mut self) {
        self.timer.reset();
        self.current = self.drive.idle_value();
        self.drive.apply(self.current);
    }

    /// Forward to the timer's acceptance rule; `true` when a cycle started.
    pub fn trigger(&mut self, now: TickInstant) -> bool {
        self.timer.trigger(now)
    }

    /// Advance to `now`; returns the phase whose value was newly driven, or
    /// `None` when the output is unchanged (including all of Delaying).
    pub fn tick(&mut self, now: TickInstant) -> Option<Phase> {
        let computed = match self.timer.phase(now) {
            Phase::Idle => (Phase::Idle, self.drive.idle_value()),
            Phase::Active => (Phase::Active, self.drive.active_value()),
            Phase::Delaying => return None,
        };

        let (phase, value) = computed;
        if value == self.current {
            return None;
        }

        self.drive.apply(value);
        self.current = value;
        Some(phase)
    }

    #[must_use]
    pub fn phase(&self, now: TickInstant) -> Phase {
        self.timer.phase(now)
    }

    #[must_use]
    pub const fn id(&self) -> OutputId {
        self.id
    }

    /// Last value physically driven.
    pub fn current(&self) -> D::Value {
        self.current
    }
}
