//! Countdown primitive marking the phase boundaries of a timer cycle.

use crate::clock::{Millis, TickInstant};

/// A start instant plus a span, queried as expired/not-expired against "now".
///
/// Expiry compares through [`TickInstant::elapsed_since`], so a counter
/// rollover between arming and querying never yields a false "not expired"
/// reading.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Deadline {
    start: TickInstant,
    span: Millis,
}

impl Deadline {
    /// A deadline that reports expired for every instant.
    ///
    /// Generators pre-arm both of their deadlines with this at setup so the
    /// first phase query reads Idle.
    #[must_use]
    pub const fn ready() -> Self {
        Self {
            start: TickInstant::from_ticks(0),
            span: Millis::ZERO,
        }
    }

    /// Restart the countdown: `span` milliseconds from `now`.
    pub fn arm(&mut self, now: TickInstant, span: Millis) {
        self.start = now;
        self.span = span;
    }

    /// Whether the span has fully elapsed at `now`. Inclusive: a deadline is
    /// expired on the exact tick its span runs out.
    #[must_use]
    pub const fn expired(&self, now: TickInstant) -> bool {
        now.elapsed_since(self.start).as_u32() >= self.span.as_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_is_expired_everywhere() {
        let deadline = Deadline::ready();
        assert!(deadline.expired(TickInstant::from_ticks(0)));
        assert!(deadline.expired(TickInstant::from_ticks(123_456)));
        assert!(deadline.expired(TickInstant::from_ticks(u32::MAX)));
    }

    #[test]
    fn expires_on_the_exact_boundary_tick() {
        let mut deadline = Deadline::ready();
        deadline.arm(TickInstant::from_ticks(100), Millis::new(200));

        assert!(!deadline.expired(TickInstant::from_ticks(100)));
        assert!(!deadline.expired(TickInstant::from_ticks(299)));
        assert!(deadline.expired(TickInstant::from_ticks(300)));
        assert!(deadline.expired(TickInstant::from_ticks(301)));
    }

    #[test]
    fn survives_counter_rollover() {
        let start = TickInstant::from_ticks(u32::MAX - 49);
        let mut deadline = Deadline::ready();
        deadline.arm(start, Millis::new(100));

        // Still counting down across the wrap point.
        assert!(!deadline.expired(TickInstant::from_ticks(u32::MAX)));
        assert!(!deadline.expired(start.wrapping_add(Millis::new(99))));
        assert!(deadline.expired(start.wrapping_add(Millis::new(100))));
    }

    #[test]
    fn rearming_discards_previous_schedule() {
        let mut deadline = Deadline::ready();
        deadline.arm(TickInstant::from_ticks(0), Millis::new(50));
        assert!(deadline.expired(TickInstant::from_ticks(75)));

        deadline.arm(TickInstant::from_ticks(75), Millis::new(50));
        assert!(!deadline.expired(TickInstant::from_ticks(100)));
        assert!(deadline.expired(TickInstant::from_ticks(125)));
    }
}
