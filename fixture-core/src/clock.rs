//! Millisecond time base shared by every timing component.
//!
//! The fixture's clock is a free-running u32 millisecond counter that wraps
//! at `u32::MAX`. Nothing in this crate reads the clock itself; callers pass
//! one [`TickInstant`] into each poll so every component observes the same
//! reading for a cycle.

use core::fmt;

/// Span of milliseconds used for delays, durations, and debounce windows.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Millis(u32);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    #[must_use]
    pub const fn new(millis: u32) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn saturating_add(self, other: Millis) -> Millis {
        Millis(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// One reading of the wrapping millisecond counter.
///
/// Deliberately not `Ord`: a wrapping counter has no total order. Compare
/// instants only through [`TickInstant::elapsed_since`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TickInstant(u32);

impl TickInstant {
    #[must_use]
    pub const fn from_ticks(ticks: u32) -> Self {
        Self(ticks)
    }

    #[must_use]
    pub const fn ticks(self) -> u32 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, modulo the counter width.
    ///
    /// Wrapping subtraction keeps the result correct when the counter rolls
    /// over between the two readings.
    #[must_use]
    pub const fn elapsed_since(self, earlier: TickInstant) -> Millis {
        Millis(self.0.wrapping_sub(earlier.0))
    }

    #[must_use]
    pub const fn wrapping_add(self, span: Millis) -> TickInstant {
        Self(self.0.wrapping_add(span.as_u32()))
    }
}

impl fmt::Display for TickInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}
