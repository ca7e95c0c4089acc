//! Debounced edge detection for the trigger input.

use crate::clock::{Millis, TickInstant};
use crate::config::InputConfig;
use crate::io::{Edge, Level, Polarity};

/// Hold-time debouncer with polarity normalization.
///
/// Raw samples are mapped onto the logical domain first (active = high), so
/// an active-low pressure plate emits [`Edge::Rising`] when physically
/// pressed. The stable level commits only after the logical reading has held
/// unchanged for the full debounce window; the comparison is inclusive, so a
/// signal held exactly at the threshold commits on that poll.
#[derive(Debug)]
pub struct Debouncer {
    polarity: Polarity,
    window: Millis,
    stable: Level,
    last_reading: Level,
    last_change: TickInstant,
}

impl Debouncer {
    /// Seed the detector from the first real hardware sample. No edge is
    /// emitted for the startup state.
    #[must_use]
    pub fn new(config: &InputConfig, first_raw: Level, now: TickInstant) -> Self {
        let logical = config.polarity.logical(first_raw);
        Self {
            polarity: config.polarity,
            window: config.debounce_window,
            stable: logical,
            last_reading: logical,
            last_change: now,
        }
    }

    /// Feed one raw sample; returns the edge committed on this poll, if any.
    pub fn sample(&mut self, raw: Level, now: TickInstant) -> Option<Edge> {
        let reading = self.polarity.logical(raw);
        if reading != self.last_reading {
            self.last_change = now;
            self.last_reading = reading;
        }

        if reading != self.stable && now.elapsed_since(self.last_change) >= self.window {
            self.stable = reading;
            return Some(if reading.is_high() {
                Edge::Rising
            } else {
                Edge::Falling
            });
        }

        None
    }

    /// Committed logical level (active = high).
    #[must_use]
    pub const fn stable_level(&self) -> Level {
        self.stable
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.stable.is_high()
    }
}
