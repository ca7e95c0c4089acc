//! Line-oriented operator console for exercising the fixture off-target.
//!
//! The grammar lives in [`grammar`] and is built from `winnow` combinators
//! directly over `&str`, so parsing stays `no_std`-clean and allocation-free.
//! The host emulator owns the I/O loop and rendering; this module only turns
//! lines into structured [`Command`] values.

pub mod grammar;

use core::fmt;

use crate::clock::Millis;

/// One parsed console command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command<'a> {
    /// Hold the pressure plate down.
    Press,
    /// Let the pressure plate back up.
    Release,
    /// Press, hold for the given span of simulated time, then release.
    Tap { hold: Millis },
    /// Advance the simulated clock, polling once per millisecond.
    Run { span: Millis },
    /// Snapshot of the input and every output.
    Status,
    /// Resolved configuration of every component.
    Dump,
    /// Recent telemetry events, limited to the newest `limit` when given.
    Log { limit: Option<usize> },
    /// Command summary, or detail for one topic.
    Help { topic: Option<&'a str> },
}

/// Rejected console line, pointing at the first byte the grammar could not
/// accept.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    offset: usize,
}

impl ParseError {
    pub(crate) const fn at(offset: usize) -> Self {
        Self { offset }
    }

    /// Byte offset of the rejection within the submitted line.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized input at column {}", self.offset + 1)
    }
}
