//! Bounded in-memory record of fixture activity.
//!
//! Every edge, fan-out decision, and output transition lands here as an
//! [`EventRecord`]. The ring is sized for diagnostics, not archival: oldest
//! entries fall off first, and the monotone ids make the loss visible.

use core::fmt;

use heapless::{HistoryBuf, OldestOrdered};

use crate::clock::TickInstant;
use crate::config::{InputId, OutputId};
use crate::io::Edge;

/// Capacity of the event ring.
pub const EVENT_RING_CAPACITY: usize = 64;

/// Monotonically increasing event sequence number.
pub type EventId = u32;

/// Something the orchestrator observed or did.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EventKind {
    /// The debouncer committed a new stable level.
    InputEdge { input: InputId, edge: Edge },
    /// Fan-out reached this output and started a cycle.
    TriggerAccepted { output: OutputId },
    /// Fan-out reached this output mid-delay; the trigger was dropped.
    TriggerDropped { output: OutputId },
    /// The output began driving its active value.
    OutputActivated { output: OutputId },
    /// The output returned to its idle value.
    OutputReleased { output: OutputId },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::InputEdge { input, edge } => write!(f, "edge {edge} {input}"),
            EventKind::TriggerAccepted { output } => write!(f, "trigger-accepted {output}"),
            EventKind::TriggerDropped { output } => write!(f, "trigger-dropped {output}"),
            EventKind::OutputActivated { output } => write!(f, "output-active {output}"),
            EventKind::OutputReleased { output } => write!(f, "output-idle {output}"),
        }
    }
}

/// One ring entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EventRecord {
    pub id: EventId,
    pub at: TickInstant,
    pub kind: EventKind,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.id, self.at, self.kind)
    }
}

/// Fixed-capacity history of [`EventRecord`]s with monotone ids.
pub struct EventLog<const CAPACITY: usize = EVENT_RING_CAPACITY> {
    ring: HistoryBuf<EventRecord, CAPACITY>,
    next_id: EventId,
}

impl<const CAPACITY: usize> EventLog<CAPACITY> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_id: 0,
        }
    }

    /// Record `kind` at `at`; returns the assigned id.
    pub fn record(&mut self, at: TickInstant, kind: EventKind) -> EventId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.ring.write(EventRecord { id, at, kind });
        id
    }

    /// Entries in chronological order, oldest first.
    pub fn oldest_first(&self) -> OldestOrdered<'_, EventRecord> {
        self.ring.oldest_ordered()
    }

    /// The most recent entry, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&EventRecord> {
        self.ring.recent()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Total events ever recorded, including ones the ring has dropped.
    #[must_use]
    pub const fn recorded(&self) -> u32 {
        self.next_id
    }
}

impl<const CAPACITY: usize> Default for EventLog<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAPACITY: usize> fmt::Debug for EventLog<CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ticks: u32) -> TickInstant {
        TickInstant::from_ticks(ticks)
    }

    #[test]
    fn assigns_sequential_ids() {
        let mut log: EventLog = EventLog::new();
        assert!(log.is_empty());

        let first = log.record(
            at(5),
            EventKind::InputEdge {
                input: InputId::Pressure,
                edge: Edge::Rising,
            },
        );
        let second = log.record(
            at(5),
            EventKind::TriggerAccepted {
                output: OutputId::Valve,
            },
        );

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.latest().unwrap().id, 1);
    }

    #[test]
    fn iterates_oldest_to_newest() {
        let mut log: EventLog = EventLog::new();
        for t in 0..5u32 {
            log.record(
                at(t),
                EventKind::OutputActivated {
                    output: OutputId::Igniter,
                },
            );
        }

        let ids: heapless::Vec<EventId, 8> = log.oldest_first().map(|record| record.id).collect();
        assert_eq!(ids.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn overwrites_oldest_when_full_but_keeps_counting() {
        let mut log: EventLog<4> = EventLog::new();
        for t in 0..6u32 {
            log.record(
                at(t),
                EventKind::TriggerDropped {
                    output: OutputId::Dispenser,
                },
            );
        }

        assert_eq!(log.len(), 4);
        assert_eq!(log.recorded(), 6);
        let oldest = log.oldest_first().next().unwrap();
        // Ids 0 and 1 fell off the ring.
        assert_eq!(oldest.id, 2);
        assert_eq!(log.latest().unwrap().id, 5);
    }
}
