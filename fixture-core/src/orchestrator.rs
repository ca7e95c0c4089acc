//! Poll-cycle coordination: debounce, trigger fan-out, ticking, watchdog.
//!
//! The orchestrator owns the whole control path. `poll` is the only entry
//! point after wiring, and it reads "now" exactly once per cycle (callers
//! pass the shared reading in), so every generator observes an identical
//! instant and triggered outputs can never skew against each other.

use core::fmt;

use heapless::Vec;

use crate::clock::TickInstant;
use crate::config::{InputId, OUTPUT_COUNT, OutputId};
use crate::debounce::Debouncer;
use crate::drive::{BinaryDrive, ServoDrive};
use crate::generator::{OutputGenerator, Phase};
use crate::io::{DigitalInput, DigitalOutput, Edge, Level, PwmOutput, Watchdog};
use crate::telemetry::{EventKind, EventLog};

/// Wiring failed: more generators than the static fan-out table holds.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FanoutError {
    CapacityExceeded,
}

impl fmt::Display for FanoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanoutError::CapacityExceeded => {
                write!(f, "output table full ({OUTPUT_COUNT} slots)")
            }
        }
    }
}

/// One generator slot: binary or servo, behind the same trigger/tick face.
pub enum EffectOutput<B: DigitalOutput, P: PwmOutput> {
    Pulse(OutputGenerator<BinaryDrive<B>>),
    Servo(OutputGenerator<ServoDrive<P>>),
}

impl<B: DigitalOutput, P: PwmOutput> EffectOutput<B, P> {
    #[must_use]
    pub fn id(&self) -> OutputId {
        match self {
            EffectOutput::Pulse(generator) => generator.id(),
            EffectOutput::Servo(generator) => generator.id(),
        }
    }

    #[must_use]
    pub fn phase(&self, now: TickInstant) -> Phase {
        match self {
            EffectOutput::Pulse(generator) => generator.phase(now),
            EffectOutput::Servo(generator) => generator.phase(now),
        }
    }

    fn setup(&mut self) {
        match self {
            EffectOutput::Pulse(generator) => generator.setup(),
            EffectOutput::Servo(generator) => generator.setup(),
        }
    }

    fn trigger(&mut self, now: TickInstant) -> bool {
        match self {
            EffectOutput::Pulse(generator) => generator.trigger(now),
            EffectOutput::Servo(generator) => generator.trigger(now),
        }
    }

    fn tick(&mut self, now: TickInstant) -> Option<Phase> {
        match self {
            EffectOutput::Pulse(generator) => generator.tick(now),
            EffectOutput::Servo(generator) => generator.tick(now),
        }
    }
}

/// Transition driven during a poll.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OutputTransition {
    pub output: OutputId,
    /// Phase whose value was newly driven: `Active` or `Idle`.
    pub phase: Phase,
}

/// What one poll cycle observed and drove.
#[derive(Debug, Default)]
pub struct PollReport {
    /// Edge committed by the debouncer this cycle, if any.
    pub edge: Option<Edge>,
    /// Outputs whose cycle started on this poll's fan-out.
    pub triggered: Vec<OutputId, OUTPUT_COUNT>,
    /// Output transitions driven this cycle, in fan-out order.
    pub transitions: Vec<OutputTransition, OUTPUT_COUNT>,
}

impl PollReport {
    /// Nothing happened this cycle.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.edge.is_none() && self.triggered.is_empty() && self.transitions.is_empty()
    }
}

/// Owns the fixture's input path, output generators, watchdog, and events.
pub struct Orchestrator<I, B: DigitalOutput, P: PwmOutput, W> {
    input_id: InputId,
    input: I,
    debouncer: Debouncer,
    outputs: Vec<EffectOutput<B, P>, OUTPUT_COUNT>,
    watchdog: W,
    events: EventLog,
    polls: u32,
}

impl<I, B, P, W> Orchestrator<I, B, P, W>
where
    I: DigitalInput,
    B: DigitalOutput,
    P: PwmOutput,
    W: Watchdog,
{
    /// Wire the input path; outputs attach afterwards, in fan-out order.
    #[must_use]
    pub fn new(input_id: InputId, input: I, debouncer: Debouncer, watchdog: W) -> Self {
        Self {
            input_id,
            input,
            debouncer,
            outputs: Vec::new(),
            watchdog,
            events: EventLog::new(),
            polls: 0,
        }
    }

    /// Append a generator. Broadcast order is attach order, fixed for the
    /// lifetime of the orchestrator.
    pub fn attach(&mut self, output: EffectOutput<B, P>) -> Result<(), FanoutError> {
        self.outputs
            .push(output)
            .map_err(|_| FanoutError::CapacityExceeded)
    }

    /// Drive every output to its idle value and reset its schedule. Run once
    /// before the first poll, and again after a watchdog reset.
    pub fn setup(&mut self) {
        for output in &mut self.outputs {
            output.setup();
        }
    }

    /// One non-blocking cycle: sample, debounce, fan out, tick, watchdog.
    pub fn poll(&mut self, now: TickInstant) -> PollReport {
        let mut report = PollReport::default();

        let raw = self.input.read_level();
        if let Some(edge) = self.debouncer.sample(raw, now) {
            self.events.record(
                now,
                EventKind::InputEdge {
                    input: self.input_id,
                    edge,
                },
            );
            report.edge = Some(edge);

            if edge == Edge::Rising {
                for output in &mut self.outputs {
                    let id = output.id();
                    if output.trigger(now) {
                        self.events
                            .record(now, EventKind::TriggerAccepted { output: id });
                        let _ = report.triggered.push(id);
                    } else {
                        self.events
                            .record(now, EventKind::TriggerDropped { output: id });
                    }
                }
            }
        }

        for output in &mut self.outputs {
            if let Some(phase) = output.tick(now) {
                let id = output.id();
                let kind = match phase {
                    Phase::Active => EventKind::OutputActivated { output: id },
                    Phase::Idle | Phase::Delaying => EventKind::OutputReleased { output: id },
                };
                self.events.record(now, kind);
                let _ = report.transitions.push(OutputTransition {
                    output: id,
                    phase,
                });
            }
        }

        self.watchdog.service();
        self.polls = self.polls.wrapping_add(1);
        report
    }

    /// Committed logical level of the trigger input.
    #[must_use]
    pub const fn input_level(&self) -> Level {
        self.debouncer.stable_level()
    }

    /// Phase of one output at `now`, if that output is attached.
    #[must_use]
    pub fn output_phase(&self, id: OutputId, now: TickInstant) -> Option<Phase> {
        self.outputs
            .iter()
            .find(|output| output.id() == id)
            .map(|output| output.phase(now))
    }

    /// Attached outputs in fan-out order.
    pub fn outputs(&self) -> impl Iterator<Item = &EffectOutput<B, P>> {
        self.outputs.iter()
    }

    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    /// Completed poll cycles since construction.
    #[must_use]
    pub const fn poll_count(&self) -> u32 {
        self.polls
    }
}
