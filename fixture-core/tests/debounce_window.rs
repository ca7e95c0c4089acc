//! Edge-detector behavior against realistic plate noise, both standalone and
//! through the full poll path.

use std::cell::Cell;

use fixture_core::clock::{Millis, TickInstant};
use fixture_core::config::{FIXTURE_CONFIG, InputConfig, OutputId};
use fixture_core::debounce::Debouncer;
use fixture_core::drive::{BinaryDrive, Degrees, ServoDrive};
use fixture_core::generator::{OutputGenerator, Phase};
use fixture_core::io::{
    DigitalInput, DigitalOutput, Edge, Level, Polarity, PwmOutput, Watchdog,
};
use fixture_core::orchestrator::{EffectOutput, Orchestrator};

struct Plate<'a>(&'a Cell<Level>);

impl DigitalInput for Plate<'_> {
    fn read_level(&mut self) -> Level {
        self.0.get()
    }
}

struct Pin<'a>(&'a Cell<Level>);

impl DigitalOutput for Pin<'_> {
    fn set_level(&mut self, level: Level) {
        self.0.set(level);
    }
}

struct Duty<'a>(&'a Cell<u8>);

impl PwmOutput for Duty<'_> {
    fn set_duty(&mut self, duty: u8) {
        self.0.set(duty);
    }
}

struct CountingWatchdog<'a>(&'a Cell<u32>);

impl Watchdog for CountingWatchdog<'_> {
    fn service(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

fn at(ticks: u32) -> TickInstant {
    TickInstant::from_ticks(ticks)
}

fn plate_config() -> InputConfig {
    // Shipped plate wiring: 50ms window, pull-up, active-low.
    FIXTURE_CONFIG.input
}

#[test]
fn spaced_sampling_commits_on_the_first_poll_past_the_window() {
    // Plate goes down at t=10 but the loop only looks every 20ms. The change
    // is first seen at t=20, so the 50ms window runs out at the t=80 sample,
    // and 60ms after the observed change is past the inclusive threshold.
    let mut debouncer = Debouncer::new(&plate_config(), Level::High, at(0));

    let mut edges = Vec::new();
    for t in [20u32, 40, 60, 80, 100, 120] {
        if let Some(edge) = debouncer.sample(Level::Low, at(t)) {
            edges.push((t, edge));
        }
    }

    assert_eq!(edges, vec![(80, Edge::Rising)]);
    assert!(debouncer.is_active());
}

#[test]
fn dense_sampling_commits_exactly_at_the_window() {
    let mut debouncer = Debouncer::new(&plate_config(), Level::High, at(0));

    let mut edges = Vec::new();
    for t in 0..=200u32 {
        let raw = if t >= 10 { Level::Low } else { Level::High };
        if let Some(edge) = debouncer.sample(raw, at(t)) {
            edges.push((t, edge));
        }
    }

    // Change lands at t=10; inclusive 50ms window commits at t=60, once.
    assert_eq!(edges, vec![(60, Edge::Rising)]);
}

#[test]
fn chatter_inside_the_window_never_commits() {
    let mut debouncer = Debouncer::new(&plate_config(), Level::High, at(0));

    // Raw level flips every 20ms; no stretch ever reaches 50ms.
    let mut level = Level::Low;
    for t in (0..200u32).step_by(20) {
        assert_eq!(debouncer.sample(level, at(t)), None, "chatter at t={t}");
        level = level.toggled();
    }
    assert!(!debouncer.is_active());

    // Once the plate settles the window runs from the last flip.
    assert_eq!(debouncer.sample(Level::Low, at(200)), None);
    assert_eq!(debouncer.sample(Level::Low, at(250)), Some(Edge::Rising));
}

#[test]
fn press_and_release_yield_one_edge_each() {
    let mut debouncer = Debouncer::new(&plate_config(), Level::High, at(0));

    let mut edges = Vec::new();
    for t in 0..=500u32 {
        // Held from t=5 through t=300, released after.
        let raw = if (5..=300).contains(&t) {
            Level::Low
        } else {
            Level::High
        };
        if let Some(edge) = debouncer.sample(raw, at(t)) {
            edges.push((t, edge));
        }
    }

    assert_eq!(edges, vec![(55, Edge::Rising), (351, Edge::Falling)]);
}

#[test]
fn short_press_through_the_poll_path_triggers_nothing() {
    let plate = Cell::new(Level::High);
    let valve_pin = Cell::new(Level::Low);
    let duty = Cell::new(0u8);
    let services = Cell::new(0u32);

    let config = plate_config();
    let debouncer = Debouncer::new(&config, plate.get(), at(0));
    let mut orchestrator = Orchestrator::new(
        config.id,
        Plate(&plate),
        debouncer,
        CountingWatchdog(&services),
    );

    let valve = OutputGenerator::new(
        OutputId::Valve,
        Millis::new(50),
        Millis::new(700),
        BinaryDrive::new(Pin(&valve_pin), Polarity::ActiveHigh),
    );
    let igniter = OutputGenerator::new(
        OutputId::Igniter,
        Millis::new(50),
        Millis::new(1_000),
        ServoDrive::new(Duty(&duty), Degrees::new(135), Degrees::new(0)),
    );
    orchestrator.attach(EffectOutput::Pulse(valve)).unwrap();
    orchestrator.attach(EffectOutput::Servo(igniter)).unwrap();
    orchestrator.setup();

    // A 30ms stab at the plate: shorter than the 50ms window.
    for t in 0..=300u32 {
        plate.set(if (10..40).contains(&t) {
            Level::Low
        } else {
            Level::High
        });
        let report = orchestrator.poll(at(t));
        assert!(report.is_quiet(), "nothing may fire at t={t}");
    }

    assert!(orchestrator.events().is_empty());
    assert_eq!(valve_pin.get(), Level::Low);
    assert_eq!(duty.get(), 0);
    assert_eq!(
        orchestrator.output_phase(OutputId::Valve, at(300)),
        Some(Phase::Idle)
    );
    // Liveness servicing is unconditional, quiet cycles included.
    assert_eq!(services.get(), 301);
}
