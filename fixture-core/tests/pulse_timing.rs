//! Two-phase timer behavior under dense millisecond polling, the way the
//! firmware actually drives it.

use std::cell::Cell;

use fixture_core::clock::{Millis, TickInstant};
use fixture_core::config::OutputId;
use fixture_core::drive::{BinaryDrive, Degrees, OutputDrive, ServoDrive, angle_to_duty};
use fixture_core::generator::{OutputGenerator, Phase};
use fixture_core::io::{DigitalOutput, Level, Polarity, PwmOutput};

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

fn at(ticks: u32) -> TickInstant {
    TickInstant::from_ticks(ticks)
}

fn pulse(pin: &Cell<Level>, delay: u32, duration: u32) -> OutputGenerator<BinaryDrive<Pin<'_>>> {
    let mut generator = OutputGenerator::new(
        OutputId::Valve,
        Millis::new(delay),
        Millis::new(duration),
        BinaryDrive::new(Pin(pin), Polarity::ActiveHigh),
    );
    generator.setup();
    generator
}

fn servo(duty: &Cell<u8>, delay: u32, duration: u32) -> OutputGenerator<ServoDrive<Duty<'_>>> {
    let mut generator = OutputGenerator::new(
        OutputId::Igniter,
        Millis::new(delay),
        Millis::new(duration),
        ServoDrive::new(Duty(duty), Degrees::new(135), Degrees::new(0)),
    );
    generator.setup();
    generator
}

/// Tick once per millisecond for `span` milliseconds past `base`, returning
/// every reported transition as `(offset, phase)`.
fn transition_offsets<D: OutputDrive>(
    generator: &mut OutputGenerator<D>,
    base: TickInstant,
    span: u32,
) -> Vec<(u32, Phase)> {
    (0..=span)
        .filter_map(|offset| {
            generator
                .tick(base.wrapping_add(Millis::new(offset)))
                .map(|phase| (offset, phase))
        })
        .collect()
}

#[test]
fn delayed_pulse_fires_after_delay_and_clears_after_duration() {
    let pin = Cell::new(Level::High);
    let mut generator = pulse(&pin, 200, 500);
    assert_eq!(pin.get(), Level::Low, "setup drives the inactive level");

    assert!(generator.trigger(at(0)));
    assert_eq!(generator.phase(at(0)), Phase::Delaying);

    let transitions = transition_offsets(&mut generator, at(0), 800);
    assert_eq!(transitions, vec![(200, Phase::Active), (700, Phase::Idle)]);
    assert_eq!(pin.get(), Level::Low);
}

#[test]
fn dropped_retrigger_keeps_the_original_boundaries() {
    let pin = Cell::new(Level::Low);
    let mut generator = pulse(&pin, 200, 500);
    assert!(generator.trigger(at(0)));

    let mut transitions = Vec::new();
    for offset in 0..=800u32 {
        if offset == 100 {
            assert!(!generator.trigger(at(100)), "mid-delay trigger must drop");
        }
        if let Some(phase) = generator.tick(at(offset)) {
            transitions.push((offset, phase));
        }
    }

    assert_eq!(transitions, vec![(200, Phase::Active), (700, Phase::Idle)]);
}

#[test]
fn accepted_restart_holds_the_level_and_extends_the_window() {
    let pin = Cell::new(Level::Low);
    let mut generator = pulse(&pin, 200, 500);
    assert!(generator.trigger(at(0)));

    let mut transitions = Vec::new();
    for offset in 0..=1_200u32 {
        if offset == 300 {
            assert!(generator.trigger(at(300)), "mid-active trigger restarts");
        }
        if let Some(phase) = generator.tick(at(offset)) {
            transitions.push((offset, phase));
        }
        if offset == 400 {
            // Inside the restarted delay the pin must stay where it was.
            assert_eq!(pin.get(), Level::High);
        }
    }

    // One continuous high window from the first activation to the restarted
    // schedule's off deadline; re-entering Active is not a transition.
    assert_eq!(transitions, vec![(200, Phase::Active), (1_000, Phase::Idle)]);
}

#[test]
fn servo_holds_off_angle_through_delay_then_sweeps() {
    let duty = Cell::new(0u8);
    let mut generator = servo(&duty, 50, 1_000);
    assert_eq!(duty.get(), angle_to_duty(Degrees::new(0)));

    assert!(generator.trigger(at(0)));

    let mut transitions = Vec::new();
    for offset in 0..=1_200u32 {
        if let Some(phase) = generator.tick(at(offset)) {
            transitions.push((offset, phase));
        }
        match offset {
            40 => assert_eq!(duty.get(), 0, "sweep must wait out the delay"),
            500 => assert_eq!(duty.get(), angle_to_duty(Degrees::new(135))),
            _ => {}
        }
    }

    assert_eq!(transitions, vec![(50, Phase::Active), (1_050, Phase::Idle)]);
    assert_eq!(generator.current(), Degrees::new(0));
}

#[test]
fn independent_generators_run_their_own_windows_from_one_instant() {
    let valve_pin = Cell::new(Level::Low);
    let duty = Cell::new(0u8);
    let mut valve = pulse(&valve_pin, 50, 700);
    let mut igniter = servo(&duty, 50, 1_000);

    assert!(valve.trigger(at(0)));
    assert!(igniter.trigger(at(0)));

    let valve_transitions = transition_offsets(&mut valve, at(0), 1_200);
    let igniter_transitions = transition_offsets(&mut igniter, at(0), 1_200);

    assert_eq!(
        valve_transitions,
        vec![(50, Phase::Active), (750, Phase::Idle)]
    );
    assert_eq!(
        igniter_transitions,
        vec![(50, Phase::Active), (1_050, Phase::Idle)]
    );
}

#[test]
fn cycle_runs_correctly_across_counter_rollover() {
    let pin = Cell::new(Level::Low);
    let mut generator = pulse(&pin, 200, 500);

    let base = TickInstant::from_ticks(u32::MAX - 100);
    assert!(generator.trigger(base));

    let transitions = transition_offsets(&mut generator, base, 800);
    assert_eq!(transitions, vec![(200, Phase::Active), (700, Phase::Idle)]);
}
