//! Static per-device wiring and timing tables.
//!
//! Built once at startup and passed by reference into construction; nothing
//! here mutates at runtime and there is no ambient global configuration.

use core::fmt;

use crate::clock::Millis;
use crate::drive::Degrees;
use crate::io::Polarity;

/// Identifies one of the fixture's driven outputs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputId {
    /// Fuel dispenser pump.
    Dispenser,
    /// Gas solenoid valve.
    Valve,
    /// Servo-swept igniter arm.
    Igniter,
}

/// Number of outputs the fixture drives; also the fan-out table capacity.
pub const OUTPUT_COUNT: usize = 3;

impl OutputId {
    /// Stable index used for status masks and catalog lookups.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            OutputId::Dispenser => 0,
            OutputId::Valve => 1,
            OutputId::Igniter => 2,
        }
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(OutputId::Dispenser),
            1 => Some(OutputId::Valve),
            2 => Some(OutputId::Igniter),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            OutputId::Dispenser => "dispenser",
            OutputId::Valve => "valve",
            OutputId::Igniter => "igniter",
        }
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies a trigger input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputId {
    /// Pressure plate the audience stands on.
    Pressure,
}

impl InputId {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            InputId::Pressure => "pressure",
        }
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Input pull configuration applied by the pin driver.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PullMode {
    Up,
    Down,
    None,
}

impl fmt::Display for PullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullMode::Up => f.write_str("up"),
            PullMode::Down => f.write_str("down"),
            PullMode::None => f.write_str("none"),
        }
    }
}

/// How a timer's active phase reaches the pin.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    /// Binary level with the given wiring sense.
    Switched(Polarity),
    /// Servo sweep from the off angle to the on angle.
    Sweep {
        on_angle: Degrees,
        off_angle: Degrees,
    },
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Switched(polarity) => write!(f, "switched/{polarity}"),
            OutputMode::Sweep {
                on_angle,
                off_angle,
            } => write!(f, "sweep/{off_angle}-{on_angle}"),
        }
    }
}

/// One row of the output table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OutputConfig {
    pub id: OutputId,
    /// Pin/PWM channel number on the board, resolved by the hardware layer.
    pub channel: u8,
    pub delay: Millis,
    pub duration: Millis,
    pub mode: OutputMode,
}

impl fmt::Display for OutputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[output {}] channel={} delay={} duration={} mode={}",
            self.id, self.channel, self.delay, self.duration, self.mode
        )
    }
}

/// One row of the input table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InputConfig {
    pub id: InputId,
    pub channel: u8,
    pub debounce_window: Millis,
    pub pull: PullMode,
    pub polarity: Polarity,
}

impl fmt::Display for InputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[input {}] channel={} debounce={} pull={} polarity={}",
            self.id, self.channel, self.debounce_window, self.pull, self.polarity
        )
    }
}

/// The whole device table: one trigger input, every driven output in fan-out
/// order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FixtureConfig {
    pub input: InputConfig,
    pub outputs: [OutputConfig; OUTPUT_COUNT],
}

impl FixtureConfig {
    /// Row for `id`, if the table carries it.
    #[must_use]
    pub fn output(&self, id: OutputId) -> Option<&OutputConfig> {
        self.outputs.iter().find(|row| row.id == id)
    }
}

/// Shipped fixture wiring: a pressure plate fanning out to the dispenser,
/// the gas valve, and the igniter arm.
pub const FIXTURE_CONFIG: FixtureConfig = FixtureConfig {
    input: InputConfig {
        id: InputId::Pressure,
        channel: 2,
        debounce_window: Millis::new(50),
        pull: PullMode::Up,
        polarity: Polarity::ActiveLow,
    },
    outputs: [
        OutputConfig {
            id: OutputId::Dispenser,
            channel: 5,
            delay: Millis::new(1_000),
            duration: Millis::new(1_000),
            mode: OutputMode::Switched(Polarity::ActiveHigh),
        },
        OutputConfig {
            id: OutputId::Valve,
            channel: 4,
            delay: Millis::new(50),
            duration: Millis::new(700),
            mode: OutputMode::Switched(Polarity::ActiveHigh),
        },
        OutputConfig {
            id: OutputId::Igniter,
            channel: 3,
            delay: Millis::new(50),
            duration: Millis::new(1_000),
            mode: OutputMode::Sweep {
                on_angle: Degrees::new(135),
                off_angle: Degrees::new(0),
            },
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_round_trip() {
        for index in 0..OUTPUT_COUNT {
            let id = OutputId::from_index(index).unwrap();
            assert_eq!(id.as_index(), index);
        }
        assert_eq!(OutputId::from_index(OUTPUT_COUNT), None);
    }

    #[test]
    fn catalog_rows_match_their_indices() {
        for (index, row) in FIXTURE_CONFIG.outputs.iter().enumerate() {
            assert_eq!(row.id.as_index(), index);
        }
    }

    #[test]
    fn lookup_finds_every_configured_output() {
        for id in [OutputId::Dispenser, OutputId::Valve, OutputId::Igniter] {
            let row = FIXTURE_CONFIG.output(id).unwrap();
            assert_eq!(row.id, id);
        }
    }

    #[test]
    fn dump_lines_render_every_field() {
        fn rendered(value: &dyn fmt::Display) -> heapless::String<96> {
            let mut out = heapless::String::new();
            core::fmt::write(&mut out, format_args!("{value}")).unwrap();
            out
        }

        assert_eq!(
            rendered(&FIXTURE_CONFIG.input).as_str(),
            "[input pressure] channel=2 debounce=50ms pull=up polarity=active-low"
        );
        assert_eq!(
            rendered(&FIXTURE_CONFIG.outputs[0]).as_str(),
            "[output dispenser] channel=5 delay=1000ms duration=1000ms mode=switched/active-high"
        );
        assert_eq!(
            rendered(&FIXTURE_CONFIG.outputs[2]).as_str(),
            "[output igniter] channel=3 delay=50ms duration=1000ms mode=sweep/0deg-135deg"
        );
    }

    #[test]
    fn shipped_timings_stagger_the_effects() {
        let valve = FIXTURE_CONFIG.output(OutputId::Valve).unwrap();
        let igniter = FIXTURE_CONFIG.output(OutputId::Igniter).unwrap();
        let dispenser = FIXTURE_CONFIG.output(OutputId::Dispenser).unwrap();

        // Gas and ignition lead; fuel joins once the flame is established.
        assert_eq!(valve.delay, igniter.delay);
        assert!(dispenser.delay > valve.delay);

        // The valve closes before the igniter finishes its sweep window.
        let valve_off = valve.delay.saturating_add(valve.duration);
        let igniter_off = igniter.delay.saturating_add(igniter.duration);
        assert!(valve_off < igniter_off);
    }
}
