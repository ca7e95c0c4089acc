use std::cell::Cell;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use fixture_core::clock::{Millis, TickInstant};
use fixture_core::config::{FIXTURE_CONFIG, FixtureConfig, OutputId, OutputMode};
use fixture_core::console::{Command, grammar};
use fixture_core::debounce::Debouncer;
use fixture_core::drive::{BinaryDrive, ServoDrive};
use fixture_core::generator::OutputGenerator;
use fixture_core::io::{DigitalInput, DigitalOutput, Level, PwmOutput, Watchdog};
use fixture_core::orchestrator::{EffectOutput, Orchestrator};

const WATCHDOG_TIMEOUT: Millis = Millis::new(250);

pub const HELP_TOPICS: &[(&str, &str)] = &[
    (
        "press",
        "press           - hold the pressure plate down",
    ),
    (
        "release",
        "release         - let the pressure plate spring back up",
    ),
    (
        "tap",
        "tap <duration>  - press, hold for the duration, then release",
    ),
    (
        "run",
        "run <duration>  - advance the simulated clock, polling once per millisecond",
    ),
    (
        "status",
        "status          - show the plate level, output phases, and watchdog health",
    ),
    (
        "dump",
        "dump            - print the resolved fixture configuration",
    ),
    (
        "log",
        "log [n]         - print recorded events, newest n when a count is given",
    ),
    (
        "help",
        "help [topic]    - show help for a command",
    ),
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TranscriptProfile {
    Interactive,
    SinglePress,
    Retrigger,
}

impl TranscriptProfile {
    pub fn log_path(self) -> &'static str {
        match self {
            TranscriptProfile::Interactive => "transcripts/emulator-session.log",
            TranscriptProfile::SinglePress => "transcripts/emulator-single-press.log",
            TranscriptProfile::Retrigger => "transcripts/emulator-retrigger.log",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            TranscriptProfile::Interactive => "Flame fixture emulator interactive transcript",
            TranscriptProfile::SinglePress => "Flame fixture emulator single press transcript",
            TranscriptProfile::Retrigger => "Flame fixture emulator retrigger transcript",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, String> {
        if tag.eq_ignore_ascii_case("interactive") {
            Ok(Self::Interactive)
        } else if tag.eq_ignore_ascii_case("single-press") {
            Ok(Self::SinglePress)
        } else if tag.eq_ignore_ascii_case("retrigger") {
            Ok(Self::Retrigger)
        } else {
            Err(format!("Unknown transcript profile `{tag}`"))
        }
    }
}

struct WatchdogStats {
    services: Cell<u32>,
    last_service: Cell<Option<u32>>,
    longest_gap: Cell<u32>,
    starved: Cell<bool>,
}

impl WatchdogStats {
    fn new() -> Self {
        Self {
            services: Cell::new(0),
            last_service: Cell::new(None),
            longest_gap: Cell::new(0),
            starved: Cell::new(false),
        }
    }
}

/// Pins and counters shared between the orchestrator's port adapters and the
/// session's render path.
struct FixtureState {
    clock: Cell<u32>,
    plate: Cell<Level>,
    dispenser: Cell<Level>,
    valve: Cell<Level>,
    igniter: Cell<Level>,
    servo_duty: Cell<u8>,
    watchdog: WatchdogStats,
}

impl FixtureState {
    fn new(config: &FixtureConfig) -> Self {
        Self {
            clock: Cell::new(0),
            plate: Cell::new(config.input.polarity.inactive_level()),
            dispenser: Cell::new(Level::Low),
            valve: Cell::new(Level::Low),
            igniter: Cell::new(Level::Low),
            servo_duty: Cell::new(0),
            watchdog: WatchdogStats::new(),
        }
    }

    fn pin(&self, id: OutputId) -> &Cell<Level> {
        match id {
            OutputId::Dispenser => &self.dispenser,
            OutputId::Valve => &self.valve,
            OutputId::Igniter => &self.igniter,
        }
    }

    fn now(&self) -> TickInstant {
        TickInstant::from_ticks(self.clock.get())
    }
}

struct PlatePort(Rc<FixtureState>);

impl DigitalInput for PlatePort {
    fn read_level(&mut self) -> Level {
        self.0.plate.get()
    }
}

struct SwitchPort {
    state: Rc<FixtureState>,
    output: OutputId,
}

impl DigitalOutput for SwitchPort {
    fn set_level(&mut self, level: Level) {
        self.state.pin(self.output).set(level);
    }
}

struct ServoPort(Rc<FixtureState>);

impl PwmOutput for ServoPort {
    fn set_duty(&mut self, duty: u8) {
        self.0.servo_duty.set(duty);
    }
}

struct SimWatchdog {
    state: Rc<FixtureState>,
    timeout: Millis,
}

impl Watchdog for SimWatchdog {
    fn service(&mut self) {
        let stats = &self.state.watchdog;
        let now = self.state.clock.get();
        if let Some(last) = stats.last_service.get() {
            let gap = now.wrapping_sub(last);
            if gap > stats.longest_gap.get() {
                stats.longest_gap.set(gap);
            }
            if gap > self.timeout.as_u32() {
                stats.starved.set(true);
            }
        }
        stats.last_service.set(Some(now));
        stats.services.set(stats.services.get().wrapping_add(1));
    }
}

pub struct Session {
    orchestrator: Orchestrator<PlatePort, SwitchPort, ServoPort, SimWatchdog>,
    state: Rc<FixtureState>,
    config: FixtureConfig,
    transcript: TranscriptLogger,
    // Event ids below this mark have already been printed.
    rendered_events: u32,
}

impl Session {
    pub fn new(profile: TranscriptProfile) -> io::Result<Self> {
        Self::with_log_path(profile, Path::new(profile.log_path()))
    }

    pub fn with_log_path(profile: TranscriptProfile, path: &Path) -> io::Result<Self> {
        let transcript = TranscriptLogger::new(profile, path)?;
        let config = FIXTURE_CONFIG;
        let state = Rc::new(FixtureState::new(&config));
        let mut orchestrator = build_orchestrator(&config, &state);
        orchestrator.setup();

        Ok(Self {
            orchestrator,
            state,
            config,
            transcript,
            rendered_events: 0,
        })
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        self.transcript
            .append_line(self.state.clock.get(), TranscriptRole::Host, trimmed)?;

        let lines = match grammar::parse(trimmed) {
            Ok(command) => self.execute(command),
            Err(err) => vec![format!("ERR syntax {err}")],
        };

        self.record_output(self.state.clock.get(), &lines)?;
        Ok(lines)
    }

    fn execute(&mut self, command: Command<'_>) -> Vec<String> {
        match command {
            Command::Press => self.cmd_press(),
            Command::Release => self.cmd_release(),
            Command::Tap { hold } => self.cmd_tap(hold),
            Command::Run { span } => self.cmd_run(span),
            Command::Status => self.cmd_status(),
            Command::Dump => self.cmd_dump(),
            Command::Log { limit } => self.cmd_log(limit),
            Command::Help { topic } => handle_help(topic),
        }
    }

    fn cmd_press(&mut self) -> Vec<String> {
        let raw = self.config.input.polarity.active_level();
        self.state.plate.set(raw);
        vec![format!("OK press raw={raw}")]
    }

    fn cmd_release(&mut self) -> Vec<String> {
        let raw = self.config.input.polarity.inactive_level();
        self.state.plate.set(raw);
        vec![format!("OK release raw={raw}")]
    }

    fn cmd_tap(&mut self, hold: Millis) -> Vec<String> {
        self.state.plate.set(self.config.input.polarity.active_level());
        let mut lines = self.advance(hold);
        self.state
            .plate
            .set(self.config.input.polarity.inactive_level());
        lines.push(format!("OK tap hold={hold} t={}", self.state.clock.get()));
        lines
    }

    fn cmd_run(&mut self, span: Millis) -> Vec<String> {
        let mut lines = self.advance(span);
        lines.push(format!("OK run span={span} t={}", self.state.clock.get()));
        lines
    }

    fn cmd_status(&mut self) -> Vec<String> {
        let now = self.state.now();
        let mut lines = Vec::new();
        lines.push(format!(
            "{now} polls={} events={}",
            self.orchestrator.poll_count(),
            self.orchestrator.events().recorded()
        ));
        lines.push(format!(
            "input {}: raw={} debounced={}",
            self.config.input.id,
            self.state.plate.get(),
            if self.orchestrator.input_level().is_high() {
                "pressed"
            } else {
                "released"
            },
        ));
        for output in self.orchestrator.outputs() {
            lines.push(format!("output {}: phase={}", output.id(), output.phase(now)));
        }
        let stats = &self.state.watchdog;
        lines.push(format!(
            "watchdog: services={} longest-gap={}ms starved={}",
            stats.services.get(),
            stats.longest_gap.get(),
            if stats.starved.get() { "yes" } else { "no" },
        ));
        lines
    }

    fn cmd_dump(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.push(self.config.input.to_string());
        for output in &self.config.outputs {
            lines.push(output.to_string());
        }
        lines
    }

    fn cmd_log(&self, limit: Option<usize>) -> Vec<String> {
        let events = self.orchestrator.events();
        if events.is_empty() {
            return vec!["no events recorded".to_string()];
        }

        let keep = limit.unwrap_or(events.len()).min(events.len());
        let skip = events.len() - keep;
        events
            .oldest_first()
            .skip(skip)
            .map(ToString::to_string)
            .collect()
    }

    fn advance(&mut self, span: Millis) -> Vec<String> {
        let mut lines = Vec::new();
        for _ in 0..span.as_u32() {
            let next = self.state.clock.get().wrapping_add(1);
            self.state.clock.set(next);
            self.orchestrator.poll(TickInstant::from_ticks(next));
            self.drain_events(&mut lines);
        }
        lines
    }

    fn drain_events(&mut self, lines: &mut Vec<String>) {
        let events = self.orchestrator.events();
        for record in events.oldest_first() {
            if record.id >= self.rendered_events {
                lines.push(record.to_string());
            }
        }
        self.rendered_events = events.recorded();
    }

    fn record_output(&mut self, at: u32, lines: &[String]) -> io::Result<()> {
        for line in lines {
            self.transcript
                .append_line(at, TranscriptRole::Emulator, line)?;
        }
        Ok(())
    }
}

fn build_orchestrator(
    config: &FixtureConfig,
    state: &Rc<FixtureState>,
) -> Orchestrator<PlatePort, SwitchPort, ServoPort, SimWatchdog> {
    let debouncer = Debouncer::new(&config.input, state.plate.get(), state.now());
    let watchdog = SimWatchdog {
        state: Rc::clone(state),
        timeout: WATCHDOG_TIMEOUT,
    };
    let mut orchestrator = Orchestrator::new(
        config.input.id,
        PlatePort(Rc::clone(state)),
        debouncer,
        watchdog,
    );

    for output in &config.outputs {
        let effect = match output.mode {
            OutputMode::Switched(polarity) => EffectOutput::Pulse(OutputGenerator::new(
                output.id,
                output.delay,
                output.duration,
                BinaryDrive::new(
                    SwitchPort {
                        state: Rc::clone(state),
                        output: output.id,
                    },
                    polarity,
                ),
            )),
            OutputMode::Sweep {
                on_angle,
                off_angle,
            } => EffectOutput::Servo(OutputGenerator::new(
                output.id,
                output.delay,
                output.duration,
                ServoDrive::new(ServoPort(Rc::clone(state)), on_angle, off_angle),
            )),
        };
        orchestrator
            .attach(effect)
            .expect("fixture catalog exceeds fan-out capacity");
    }

    orchestrator
}

fn handle_help(topic: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    match topic {
        Some(target) => {
            if let Some((_, detail)) = HELP_TOPICS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(target))
            {
                lines.push((*detail).to_string());
            } else {
                lines.push(format!("No help available for `{target}`."));
                lines.push(format!("Available topics: {}", help_topic_list()));
            }
        }
        None => {
            lines.push("Available commands:".to_string());
            for (_, detail) in HELP_TOPICS {
                lines.push(format!("  {detail}"));
            }
            lines.push("Type `help <topic>` for a specific command.".to_string());
        }
    }
    lines
}

fn help_topic_list() -> String {
    let mut buffer = String::new();
    for (index, (name, _)) in HELP_TOPICS.iter().enumerate() {
        if index > 0 {
            buffer.push_str(", ");
        }
        buffer.push_str(name);
    }
    buffer
}

struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    fn new(profile: TranscriptProfile, path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };

        logger.write_header(profile)?;
        Ok(logger)
    }

    fn write_header(&mut self, profile: TranscriptProfile) -> io::Result<()> {
        writeln!(self.writer, "# {}", profile.header())?;
        writeln!(
            self.writer,
            "# Timestamps are simulated milliseconds since power-on"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(&mut self, at: u32, role: TranscriptRole, line: &str) -> io::Result<()> {
        writeln!(self.writer, "[+{at:>6} ms] {} {line}", role.prefix())?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}
