use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::gpio::{Input, Level, Output, OutputType, Speed};
use embassy_stm32::peripherals::TIM2;
use embassy_stm32::time::hz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm, SimplePwmChannel};
use embassy_stm32::wdg::IndependentWatchdog;

use fixture_core::config::{FIXTURE_CONFIG, OutputConfig, OutputMode};
use fixture_core::debounce::Debouncer;
use fixture_core::drive::{BinaryDrive, ServoDrive};
use fixture_core::generator::OutputGenerator;
use fixture_core::io::DigitalInput;
use fixture_core::orchestrator::{EffectOutput, Orchestrator};

use crate::hw::{self, IwdgService, PlatePin, ServoPwm, SwitchPin};
use crate::status;

mod heartbeat_task;
mod poll_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

/// The poll task services the IWDG every millisecond, so this only trips
/// when the executor stalls outright.
const WATCHDOG_TIMEOUT_US: u32 = 250_000;

pub(super) type FixtureOrchestrator =
    Orchestrator<PlatePin<'static>, SwitchPin<'static>, ServoPwm<'static>, IwdgService<'static>>;

type FixtureEffect = EffectOutput<SwitchPin<'static>, ServoPwm<'static>>;

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA2,
        PA3,
        PA4,
        PA5,
        TIM2,
        IWDG,
        ..
    } = hal::init(config);

    let fixture = &FIXTURE_CONFIG;
    let [dispenser, valve, igniter] = &fixture.outputs;

    let mut plate = PlatePin::new(Input::new(PA2, hw::hal_pull(fixture.input.pull)));
    let debouncer = Debouncer::new(&fixture.input, plate.read_level(), poll_task::now_ticks());

    let mut watchdog = IndependentWatchdog::new(IWDG, WATCHDOG_TIMEOUT_US);
    watchdog.unleash();

    let mut orchestrator = Orchestrator::new(
        fixture.input.id,
        plate,
        debouncer,
        IwdgService::new(watchdog),
    );

    let servo_pwm = SimplePwm::new(
        TIM2,
        None,
        None,
        None,
        Some(PwmPin::new_ch4(PA3, OutputType::PushPull)),
        hz(50),
        CountingMode::EdgeAlignedUp,
    );
    let channels = servo_pwm.split();

    attach(
        &mut orchestrator,
        pulse_effect(dispenser, Output::new(PA5, Level::Low, Speed::Low)),
    );
    attach(
        &mut orchestrator,
        pulse_effect(valve, Output::new(PA4, Level::Low, Speed::Low)),
    );
    attach(&mut orchestrator, servo_effect(igniter, channels.ch4));

    orchestrator.setup();
    status::reset_outputs();

    defmt::info!("fixture: {}", defmt::Display2Format(&fixture.input));
    for row in &fixture.outputs {
        defmt::info!("fixture: {}", defmt::Display2Format(row));
    }

    spawner
        .spawn(poll_task::run(orchestrator))
        .expect("failed to spawn poll task");
    spawner
        .spawn(heartbeat_task::run())
        .expect("failed to spawn heartbeat task");

    core::future::pending::<()>().await;
}

fn attach(orchestrator: &mut FixtureOrchestrator, effect: FixtureEffect) {
    orchestrator.attach(effect).expect("output table full");
}

fn pulse_effect(row: &OutputConfig, pin: Output<'static>) -> FixtureEffect {
    let OutputMode::Switched(polarity) = row.mode else {
        defmt::panic!("{} is not a switched output", row.id.name());
    };
    EffectOutput::Pulse(OutputGenerator::new(
        row.id,
        row.delay,
        row.duration,
        BinaryDrive::new(SwitchPin::new(pin), polarity),
    ))
}

fn servo_effect(row: &OutputConfig, channel: SimplePwmChannel<'static, TIM2>) -> FixtureEffect {
    let OutputMode::Sweep {
        on_angle,
        off_angle,
    } = row.mode
    else {
        defmt::panic!("{} is not a sweep output", row.id.name());
    };
    EffectOutput::Servo(OutputGenerator::new(
        row.id,
        row.delay,
        row.duration,
        ServoDrive::new(ServoPwm::new(channel), on_angle, off_angle),
    ))
}
