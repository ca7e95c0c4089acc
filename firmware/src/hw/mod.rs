//! Adapters that bind STM32 peripherals to the `fixture-core` port traits.
//!
//! The orchestrator only ever sees [`DigitalInput`], [`DigitalOutput`],
//! [`PwmOutput`], and [`Watchdog`]; these wrappers translate between the
//! HAL's pin types and the core's level and duty domains.

use embassy_stm32::gpio::{Input, Level as HalLevel, Output, Pull};
use embassy_stm32::peripherals::{IWDG, TIM2};
use embassy_stm32::timer::simple_pwm::SimplePwmChannel;
use embassy_stm32::wdg::IndependentWatchdog;

use fixture_core::config::PullMode;
use fixture_core::drive::DUTY_FULL_SCALE;
use fixture_core::io::{DigitalInput, DigitalOutput, Level, PwmOutput, Watchdog};

use crate::status;

/// Pressure plate input pin.
pub struct PlatePin<'d> {
    input: Input<'d>,
}

impl<'d> PlatePin<'d> {
    pub fn new(input: Input<'d>) -> Self {
        Self { input }
    }
}

impl DigitalInput for PlatePin<'_> {
    fn read_level(&mut self) -> Level {
        if self.input.is_high() {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Push-pull pin behind a switched effect channel.
pub struct SwitchPin<'d> {
    output: Output<'d>,
}

impl<'d> SwitchPin<'d> {
    pub fn new(output: Output<'d>) -> Self {
        Self { output }
    }
}

impl DigitalOutput for SwitchPin<'_> {
    fn set_level(&mut self, level: Level) {
        self.output.set_level(hal_level(level));
    }
}

/// Servo channel on TIM2 running a 50 Hz frame.
pub struct ServoPwm<'d> {
    channel: SimplePwmChannel<'d, TIM2>,
}

impl<'d> ServoPwm<'d> {
    pub fn new(mut channel: SimplePwmChannel<'d, TIM2>) -> Self {
        channel.enable();
        Self { channel }
    }
}

impl PwmOutput for ServoPwm<'_> {
    fn set_duty(&mut self, duty: u8) {
        // One full duty scale (255) spans 1 ms of pulse width and the frame
        // is 20 of those spans, so duty 0 rests at 1 ms and full scale at
        // 2 ms. That is the classic hobby-servo pulse range.
        let span = u16::from(DUTY_FULL_SCALE);
        self.channel
            .set_duty_cycle_fraction(span + u16::from(duty), span * 20);
    }
}

/// Independent watchdog serviced once per poll cycle.
pub struct IwdgService<'d> {
    watchdog: IndependentWatchdog<'d, IWDG>,
}

impl<'d> IwdgService<'d> {
    pub fn new(watchdog: IndependentWatchdog<'d, IWDG>) -> Self {
        Self { watchdog }
    }
}

impl Watchdog for IwdgService<'_> {
    fn service(&mut self) {
        self.watchdog.pet();
        status::record_watchdog_service();
    }
}

/// Maps the catalog's pull mode onto the HAL's pin pull.
pub fn hal_pull(pull: PullMode) -> Pull {
    match pull {
        PullMode::Up => Pull::Up,
        PullMode::Down => Pull::Down,
        PullMode::None => Pull::None,
    }
}

fn hal_level(level: Level) -> HalLevel {
    match level {
        Level::Low => HalLevel::Low,
        Level::High => HalLevel::High,
    }
}
