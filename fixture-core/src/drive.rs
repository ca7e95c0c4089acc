//! Output drive capabilities: the endpoint values a two-phase timer swings
//! between, and the physical write that realizes them.

use core::fmt;

use crate::io::{DigitalOutput, Level, Polarity, PwmOutput};

/// Full angular range of the actuator.
pub const ANGLE_FULL_SCALE: u16 = 180;

/// Full scale of the 8-bit duty output.
pub const DUTY_FULL_SCALE: u8 = 255;

/// Actuator angle in whole degrees.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Degrees(u16);

impl Degrees {
    #[must_use]
    pub const fn new(degrees: u16) -> Self {
        Self(degrees)
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}deg", self.0)
    }
}

/// Linear angle-to-duty map, round-half-up, input clamped to the actuator
/// range so out-of-range configuration cannot overflow the duty scale.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // clamped to ANGLE_FULL_SCALE before scaling
pub const fn angle_to_duty(angle: Degrees) -> u8 {
    let clamped = if angle.0 > ANGLE_FULL_SCALE {
        ANGLE_FULL_SCALE
    } else {
        angle.0
    };
    let num = clamped as u32 * DUTY_FULL_SCALE as u32;
    let den = ANGLE_FULL_SCALE as u32;
    ((num + den / 2) / den) as u8
}

/// Inverse of [`angle_to_duty`]; the pair round-trips within one degree.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // result is at most ANGLE_FULL_SCALE
pub const fn duty_to_angle(duty: u8) -> Degrees {
    let num = duty as u32 * ANGLE_FULL_SCALE as u32;
    let den = DUTY_FULL_SCALE as u32;
    Degrees(((num + den / 2) / den) as u16)
}

/// What a two-phase timer drives: an idle/active endpoint pair plus the
/// physical write that realizes a value.
pub trait OutputDrive {
    /// Value the timer computes and tracks for idempotent writes.
    type Value: Copy + PartialEq;

    fn idle_value(&self) -> Self::Value;

    fn active_value(&self) -> Self::Value;

    /// Push `value` to the hardware. Fire-and-forget.
    fn apply(&mut self, value: Self::Value);
}

/// Polarity-resolved binary drive over a digital output port.
#[derive(Debug)]
pub struct BinaryDrive<O> {
    port: O,
    polarity: Polarity,
}

impl<O: DigitalOutput> BinaryDrive<O> {
    #[must_use]
    pub const fn new(port: O, polarity: Polarity) -> Self {
        Self { port, polarity }
    }
}

impl<O: DigitalOutput> OutputDrive for BinaryDrive<O> {
    type Value = Level;

    fn idle_value(&self) -> Level {
        self.polarity.inactive_level()
    }

    fn active_value(&self) -> Level {
        self.polarity.active_level()
    }

    fn apply(&mut self, value: Level) {
        self.port.set_level(value);
    }
}

/// Angle-endpoint drive over an 8-bit PWM port. The timer tracks angles;
/// the duty conversion happens at the write.
#[derive(Debug)]
pub struct ServoDrive<O> {
    port: O,
    on_angle: Degrees,
    off_angle: Degrees,
}

impl<O: PwmOutput> ServoDrive<O> {
    #[must_use]
    pub const fn new(port: O, on_angle: Degrees, off_angle: Degrees) -> Self {
        Self {
            port,
            on_angle,
            off_angle,
        }
    }
}

impl<O: PwmOutput> OutputDrive for ServoDrive<O> {
    type Value = Degrees;

    fn idle_value(&self) -> Degrees {
        self.off_angle
    }

    fn active_value(&self) -> Degrees {
        self.on_angle
    }

    fn apply(&mut self, value: Degrees) {
        self.port.set_duty(angle_to_duty(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct SharedPin<'a>(&'a Cell<Level>);

    impl DigitalOutput for SharedPin<'_> {
        fn set_level(&mut self, level: Level) {
            self.0.set(level);
        }
    }

    struct SharedDuty<'a>(&'a Cell<u8>);

    impl PwmOutput for SharedDuty<'_> {
        fn set_duty(&mut self, duty: u8) {
            self.0.set(duty);
        }
    }

    #[test]
    fn mapping_hits_the_range_endpoints() {
        assert_eq!(angle_to_duty(Degrees::new(0)), 0);
        assert_eq!(angle_to_duty(Degrees::new(180)), 255);
        assert_eq!(duty_to_angle(0), Degrees::new(0));
        assert_eq!(duty_to_angle(255), Degrees::new(180));
    }

    #[test]
    fn mapping_rounds_rather_than_truncates() {
        // 90deg is exactly 127.5 duty counts; round-half-up gives 128.
        assert_eq!(angle_to_duty(Degrees::new(90)), 128);
        assert_eq!(duty_to_angle(128), Degrees::new(90));
    }

    #[test]
    fn out_of_range_angles_clamp_to_full_scale() {
        assert_eq!(angle_to_duty(Degrees::new(181)), 255);
        assert_eq!(angle_to_duty(Degrees::new(u16::MAX)), 255);
    }

    #[test]
    fn round_trip_stays_within_one_degree() {
        for angle in 0..=180u16 {
            let back = duty_to_angle(angle_to_duty(Degrees::new(angle))).as_u16();
            let error = back.abs_diff(angle);
            assert!(error <= 1, "angle {angle} came back as {back}");
        }
    }

    #[test]
    fn binary_drive_resolves_polarity() {
        let pin = Cell::new(Level::Low);
        let mut drive = BinaryDrive::new(SharedPin(&pin), Polarity::ActiveLow);

        assert_eq!(drive.idle_value(), Level::High);
        assert_eq!(drive.active_value(), Level::Low);

        drive.apply(Level::High);
        assert_eq!(pin.get(), Level::High);
    }

    #[test]
    fn servo_drive_writes_mapped_duty() {
        let duty = Cell::new(0);
        let mut drive = ServoDrive::new(SharedDuty(&duty), Degrees::new(135), Degrees::new(0));

        assert_eq!(drive.idle_value(), Degrees::new(0));
        assert_eq!(drive.active_value(), Degrees::new(135));

        drive.apply(Degrees::new(135));
        assert_eq!(duty.get(), angle_to_duty(Degrees::new(135)));
        drive.apply(Degrees::new(0));
        assert_eq!(duty.get(), 0);
    }
}
