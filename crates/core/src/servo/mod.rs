//! Servo abstraction for the unloading mechanism
//!
//! This module provides platform-agnostic types and functions for the two
//! ball-handling servos:
//! - the sweep servo that rakes balls out of the hopper
//! - the bridge servo that extends a ramp toward the target
//!
//! Commands are RC servo pulse widths in microseconds, clamped to the
//! 1000-2000 us range every hobby servo accepts. The charts own the sweep
//! trajectory and call [`step_toward`] once per servo timer tick, so the
//! pulse never jumps and the mechanism moves at a tunable rate.
//!
//! # Design
//!
//! This module is pure `no_std` with no feature gates. Pulse generation
//! (PWM peripherals, output compare) belongs behind [`ServoInterface`] in
//! the platform crate.

/// Shortest accepted servo pulse (us)
pub const SERVO_PULSE_MIN: u16 = 1000;

/// Longest accepted servo pulse (us)
pub const SERVO_PULSE_MAX: u16 = 2000;

/// Center position pulse (us)
pub const SERVO_PULSE_CENTER: u16 = 1500;

/// Servo output interface
///
/// Setters take a pulse width in microseconds. Implementations clamp to
/// the [`SERVO_PULSE_MIN`]..=[`SERVO_PULSE_MAX`] range rather than error,
/// so a miscalibrated parameter cannot drive a horn into the chassis.
pub trait ServoInterface {
    /// Command the hopper sweep servo
    ///
    /// # Errors
    ///
    /// Returns an error string if the output hardware fails.
    fn set_unloading_pulse(&mut self, pulse_us: u16) -> Result<(), &'static str>;

    /// Command the bridge ramp servo
    ///
    /// # Errors
    ///
    /// Returns an error string if the output hardware fails.
    fn set_bridge_pulse(&mut self, pulse_us: u16) -> Result<(), &'static str>;
}

/// Clamp a pulse width to the accepted servo range
#[inline]
pub fn clamp_pulse(pulse_us: u16) -> u16 {
    pulse_us.clamp(SERVO_PULSE_MIN, SERVO_PULSE_MAX)
}

/// Move `current` one step toward `target`, never overshooting
///
/// Returns `target` once the remaining distance is within one step.
#[inline]
pub fn step_toward(current: u16, target: u16, step: u16) -> u16 {
    if current < target {
        let next = current.saturating_add(step);
        if next > target {
            target
        } else {
            next
        }
    } else {
        let next = current.saturating_sub(step);
        if next < target {
            target
        } else {
            next
        }
    }
}

/// Mock servo pair that records commanded pulses
///
/// Public so chart tests can assert on the unload choreography. Every
/// sweep command is also appended to `sweep_history` for trajectory
/// checks.
#[derive(Debug)]
pub struct MockServos {
    /// Last commanded sweep pulse (us)
    pub sweep: u16,
    /// Last commanded bridge pulse (us)
    pub bridge: u16,
    /// Every sweep pulse in command order
    pub sweep_history: heapless::Vec<u16, 128>,
}

impl MockServos {
    pub fn new() -> Self {
        Self {
            sweep: SERVO_PULSE_CENTER,
            bridge: SERVO_PULSE_CENTER,
            sweep_history: heapless::Vec::new(),
        }
    }
}

impl Default for MockServos {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoInterface for MockServos {
    fn set_unloading_pulse(&mut self, pulse_us: u16) -> Result<(), &'static str> {
        self.sweep = clamp_pulse(pulse_us);
        // History overflow just drops samples, tests size for their run
        let _ = self.sweep_history.push(self.sweep);
        Ok(())
    }

    fn set_bridge_pulse(&mut self, pulse_us: u16) -> Result<(), &'static str> {
        self.bridge = clamp_pulse(pulse_us);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_pulse() {
        assert_eq!(clamp_pulse(500), SERVO_PULSE_MIN);
        assert_eq!(clamp_pulse(1500), 1500);
        assert_eq!(clamp_pulse(2500), SERVO_PULSE_MAX);
    }

    #[test]
    fn test_step_toward_rises_without_overshoot() {
        let mut pulse = 1500;
        pulse = step_toward(pulse, 1525, 10);
        assert_eq!(pulse, 1510);
        pulse = step_toward(pulse, 1525, 10);
        assert_eq!(pulse, 1520);
        pulse = step_toward(pulse, 1525, 10);
        assert_eq!(pulse, 1525);
        assert_eq!(step_toward(pulse, 1525, 10), 1525);
    }

    #[test]
    fn test_step_toward_falls_without_overshoot() {
        assert_eq!(step_toward(1500, 1000, 400), 1100);
        assert_eq!(step_toward(1100, 1000, 400), 1000);
    }

    #[test]
    fn test_mock_servos_clamp_and_record() {
        let mut servos = MockServos::new();
        servos.set_unloading_pulse(2300).unwrap();
        assert_eq!(servos.sweep, SERVO_PULSE_MAX);
        servos.set_bridge_pulse(900).unwrap();
        assert_eq!(servos.bridge, SERVO_PULSE_MIN);
        assert_eq!(servos.sweep_history.as_slice(), &[SERVO_PULSE_MAX]);
    }
}
