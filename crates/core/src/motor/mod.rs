//! Drive motor seam
//!
//! The behavior layer never touches PWM registers or direction pins; it
//! commands each gearmotor through the [`Motor`] trait with a signed
//! normalized speed and lets the platform crate translate that into duty
//! cycles.
//!
//! # Design
//!
//! This module is pure `no_std` with no feature gates. Range checking is
//! shared through [`validate_speed`] so every implementation rejects the
//! same inputs; everything past the trait boundary (H-bridge wiring,
//! simulated wheels) lives outside this crate.

/// Failure modes a motor backend can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorError {
    /// Commanded speed fell outside the normalized range (or was NaN)
    InvalidSpeed,
    /// Output stage refused the command
    HardwareFault,
}

impl core::fmt::Display for MotorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MotorError::InvalidSpeed => write!(f, "speed outside [-1.0, +1.0]"),
            MotorError::HardwareFault => write!(f, "motor hardware fault"),
        }
    }
}

/// One gearmotor, signed normalized speed
///
/// `+1.0` is full forward, `-1.0` full reverse, `0.0` stopped. The drive
/// layer scales its percentage parameters into this range before calling
/// down.
pub trait Motor {
    /// Command a speed in [-1.0, +1.0].
    ///
    /// # Errors
    ///
    /// [`MotorError::InvalidSpeed`] for NaN or out-of-range input,
    /// [`MotorError::HardwareFault`] when the output stage fails.
    fn set_speed(&mut self, speed: f32) -> Result<(), MotorError>;

    /// Cut the output to zero duty.
    ///
    /// # Errors
    ///
    /// [`MotorError::HardwareFault`] when the output stage fails.
    fn stop(&mut self) -> Result<(), MotorError>;
}

/// Range check shared by `Motor` implementations.
///
/// # Errors
///
/// [`MotorError::InvalidSpeed`] for NaN or out-of-range values.
#[inline]
pub fn validate_speed(speed: f32) -> Result<(), MotorError> {
    if speed.is_nan() || !(-1.0..=1.0).contains(&speed) {
        return Err(MotorError::InvalidSpeed);
    }
    Ok(())
}

/// Mock motor that records the last commanded speed
///
/// Public so the drive layer and the charts can assert on wheel commands
/// in their own test modules.
#[derive(Debug, Default)]
pub struct MockMotor {
    /// Last speed passed to `set_speed`, 0.0 after `stop`
    pub speed: f32,
    /// Number of `set_speed` / `stop` calls
    pub calls: usize,
    /// When set, every call fails with `HardwareFault`
    pub fail: bool,
}

impl MockMotor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Motor for MockMotor {
    fn set_speed(&mut self, speed: f32) -> Result<(), MotorError> {
        validate_speed(speed)?;
        if self.fail {
            return Err(MotorError::HardwareFault);
        }
        self.speed = speed;
        self.calls += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        if self.fail {
            return Err(MotorError::HardwareFault);
        }
        self.speed = 0.0;
        self.calls += 1;
        Ok(())
    }
}
