//! Differential drive maneuvers
//!
//! The charts never talk to motors directly. They call one of the maneuver
//! methods on [`DriveInterface`] and the drive layer turns it into a pair
//! of signed wheel commands:
//!
//! - tank turns spin the wheels in opposite directions
//! - pivot turns hold one wheel and drive the other, with forward and
//!   backward variants
//! - gradual turns split a wheel-speed difference across both sides so the
//!   rover arcs while moving
//!
//! Commands are percentages of full duty. Every maneuver restarts from the
//! configured cruise speed; [`DriveInterface::set_move_speed`] then rescales
//! the active pattern in place, so a slow reverse is "move backward, set
//! speed 40" in that order.
//!
//! Motor mounting polarity is handled here via [`DriveParams`], the
//! [`Motor`] implementations below this layer are polarity-blind.

use crate::motor::Motor;
use crate::parameters::DriveParams;

/// Motion commands available to the charts.
///
/// All methods are fire-and-forget: motor faults are swallowed at this
/// seam so a single bad PWM write cannot wedge a dispatch in progress.
pub trait DriveInterface {
    /// Straight ahead at the current cruise speed.
    fn move_forward(&mut self);

    /// Straight back at the current cruise speed.
    fn move_backward(&mut self);

    /// Both wheels off.
    fn stop_moving(&mut self);

    /// Spin in place, counter-clockwise.
    fn tank_turn_left(&mut self);

    /// Spin in place, clockwise.
    fn tank_turn_right(&mut self);

    /// Arc forward-left around the stopped left wheel.
    fn pivot_turn_left(&mut self);

    /// Arc forward-right around the stopped right wheel.
    fn pivot_turn_right(&mut self);

    /// Arc backward while rotating counter-clockwise.
    fn pivot_turn_left_backward(&mut self);

    /// Arc backward while rotating clockwise.
    fn pivot_turn_right_backward(&mut self);

    /// Arc left while moving: left wheel slowed and right sped up by
    /// half of `difference` each.
    fn gradual_turn_left(&mut self, difference: u8);

    /// Mirror of [`DriveInterface::gradual_turn_left`].
    fn gradual_turn_right(&mut self, difference: u8);

    /// Rescale the current wheel pattern to a new speed percentage.
    ///
    /// Wheel signs and ratios are preserved, stopped wheels stay stopped.
    /// The percentage is clamped to the configured maximum.
    fn set_move_speed(&mut self, percent: u8);
}

/// Two-motor skid-steer drive.
#[derive(Debug)]
pub struct DifferentialDrive<L: Motor, R: Motor> {
    left: L,
    right: R,
    params: DriveParams,
    /// Scale the current pattern was built for
    speed: u8,
    left_cmd: i8,
    right_cmd: i8,
}

impl<L: Motor, R: Motor> DifferentialDrive<L, R> {
    pub fn new(left: L, right: R, params: DriveParams) -> Self {
        Self {
            left,
            right,
            params,
            speed: params.normal_speed,
            left_cmd: 0,
            right_cmd: 0,
        }
    }

    /// Current signed wheel commands in percent, `(left, right)`.
    #[inline]
    pub fn wheel_commands(&self) -> (i8, i8) {
        (self.left_cmd, self.right_cmd)
    }

    /// Current pattern scale in percent.
    #[inline]
    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Release the motors, consuming the drive.
    pub fn into_motors(self) -> (L, R) {
        (self.left, self.right)
    }

    /// Start a fresh pattern at cruise speed.
    fn pattern(&mut self, left: i16, right: i16) {
        let max = i16::from(self.params.max_speed);
        self.speed = self.params.normal_speed;
        self.left_cmd = left.clamp(-max, max) as i8;
        self.right_cmd = right.clamp(-max, max) as i8;
        self.apply();
    }

    fn apply(&mut self) {
        let mut left = f32::from(self.left_cmd) / 100.0;
        let mut right = f32::from(self.right_cmd) / 100.0;
        if self.params.invert_left {
            left = -left;
        }
        if self.params.invert_right {
            right = -right;
        }
        let _ = self.left.set_speed(left);
        let _ = self.right.set_speed(right);
    }
}

impl<L: Motor, R: Motor> DriveInterface for DifferentialDrive<L, R> {
    fn move_forward(&mut self) {
        let v = i16::from(self.params.normal_speed);
        self.pattern(v, v);
    }

    fn move_backward(&mut self) {
        let v = i16::from(self.params.normal_speed);
        self.pattern(-v, -v);
    }

    fn stop_moving(&mut self) {
        self.speed = self.params.normal_speed;
        self.left_cmd = 0;
        self.right_cmd = 0;
        let _ = self.left.stop();
        let _ = self.right.stop();
    }

    fn tank_turn_left(&mut self) {
        let v = i16::from(self.params.normal_speed);
        self.pattern(-v, v);
    }

    fn tank_turn_right(&mut self) {
        let v = i16::from(self.params.normal_speed);
        self.pattern(v, -v);
    }

    fn pivot_turn_left(&mut self) {
        let v = i16::from(self.params.normal_speed);
        self.pattern(0, v);
    }

    fn pivot_turn_right(&mut self) {
        let v = i16::from(self.params.normal_speed);
        self.pattern(v, 0);
    }

    fn pivot_turn_left_backward(&mut self) {
        let v = i16::from(self.params.normal_speed);
        self.pattern(-v, 0);
    }

    fn pivot_turn_right_backward(&mut self) {
        let v = i16::from(self.params.normal_speed);
        self.pattern(0, -v);
    }

    fn gradual_turn_left(&mut self, difference: u8) {
        let v = i16::from(self.params.normal_speed);
        let half = i16::from(difference / 2);
        self.pattern(v - half, v + half);
    }

    fn gradual_turn_right(&mut self, difference: u8) {
        let v = i16::from(self.params.normal_speed);
        let half = i16::from(difference / 2);
        self.pattern(v + half, v - half);
    }

    fn set_move_speed(&mut self, percent: u8) {
        let percent = percent.min(self.params.max_speed);
        if self.speed == 0 {
            self.left_cmd = 0;
            self.right_cmd = 0;
        } else {
            let old = i16::from(self.speed);
            let new = i16::from(percent);
            self.left_cmd = (i16::from(self.left_cmd) * new / old) as i8;
            self.right_cmd = (i16::from(self.right_cmd) * new / old) as i8;
        }
        self.speed = percent;
        self.apply();
    }
}

/// Maneuver log entry recorded by [`MockDrive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveCommand {
    Forward,
    Backward,
    Stop,
    TankLeft,
    TankRight,
    PivotLeft,
    PivotRight,
    PivotLeftBack,
    PivotRightBack,
    GradualLeft(u8),
    GradualRight(u8),
    Speed(u8),
}

/// Drive double that records every maneuver in call order.
///
/// Public so chart test modules can assert on motion sequences.
#[derive(Debug, Default)]
pub struct MockDrive {
    pub commands: heapless::Vec<DriveCommand, 128>,
}

impl MockDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent maneuver, if any.
    pub fn last(&self) -> Option<DriveCommand> {
        self.commands.last().copied()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn log(&mut self, command: DriveCommand) {
        // Overflow drops the oldest information, tests size for their run
        let _ = self.commands.push(command);
    }
}

impl DriveInterface for MockDrive {
    fn move_forward(&mut self) {
        self.log(DriveCommand::Forward);
    }

    fn move_backward(&mut self) {
        self.log(DriveCommand::Backward);
    }

    fn stop_moving(&mut self) {
        self.log(DriveCommand::Stop);
    }

    fn tank_turn_left(&mut self) {
        self.log(DriveCommand::TankLeft);
    }

    fn tank_turn_right(&mut self) {
        self.log(DriveCommand::TankRight);
    }

    fn pivot_turn_left(&mut self) {
        self.log(DriveCommand::PivotLeft);
    }

    fn pivot_turn_right(&mut self) {
        self.log(DriveCommand::PivotRight);
    }

    fn pivot_turn_left_backward(&mut self) {
        self.log(DriveCommand::PivotLeftBack);
    }

    fn pivot_turn_right_backward(&mut self) {
        self.log(DriveCommand::PivotRightBack);
    }

    fn gradual_turn_left(&mut self, difference: u8) {
        self.log(DriveCommand::GradualLeft(difference));
    }

    fn gradual_turn_right(&mut self, difference: u8) {
        self.log(DriveCommand::GradualRight(difference));
    }

    fn set_move_speed(&mut self, percent: u8) {
        self.log(DriveCommand::Speed(percent));
    }
}
