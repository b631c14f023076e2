use super::{
    cmd::{map, EchoMode, RotationDirection, SafetyLimitMode},
    parse,
    poll::poll_until,
    DriverError, Rotator,
};
use crate::util::ensure;
use std::{
    io::{Read, Write},
    thread,
    time::Duration,
};
use tracing::debug;

//

/// Static configuration of a rotator
///
/// All fields have working defaults; override what the installation needs
/// before handing the config to [`Rotator::new`]. None of these are sent to
/// the controller, they only shape how commands are encoded and how waits
/// behave.
#[derive(Debug, Clone, PartialEq)]
pub struct RotorConfig {
    /// Numeric prefix selecting which unit on the bus receives addressed
    /// commands
    pub controller_address: u8,
    /// Scale factor between encoder counts and degrees, before gearbox
    /// reduction
    pub degrees_per_motor_rev: i64,
    /// Settle time the controller needs between consecutive commands,
    /// empirically determined
    pub command_settle: Duration,
    /// Settle time after a system reset. The controller accepts no commands
    /// while it restarts, so this is a protocol requirement rather than a
    /// tunable.
    pub reset_settle: Duration,
    /// Sample interval while polling for a target position
    pub poll_interval: Duration,
    /// Upper bound on polling for a target position
    pub poll_timeout: Duration,
    /// Allowed deviation from the target position in raw counts
    ///
    /// 0 keeps the exact equality the protocol specifies. Installations
    /// where the controller settles a count or two off the commanded target
    /// can widen this instead of timing out.
    pub position_tolerance: i64,
}

impl Default for RotorConfig {
    fn default() -> Self {
        RotorConfig {
            controller_address: 1,
            degrees_per_motor_rev: 1000,
            command_settle: Duration::from_millis(300),
            reset_settle: Duration::from_secs(2),
            poll_interval: Duration::from_millis(100),
            poll_timeout: Duration::from_secs(30),
            position_tolerance: 0,
        }
    }
}

//

// software-tracked state of one rotator. setters send the wire command
// first and only update these fields afterwards, so a transport failure
// leaves the last known-delivered value in place
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RotorState {
    pub(crate) controller_address: u8,
    pub(crate) degrees_per_step: f64,
    pub(crate) direction: RotationDirection,
    pub(crate) velocity: f64,
    pub(crate) acceleration: f64,
    pub(crate) gearbox_ratio: f64,
    pub(crate) safety_limits_enabled: bool,
    pub(crate) current_angle: f64,
}

impl RotorState {
    pub(crate) fn initial(cfg: &RotorConfig) -> Self {
        RotorState {
            controller_address: cfg.controller_address,
            degrees_per_step: 10.0,
            direction: RotationDirection::Clockwise,
            velocity: 10.0,
            acceleration: 10.0,
            gearbox_ratio: 1.0,
            safety_limits_enabled: true,
            current_angle: 0.0,
        }
    }
}

//

impl<I: Read + Write> Rotator<I> {
    /// The direction subsequent steps will turn
    pub fn direction(&self) -> RotationDirection {
        self.state.direction
    }

    /// Angular travel per step in output-shaft degrees
    pub fn degrees_per_step(&self) -> f64 {
        self.state.degrees_per_step
    }

    /// Velocity in revolutions per second
    pub fn velocity(&self) -> f64 {
        self.state.velocity
    }

    /// Acceleration in revolutions per second squared
    pub fn acceleration(&self) -> f64 {
        self.state.acceleration
    }

    /// Gearbox reduction ratio in (0, 1]
    pub fn gearbox_ratio(&self) -> f64 {
        self.state.gearbox_ratio
    }

    /// Whether the controller's safety limits are active
    pub fn safety_limits_enabled(&self) -> bool {
        self.state.safety_limits_enabled
    }

    /// Address prefixing addressed commands
    pub fn controller_address(&self) -> u8 {
        self.state.controller_address
    }

    /// Cumulative commanded angle in degrees
    ///
    /// Tracked in software from the steps this driver issued, not read back
    /// from the hardware, so it drifts from physical truth if a command is
    /// lost on the wire. [`get_absolute_position`][Rotator::get_absolute_position]
    /// asks the controller itself.
    pub fn current_angle(&self) -> f64 {
        self.state.current_angle
    }

    //

    /// Sets the rotation direction for subsequent steps
    pub fn set_direction(&mut self, direction: RotationDirection) -> Result<(), DriverError> {
        self.send_unaddressed(format_args!("{}{}", map::SET_DIRECTION, direction))?;
        self.state.direction = direction;
        Ok(())
    }

    /// Sets the angular travel per step in output-shaft degrees
    ///
    /// The wire value is the equivalent travel in encoder counts, scaled by
    /// [`degrees_per_motor_rev`][RotorConfig::degrees_per_motor_rev] and the
    /// gearbox ratio and rounded to the nearest count.
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidArgument`] unless `degrees` is positive
    /// and finite.
    pub fn set_degrees_per_step(&mut self, degrees: f64) -> Result<(), DriverError> {
        ensure!(
            degrees > 0.0 && degrees.is_finite(),
            DriverError::InvalidArgument
        );
        let counts = self.counts_for(degrees);
        self.send_unaddressed(format_args!("{}{}", map::SET_STEP_SIZE, counts))?;
        self.state.degrees_per_step = degrees;
        Ok(())
    }

    /// Sets the velocity in revolutions per second
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidArgument`] unless `velocity` is positive
    /// and finite.
    pub fn set_velocity(&mut self, velocity: f64) -> Result<(), DriverError> {
        ensure!(
            velocity > 0.0 && velocity.is_finite(),
            DriverError::InvalidArgument
        );
        self.send_unaddressed(format_args!(
            "{}{}",
            map::SET_VELOCITY,
            velocity.round() as i64
        ))?;
        self.state.velocity = velocity;
        Ok(())
    }

    /// Sets the acceleration in revolutions per second squared
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidArgument`] unless `acceleration` is
    /// positive and finite.
    pub fn set_acceleration(&mut self, acceleration: f64) -> Result<(), DriverError> {
        ensure!(
            acceleration > 0.0 && acceleration.is_finite(),
            DriverError::InvalidArgument
        );
        self.send_unaddressed(format_args!(
            "{}{}",
            map::SET_ACCELERATION,
            acceleration.round() as i64
        ))?;
        self.state.acceleration = acceleration;
        Ok(())
    }

    /// Sets the gearbox reduction ratio. Local only, nothing goes on the
    /// wire; the ratio scales every subsequent count conversion.
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidArgument`] unless `0 < ratio <= 1`,
    /// leaving the prior ratio in place.
    pub fn set_gearbox_ratio(&mut self, ratio: f64) -> Result<(), DriverError> {
        ensure!(ratio > 0.0 && ratio <= 1.0, DriverError::InvalidArgument);
        self.state.gearbox_ratio = ratio;
        Ok(())
    }

    /// Changes which address prefixes subsequent addressed commands. Local
    /// only.
    pub fn set_controller_address(&mut self, address: u8) {
        self.state.controller_address = address;
    }

    /// Re-enables the controller's safety limits
    pub fn enable_safety_limits(&mut self) -> Result<(), DriverError> {
        self.set_safety_limits(SafetyLimitMode::Enabled)
    }

    /// Disables the controller's safety limits
    ///
    /// Required before homing, since the home reference may lie past a
    /// limit switch.
    pub fn disable_safety_limits(&mut self) -> Result<(), DriverError> {
        self.set_safety_limits(SafetyLimitMode::Disabled)
    }

    fn set_safety_limits(&mut self, mode: SafetyLimitMode) -> Result<(), DriverError> {
        self.send_addressed(format_args!("{}{}", map::SAFETY_LIMITS, mode))?;
        self.state.safety_limits_enabled = mode == SafetyLimitMode::Enabled;
        Ok(())
    }

    /// Sets whether the controller echoes received commands
    pub fn set_echo_mode(&mut self, mode: EchoMode) -> Result<(), DriverError> {
        self.send_addressed(format_args!("{}{}", map::ECHO_MODE, mode))
    }

    /// Resets the controller
    ///
    /// Blocks for [`reset_settle`][RotorConfig::reset_settle] before
    /// returning; the controller accepts no commands while it restarts.
    pub fn reset_system(&mut self) -> Result<(), DriverError> {
        self.send_addressed(format_args!("{}", map::SYSTEM_RESET))?;
        thread::sleep(self.cfg.reset_settle);
        Ok(())
    }

    /// Zeroes the hardware encoder count
    ///
    /// [`current_angle`][Rotator::current_angle] is unaffected, the two
    /// track different things.
    pub fn reset_position_register(&mut self) -> Result<(), DriverError> {
        self.send_addressed(format_args!("{}", map::POSITION_ZERO))
    }

    /// Activates one step of [`degrees_per_step`][Rotator::degrees_per_step]
    /// in the current direction
    ///
    /// Returns as soon as the command is out; the physical motion completes
    /// later. The tracked angle is updated immediately.
    pub fn activate_step(&mut self) -> Result<(), DriverError> {
        self.send_unaddressed(format_args!("{}", map::ACTIVATE_STEP))?;
        self.state.current_angle += self.state.direction.sign() * self.state.degrees_per_step;
        Ok(())
    }

    /// Activates one step, then sleeps for the estimated motion time
    ///
    /// The estimate is `degrees_per_step / velocity` seconds. There is no
    /// feedback from the controller, so this may under- or over-wait
    /// relative to the true motion time. Use
    /// [`step_and_wait_until_reached`][Rotator::step_and_wait_until_reached]
    /// when the position actually matters.
    pub fn step_and_wait_estimated(&mut self) -> Result<(), DriverError> {
        self.activate_step()?;
        let estimate = self.state.degrees_per_step / self.state.velocity;
        thread::sleep(Duration::from_secs_f64(estimate));
        Ok(())
    }

    /// Activates one step and blocks until the position register reports
    /// the target
    ///
    /// Records the pre-step absolute position, computes the expected target
    /// in raw counts, issues the step and then polls the register every
    /// [`poll_interval`][RotorConfig::poll_interval].
    ///
    /// # Errors
    /// Returns [`DriverError::TimedOut`] once
    /// [`poll_timeout`][RotorConfig::poll_timeout] elapses without the
    /// register converging. The motor may still be moving at that point, a
    /// caller that gives up should issue [`stop`][Rotator::stop].
    pub fn step_and_wait_until_reached(&mut self) -> Result<(), DriverError> {
        let initial = self.read_raw_position()?;
        let offset = self.counts_for(self.state.degrees_per_step);
        let target = match self.state.direction {
            RotationDirection::Clockwise => initial + offset,
            RotationDirection::CounterClockwise => initial - offset,
        };
        self.activate_step()?;
        debug!(initial, target, "waiting for position register");
        let (tolerance, interval, timeout) = (
            self.cfg.position_tolerance,
            self.cfg.poll_interval,
            self.cfg.poll_timeout,
        );
        poll_until(
            || self.read_raw_position(),
            target,
            tolerance,
            interval,
            timeout,
        )
    }

    /// Drives the rotator to its hardware home reference
    ///
    /// Reverses the current direction, force-disables the safety limits and
    /// issues the homing command. The controller's homing is authoritative,
    /// so the tracked angle is reset to zero optimistically rather than
    /// confirmed.
    pub fn go_to_home(&mut self) -> Result<(), DriverError> {
        let reversed = self.state.direction.reversed();
        self.set_direction(reversed)?;
        self.disable_safety_limits()?;
        self.send_unaddressed(format_args!("{}", map::GO_HOME))?;
        self.state.current_angle = 0.0;
        Ok(())
    }

    /// Unconditional stop
    ///
    /// Halts motion and kills the current motion program. Takes no
    /// arguments and performs no validation, so it can be attempted from
    /// any state, including after an error.
    pub fn emergency_stop(&mut self) -> Result<(), DriverError> {
        self.send_unaddressed(format_args!("{}", map::MOTION_HALT))?;
        self.send_unaddressed(format_args!("{}", map::EMERGENCY_STOP))
    }

    /// Controlled stop, the graceful counterpart of
    /// [`emergency_stop`][Rotator::emergency_stop]
    pub fn stop(&mut self) -> Result<(), DriverError> {
        self.send_unaddressed(format_args!("{}", map::MOTION_HALT))?;
        self.send_unaddressed(format_args!("{}", map::SOFT_STOP))
    }

    /// Reads the controller's absolute position in output-shaft degrees
    ///
    /// Queries the hardware encoder count and converts it through
    /// [`degrees_per_motor_rev`][RotorConfig::degrees_per_motor_rev] and the
    /// gearbox ratio. Informational only, never touches
    /// [`current_angle`][Rotator::current_angle].
    pub fn get_absolute_position(&mut self) -> Result<f64, DriverError> {
        let raw = self.read_raw_position()?;
        Ok(parse::to_degrees(
            raw,
            self.cfg.degrees_per_motor_rev,
            self.state.gearbox_ratio,
        ))
    }

    // one serialized query/response pair: discard stale input, request the
    // register, force the controller to emit the response, read the line
    fn read_raw_position(&mut self) -> Result<i64, DriverError> {
        self.drain_input()?;
        self.send_addressed(format_args!("{}", map::POSITION_READ))?;
        self.send_addressed(format_args!("{}", map::FORCE_LINE_FEED))?;
        let line = self.read_line()?;
        Ok(parse::parse_position(&line)?)
    }

    fn counts_for(&self, degrees: f64) -> i64 {
        (degrees * self.cfg.degrees_per_motor_rev as f64 * self.state.gearbox_ratio).round() as i64
    }
}
