//! One-call conveniences composing the primitive [`Rotator`] operations
//!
//! These are plain free functions, not part of the driver's state machine.
//! They exist for scripts and quick bring-up; anything beyond a single
//! rotation should talk to [`Rotator`] directly.

use crate::{DriverError, RotationDirection, Rotator, RotorConfig};
use std::{
    io::{Read, Write},
    thread,
};

/// Applies the default setup and performs a single step of `degrees` in
/// `direction`
///
/// Velocity and acceleration are set to 10, the requested direction and
/// step size are applied, the safety limits are disabled and one step is
/// activated. Consecutive commands are separated by the configured
/// [`command_settle`][RotorConfig::command_settle] delay, the controller
/// needs processing time between commands.
pub fn rotate<I: Read + Write>(
    rotator: &mut Rotator<I>,
    direction: RotationDirection,
    degrees: f64,
) -> Result<(), DriverError> {
    let settle = rotator.config().command_settle;
    rotator.set_velocity(10.0)?;
    thread::sleep(settle);
    rotator.set_acceleration(10.0)?;
    thread::sleep(settle);
    rotator.set_direction(direction)?;
    thread::sleep(settle);
    rotator.set_degrees_per_step(degrees)?;
    thread::sleep(settle);
    rotator.disable_safety_limits()?;
    thread::sleep(settle);
    rotator.activate_step()
}

/// Connects, rotates clockwise by `degrees` and hands the transport back
pub fn easy_rotate_cw<I: Read + Write>(
    interface: I,
    cfg: RotorConfig,
    degrees: f64,
) -> Result<I, DriverError> {
    easy_rotate(interface, cfg, RotationDirection::Clockwise, degrees)
}

/// Connects, rotates counterclockwise by `degrees` and hands the transport
/// back
pub fn easy_rotate_ccw<I: Read + Write>(
    interface: I,
    cfg: RotorConfig,
    degrees: f64,
) -> Result<I, DriverError> {
    easy_rotate(interface, cfg, RotationDirection::CounterClockwise, degrees)
}

fn easy_rotate<I: Read + Write>(
    interface: I,
    cfg: RotorConfig,
    direction: RotationDirection,
    degrees: f64,
) -> Result<I, DriverError> {
    let mut rotator = Rotator::new(cfg);
    rotator.connect(interface)?;
    rotate(&mut rotator, direction, degrees)?;
    rotator.disconnect()
}
