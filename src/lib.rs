//! Rust driver for stepper-motor rotator controllers speaking the ASCII
//! `<address><command>\r\n` protocol over a serial line. The driver converts
//! high-level motion requests (direction, step size, velocity, acceleration)
//! into wire commands, tracks the commanded angle in software and can block
//! until a motion completes, either by a time estimate or by polling the
//! controller's absolute-position register.
//!
//! # Usage
//! Each serial port with a connected rotator gets its own [`Rotator`]. The
//! rotator starts out disconnected; [`Rotator::connect`] attaches any
//! `Read + Write` transport, usually a serialport. Setters send their wire
//! command first and only then update the software state, so the two can't
//! silently diverge. [`Rotator::activate_step`] fires a single step of the
//! configured size and returns immediately;
//! [`Rotator::step_and_wait_estimated`] and
//! [`Rotator::step_and_wait_until_reached`] block until the motion should be,
//! respectively is, done.
//!
//! Commands are strictly serialized request/response pairs. The controller
//! has no pipelining, so a response always belongs to the most recent query.
//!
//! # Examples
//! ```no_run
//! use rotator_stepper_driver::{RotationDirection, Rotator, RotorConfig};
//! use std::time::Duration;
//! use serialport;
//!
//! let port = serialport::new("/dev/ttyUSB0", 9600)
//!     .timeout(Duration::from_secs(1))
//!     .open()
//!     .unwrap();
//! let mut rotator = Rotator::new(RotorConfig::default());
//! rotator.connect(port).unwrap();
//!
//! rotator.set_direction(RotationDirection::Clockwise).unwrap();
//! rotator.set_degrees_per_step(15.0).unwrap();
//! rotator.step_and_wait_until_reached().unwrap();
//! println!("rotor angle is now {}°", rotator.current_angle());
//! ```
//!

mod driver;
pub mod easy;
pub(crate) mod util;

pub use driver::{
    cmd::{EchoMode, RotationDirection, SafetyLimitMode},
    parse::ParseError,
    DriverError, Rotator, RotorConfig,
};
