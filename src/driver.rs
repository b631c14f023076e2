#[cfg(test)]
mod tests;

pub mod cmd;
pub mod parse;
mod poll;
mod rotor;

use self::parse::ParseError;
use crate::util::ensure;
use std::{
    fmt::Arguments,
    io::{self, BufRead, BufReader, Read, Write},
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, trace, warn};

pub use self::rotor::RotorConfig;
pub(crate) use self::rotor::RotorState;

//

/// Errors returned by any part of the driver
#[derive(Error, Debug)]
pub enum DriverError {
    /// Thrown by any operation that needs the serial link while no transport
    /// is attached
    #[error("no transport connected")]
    NotConnected,
    /// Thrown by [`Rotator::connect`] if a transport is already attached
    #[error("a transport is already connected")]
    AlreadyConnected,
    /// Thrown by a setter if the argument didn't match the requirements of
    /// the command
    #[error("invalid value for command argument")]
    InvalidArgument,
    /// Thrown by [`Rotator::step_and_wait_until_reached`] if the position
    /// register didn't converge on the target in time. The motor may well
    /// still be moving, so consider issuing [`Rotator::stop`].
    #[error("position {target} not reached within {timeout:?}")]
    TimedOut {
        /// The absolute position that was being waited for, in raw counts
        target: i64,
        /// The bound that was exceeded
        timeout: Duration,
    },
    /// Wrapper around [`io::Error`]
    #[error(transparent)]
    IoError(#[from] io::Error),
    /// Wrapper around [`ParseError`]
    #[error("{0}")]
    ParsingError(#[from] ParseError<Vec<u8>>),
}

//

/// Drives a single rotator controller attached to a serial line
///
/// `I` is the interface used to actually communicate with the controller,
/// usually a serialport. Since the controller can take a while to reply,
/// especially while moving, the timeout of `I` (if there is one) should be
/// set to something sensible and big.
///
/// A rotator is created disconnected and becomes usable once a transport is
/// attached with [`connect`][Rotator::connect]. [`disconnect`][Rotator::disconnect]
/// hands the transport back, so closing the port stays under the caller's
/// control. Every operation that touches the wire fails with
/// [`DriverError::NotConnected`] while no transport is attached, and leaves
/// the software state untouched.
///
/// The protocol is strictly one command, at most one response, in order.
/// All operations take `&mut self`, which also rules out issuing a command
/// while a blocking wait is still in progress.
///
/// # Examples
/// ```no_run
/// use rotator_stepper_driver::{RotationDirection, Rotator, RotorConfig};
/// use std::time::Duration;
/// use serialport;
///
/// let port = serialport::new("/dev/ttyUSB0", 9600)
///     .timeout(Duration::from_secs(1))
///     .open()
///     .unwrap();
/// let mut rotator = Rotator::new(RotorConfig::default());
/// rotator.connect(port).unwrap();
/// rotator.set_direction(RotationDirection::CounterClockwise).unwrap();
/// rotator.activate_step().unwrap();
/// ```
#[derive(Debug)]
pub struct Rotator<I: Read + Write> {
    // wrapped in a BufReader so receiving until '\n' is easier. writes go
    // through get_mut, which keeps a single owner for the interface
    link: Option<BufReader<I>>,
    cfg: RotorConfig,
    state: RotorState,
}

impl<I: Read + Write> Rotator<I> {
    /// Returns a new, disconnected rotator with the given configuration
    pub fn new(cfg: RotorConfig) -> Self {
        let state = RotorState::initial(&cfg);
        Rotator {
            link: None,
            cfg,
            state,
        }
    }

    /// Attaches the transport the rotator talks through
    ///
    /// # Errors
    /// Returns [`DriverError::AlreadyConnected`] if a transport is already
    /// attached. Disconnect first to swap ports.
    pub fn connect(&mut self, interface: I) -> Result<(), DriverError> {
        ensure!(self.link.is_none(), DriverError::AlreadyConnected);
        self.link = Some(BufReader::new(interface));
        Ok(())
    }

    /// Detaches and returns the transport
    ///
    /// # Errors
    /// Returns [`DriverError::NotConnected`] if there is nothing to detach.
    pub fn disconnect(&mut self) -> Result<I, DriverError> {
        self.link
            .take()
            .map(BufReader::into_inner)
            .ok_or(DriverError::NotConnected)
    }

    /// Whether a transport is currently attached
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// The configuration this rotator was created with
    pub fn config(&self) -> &RotorConfig {
        &self.cfg
    }

    // sends `{body}\r\n`
    pub(crate) fn send_unaddressed(&mut self, args: Arguments<'_>) -> Result<(), DriverError> {
        let link = self.link.as_mut().ok_or(DriverError::NotConnected)?;
        debug!(command = %args, "sending");
        let iface = link.get_mut();
        write!(iface, "{}\r\n", args)?;
        iface.flush()?;
        Ok(())
    }

    // sends `{address}{body}\r\n`
    pub(crate) fn send_addressed(&mut self, args: Arguments<'_>) -> Result<(), DriverError> {
        let address = self.state.controller_address;
        self.send_unaddressed(format_args!("{}{}", address, args))
    }

    // reads one response line and strips the terminator. the controller
    // terminates with \r\n but a bare \n is tolerated
    pub(crate) fn read_line(&mut self) -> Result<Vec<u8>, DriverError> {
        let link = self.link.as_mut().ok_or(DriverError::NotConnected)?;
        // size chosen more or less randomly, responses are short
        let mut buf = Vec::with_capacity(16);
        link.read_until(b'\n', &mut buf)?;
        if buf.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "link closed before a response line arrived",
            )
            .into());
        }
        while matches!(buf.last(), Some(&b'\r') | Some(&b'\n')) {
            buf.pop();
        }
        trace!(line = ?buf, "received");
        Ok(buf)
    }

    // discards buffered but unread input so the next response read belongs
    // to the next query. bytes still sitting in the OS buffer are the
    // transport's concern
    pub(crate) fn drain_input(&mut self) -> Result<(), DriverError> {
        let link = self.link.as_mut().ok_or(DriverError::NotConnected)?;
        let n = link.buffer().len();
        if n > 0 {
            warn!(discarded = n, "unread response bytes discarded");
            link.consume(n);
        }
        Ok(())
    }
}
