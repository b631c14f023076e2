
pub(crate) mod map;

use std::fmt::Display;

//

/// Direction the output shaft turns when a step is activated
///
/// The wire form is the sign appended to the `H` command, `H+` for clockwise
/// and `H-` for counterclockwise.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    /// The opposite direction
    pub fn reversed(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }

    // sign applied to the tracked angle when a step is activated
    pub(crate) fn sign(self) -> f64 {
        match self {
            Self::Clockwise => 1.0,
            Self::CounterClockwise => -1.0,
        }
    }
}

impl Display for RotationDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clockwise => write!(f, "+"),
            Self::CounterClockwise => write!(f, "-"),
        }
    }
}

//

/// Binding for values of the `LD` safety-limit command
///
/// The controller refuses motion past its limit switches unless the limits
/// are disabled, which homing requires.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum SafetyLimitMode {
    Enabled = 0,
    Disabled = 3,
}

impl Display for SafetyLimitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

//

/// Binding for values of the `EM` echo command
///
/// With echo on, the controller repeats every received command on the line,
/// which is useful on a terminal and noise for a driver.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum EchoMode {
    Off = 0,
    On = 1,
}

impl Display for EchoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as u8)
    }
}
