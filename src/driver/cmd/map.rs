//! Provides bindings for the individual command mnemonics

macro_rules! makepl {
    ($($name:ident, $val:literal),*) => {
        $(pub const $name: &str = $val;)*
    };
}

#[rustfmt::skip]
makepl!(
    SET_ACCELERATION, "A",
    SET_VELOCITY, "V",
    SET_STEP_SIZE, "D",
    SET_DIRECTION, "H",
    ACTIVATE_STEP, "G",
    MOTION_HALT, "MN",
    EMERGENCY_STOP, "K",
    SOFT_STOP, "S",
    SAFETY_LIMITS, "LD",
    ECHO_MODE, "EM",
    SYSTEM_RESET, "Z",
    POSITION_ZERO, "PZ",
    POSITION_READ, "PR",
    FORCE_LINE_FEED, "LF",
    GO_HOME, "GH-2"
);
