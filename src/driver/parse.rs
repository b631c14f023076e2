
use nom::{
    bytes::complete::take, character::complete::i64 as parse_i64, sequence::preceded, Finish,
    IResult,
};
use std::fmt::Debug;
use thiserror::Error;

/// Gets thrown when a response line from the controller can't be interpreted
#[derive(Error, Debug)]
pub enum ParseError<I: Debug> {
    /// The controller sent an empty line
    #[error("response line was empty")]
    EmptyResponse,
    /// There were leftover bytes after the numeric payload
    #[error("non-empty remainder after parsing")]
    NonEmptyRemainder,
    /// Wrapper around [`nom::error::Error`]
    #[error("nom error: {0:?}")]
    NomError(nom::error::Error<I>),
}

impl<I: Debug> nom::error::ParseError<I> for ParseError<I> {
    fn from_error_kind(input: I, kind: nom::error::ErrorKind) -> Self {
        Self::NomError(nom::error::Error::from_error_kind(input, kind))
    }

    /// basically copied from nom::error::Error::append
    fn append(_: I, _: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I: Debug> From<nom::error::Error<I>> for ParseError<I> {
    fn from(e: nom::error::Error<I>) -> Self {
        Self::NomError(e)
    }
}

impl From<ParseError<&[u8]>> for ParseError<Vec<u8>> {
    fn from(e: ParseError<&[u8]>) -> Self {
        match e {
            ParseError::EmptyResponse => ParseError::EmptyResponse,
            ParseError::NonEmptyRemainder => ParseError::NonEmptyRemainder,
            ParseError::NomError(e) => ParseError::NomError(nom::error::Error {
                input: e.input.to_vec(),
                code: e.code,
            }),
        }
    }
}

// the controller prefixes the numeric payload with one status/address
// character which carries no positional information
fn position_payload(s: &[u8]) -> IResult<&[u8], i64, ParseError<&[u8]>> {
    preceded(take(1usize), parse_i64)(s)
}

/// Parses a position response of the form `<char><signed integer>`
///
/// Exactly the first character is stripped, the remainder must be a signed
/// integer with nothing trailing.
pub(crate) fn parse_position(line: &[u8]) -> Result<i64, ParseError<Vec<u8>>> {
    if line.is_empty() {
        return Err(ParseError::EmptyResponse);
    }
    let (remainder, raw) = position_payload(line).finish()?;
    if !remainder.is_empty() {
        return Err(ParseError::NonEmptyRemainder);
    }
    Ok(raw)
}

/// Converts a raw encoder count to output-shaft degrees
pub(crate) fn to_degrees(raw: i64, degrees_per_motor_rev: i64, gearbox_ratio: f64) -> f64 {
    raw as f64 / (degrees_per_motor_rev as f64 * gearbox_ratio)
}
