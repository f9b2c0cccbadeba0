//! # Error Types
//!
//! Two layers of errors live here. The parser layer ([`Error`] and [`IResult`]) is what the
//! `nom` combinators in this crate produce while picking a sentence apart. The session layer
//! ([`DecodeError`], [`SessionError`], [`UbxError`]) is what callers of
//! [`GnssSession`](crate::GnssSession) and the UBX codec see.
//!
//! A checksum mismatch on an NMEA frame, a missing sentence and a sentence whose validity flag
//! says "no fix" are not session errors: the first is counted and dropped, the other two come
//! back as [`Fix::NoFix`](crate::nmea_content::Fix::NoFix).

use nom::error::{ErrorKind, FromExternalError, ParseError};
use std::{io, str::Utf8Error};

/// Holds the result of parsing functions.
///
/// It depends on the input type `I`, the output type `O`, and the error type `E`
/// (by default `nom::error::Error<I>`).
///
/// The `Ok` side is a pair containing the remainder of the input (the part of the data that
/// was not parsed) and the produced value. The `Err` side contains an instance of `nom::Err`.
pub type IResult<I, O, E = nom::error::Error<I>> = nom::IResult<I, O, Error<I, E>>;

/// Represents all possible errors that can occur while parsing a sentence or one of its fields.
#[derive(Debug, PartialEq)]
pub enum Error<I, E> {
    /// The provided input contains non-ASCII characters.
    ///
    /// NMEA sentences are ASCII-only; the checksum is only defined over ASCII bytes.
    NonAscii,

    /// The checksum of the sentence was corrupt or incorrect.
    ChecksumMismatch {
        /// The checksum calculated from the sentence body
        expected: u8,
        /// The checksum found after the `*`
        found: u8,
    },

    /// The sentence could not be parsed because its format was invalid.
    ParsingError(E),

    /// The address field is not a two character talker followed by a three character
    /// sentence identifier.
    UnrecognizedMessage(I),

    /// A field was present but does not hold a value of the expected type.
    InvalidField(I),
}

impl<I, E> ParseError<I> for Error<I, E>
where
    E: ParseError<I>,
{
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Error::ParsingError(E::from_error_kind(input, kind))
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I, E, EX> FromExternalError<I, EX> for Error<I, E>
where
    E: FromExternalError<I, EX>,
{
    fn from_external_error(input: I, kind: ErrorKind, e: EX) -> Self {
        Error::ParsingError(E::from_external_error(input, kind, e))
    }
}

/// A frame passed its checksum but is not valid UTF-8.
///
/// This points at corruption the XOR checksum could not catch, which is why it is surfaced
/// instead of dropped.
#[derive(Debug, thiserror::Error)]
#[error("sentence of {len} bytes is not valid text")]
pub struct DecodeError {
    /// Length of the offending frame in bytes
    pub len: usize,
    #[source]
    pub source: Utf8Error,
}

/// Errors surfaced by a [`GnssSession`](crate::GnssSession) polling cycle.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A frame could not be decoded, twice in a row when it came out of a retrying refresh.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The byte source returned nothing for more consecutive reads than the configured limit.
    #[error("no data after {reads} consecutive empty reads")]
    Stalled { reads: u32 },

    /// The transport failed.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

/// Errors produced by the UBX packet codec.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UbxError {
    /// The requested navigation rate cannot be expressed as a whole number of milliseconds.
    #[error("navigation rate of {0} Hz is outside 1..=1000")]
    InvalidRate(u16),

    /// The buffer ends before a complete packet.
    #[error("incomplete packet, {needed} more bytes needed")]
    Incomplete { needed: usize },

    /// The checksum bytes do not match the class, id, length and payload.
    #[error("invalid checksum, expected {expected:#06x}, found {found:#06x}")]
    InvalidChecksum { expected: u16, found: u16 },

    /// The payload does not fit the 16-bit length field.
    #[error("payload of {0} bytes does not fit a UBX packet")]
    PayloadTooLong(usize),
}
