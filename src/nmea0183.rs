//! # NMEA 0183 Sentence Framing
//!
//! This module holds the NMEA half of the checksum engine and the `nom` parser that splits a
//! decoded sentence of the form `$HHHHH,D1,D2,...,Dn*CC\r\n` into its checksum, its line ending
//! and its content.
//!
//! The decoder in [`sentence`](crate::sentence) gates every frame with [`checksum_valid`]
//! on the raw bytes first, and only frames that pass are decoded to text and handed to the
//! [`nmea0183`] parser.

use nom::{
    AsBytes, AsChar, Compare, Err, FindSubstring, Input, Parser,
    branch::alt,
    bytes::complete::{tag, take, take_until},
    character::complete::{char, hex_digit0},
    combinator::{opt, rest},
    error::{ErrorKind, ParseError},
    number::complete::hex_u32,
};

use crate::{Error, IResult, parsing::consumed};

type NmeaParser<'a, I, O, E> = dyn FnMut(I) -> IResult<I, O, E> + 'a;

/// Defines how the parser should handle the `*CC` checksum field.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum ChecksumMode {
    /// Checksum is required and must match the sentence body.
    #[default]
    Required,

    /// Checksum may be omitted, but is validated when present.
    Optional,
}

/// Defines how the parser should handle the line ending.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum LineEndingMode {
    /// The sentence must end with `\r\n`.
    Required,

    /// The sentence must not end with `\r\n`.
    Forbidden,

    /// The sentence may end with `\r\n`, with a bare `\n`, or with nothing.
    ///
    /// This matches what the [`Framer`](crate::Framer) hands over: everything up to and
    /// including the first `\n`, whether or not the receiver sent the `\r`.
    #[default]
    Lenient,
}

/// Creates a configurable NMEA 0183 parser factory.
///
/// The factory handles the framing (leading `$`, checksum, line ending) and hands the
/// sentence content, everything between `$` and `*`, to the parser it is given.
///
/// # Examples
///
/// ```rust
/// use nmea0183_gnss::{ChecksumMode, IResult, LineEndingMode, nmea0183};
/// use nom::Parser;
///
/// fn content_parser(i: &str) -> IResult<&str, bool> {
///     Ok((i, true))
/// }
///
/// let mut strict = nmea0183(ChecksumMode::Required, LineEndingMode::Required)(content_parser);
/// assert!(strict.parse("$GPGGA,data*6A\r\n").is_ok());
/// assert!(strict.parse("$GPGGA,data*6A").is_err());
/// assert!(strict.parse("$GPGGA,data\r\n").is_err());
///
/// let mut lenient = nmea0183(ChecksumMode::Required, LineEndingMode::Lenient)(content_parser);
/// assert!(lenient.parse("$GPGGA,data*6A\r\n").is_ok());
/// assert!(lenient.parse("$GPGGA,data*6A\n").is_ok());
/// assert!(lenient.parse("$GPGGA,data*6B\n").is_err());
/// ```
pub fn nmea0183<'a, I, O, F, E>(
    cc: ChecksumMode,
    le: LineEndingMode,
) -> impl Fn(F) -> Box<NmeaParser<'a, I, O, E>>
where
    I: Input + AsBytes + Compare<&'a str> + FindSubstring<&'a str> + 'a,
    <I as Input>::Item: AsChar,
    O: 'a,
    F: Parser<I, Output = O, Error = Error<I, E>> + 'a,
    E: ParseError<I> + 'a,
{
    move |f: F| Box::new(nmea0183_inner(f, checksum_crlf(cc, le)))
}

/// Creates a parser for the tail of a sentence: the optional `*CC` and the line ending.
///
/// Returns the checksum value, or [`None`] when no checksum is present and `cc` allows that.
///
/// ```rust
/// use nmea0183_gnss::{ChecksumMode, IResult, LineEndingMode, checksum_crlf};
/// use nom::Parser;
///
/// let mut parser = checksum_crlf(ChecksumMode::Required, LineEndingMode::Lenient);
/// let result: IResult<_, _> = parser.parse("*51\n");
/// assert_eq!(result, Ok(("", Some(0x51))));
/// ```
pub fn checksum_crlf<'a, I, E: ParseError<I>>(
    cc: ChecksumMode,
    le: LineEndingMode,
) -> impl FnMut(I) -> nom::IResult<I, Option<u8>, E>
where
    I: Input + AsBytes + Compare<&'a str> + FindSubstring<&'a str>,
    <I as Input>::Item: AsChar,
{
    move |i: I| {
        let (i, _) = crlf::<I, E>(le).parse(i)?;

        let (cc, parse_cc) = match cc {
            ChecksumMode::Required => char::<I, E>('*').map(|_| true).parse(i)?,
            ChecksumMode::Optional => opt(char::<I, E>('*'))
                .map(|parse_cc| parse_cc.is_some())
                .parse(i)?,
        };

        if parse_cc {
            let (_, cc) = consumed(take::<_, I, E>(2u8), ErrorKind::Count).parse(cc)?;
            let (_, cc) = consumed(hex_digit0::<I, E>, ErrorKind::IsA).parse(cc)?;

            hex_u32::<I, E>.map(|cc| Some(cc as u8)).parse(cc)
        } else if cc.input_len() != 0 {
            Err(Err::Error(E::from_error_kind(cc, ErrorKind::Count)))
        } else {
            Ok((cc, None))
        }
    }
}

/// Strips the line ending according to `le` and returns what came before it.
///
/// ```rust
/// use nmea0183_gnss::{IResult, LineEndingMode, crlf};
/// use nom::Parser;
///
/// let result: IResult<_, _> = crlf(LineEndingMode::Required).parse("data\r\n");
/// assert_eq!(result, Ok(("data", ())));
///
/// let result: IResult<_, _> = crlf(LineEndingMode::Lenient).parse("data\n");
/// assert_eq!(result, Ok(("data", ())));
/// ```
pub fn crlf<'a, I, E: ParseError<I>>(le: LineEndingMode) -> impl Fn(I) -> nom::IResult<I, (), E>
where
    I: Input + Compare<&'a str> + FindSubstring<&'a str>,
{
    move |i: I| {
        let (i, data) = opt(take_until::<_, I, E>("\r\n")).parse(i)?;

        match (le, data) {
            (LineEndingMode::Required | LineEndingMode::Lenient, Some(data)) => {
                let (_, _) = consumed(tag::<_, I, E>("\r\n"), ErrorKind::CrLf).parse(i)?;
                Ok((data, ()))
            }
            (LineEndingMode::Required, None) | (LineEndingMode::Forbidden, Some(_)) => {
                Err(Err::Error(E::from_error_kind(i, ErrorKind::CrLf)))
            }
            (LineEndingMode::Forbidden, None) => Ok((i, ())),
            (LineEndingMode::Lenient, None) => {
                let (i, data) = opt(take_until::<_, I, E>("\n")).parse(i)?;
                match data {
                    Some(data) => {
                        let (_, _) = consumed(tag::<_, I, E>("\n"), ErrorKind::CrLf).parse(i)?;
                        Ok((data, ()))
                    }
                    None => Ok((i, ())),
                }
            }
        }
    }
}

/// Calculates the NMEA 0183 checksum: the XOR of every byte between `$` and `*`.
///
/// The input is returned unchanged alongside the checksum.
///
/// ```rust
/// use nmea0183_gnss::checksum;
///
/// let (_, cc) = checksum("GPGGA,123456,data");
/// assert_eq!(cc, 0x41);
/// ```
pub fn checksum<I>(input: I) -> (I, u8)
where
    I: Input + AsBytes,
{
    let calculated_checksum = input
        .as_bytes()
        .iter()
        .fold(0u8, |accumulated_xor, &byte| accumulated_xor ^ byte);

    (input, calculated_checksum)
}

/// Formats a checksum value as a two-digit uppercase hexadecimal string.
///
/// ```rust
/// use nmea0183_gnss::format_checksum;
///
/// assert_eq!(format_checksum(0x41), "41");
/// assert_eq!(format_checksum(0x0A), "0A");
/// ```
pub fn format_checksum(checksum: u8) -> String {
    format!("{checksum:02X}")
}

/// Verifies the checksum of a raw sentence, byte for byte.
///
/// The XOR of everything strictly between the leading `$` and the first `*` is formatted as
/// two uppercase hex digits and compared with the two bytes after the `*`. A sentence without
/// a `*`, without a leading `$`, or with fewer than two bytes after the `*` is not valid.
///
/// ```rust
/// use nmea0183_gnss::checksum_valid;
///
/// assert!(checksum_valid(b"$GPGGA,123456,data*41\r\n"));
/// assert!(!checksum_valid(b"$GPGGA,123456,data*42\r\n"));
/// assert!(!checksum_valid(b"$GPGGA,123456,data*4"));
/// assert!(!checksum_valid(b"$GPGGA,123456,data\r\n"));
/// ```
pub fn checksum_valid(sentence: &[u8]) -> bool {
    if sentence.first() != Some(&b'$') {
        return false;
    }

    let Some(star) = sentence.iter().position(|&b| b == b'*') else {
        return false;
    };

    let (Some(body), Some(found)) = (sentence.get(1..star), sentence.get(star + 1..star + 3))
    else {
        return false;
    };

    let (_, calculated) = checksum(body);
    format_checksum(calculated).as_bytes() == found
}

/// Internal implementation of the NMEA 0183 parser.
///
/// 1. Rejects non-ASCII input
/// 2. Expects the sentence to start with `$`
/// 3. Splits the content from the `*CC` and line ending
/// 4. Validates the checksum against the content when one is present
/// 5. Runs the content parser
fn nmea0183_inner<'a, I, O, F, CC, E>(
    mut f: F,
    mut cc_parser: CC,
) -> impl FnMut(I) -> IResult<I, O, E>
where
    I: Input + AsBytes + Compare<&'a str> + FindSubstring<&'a str>,
    <I as Input>::Item: AsChar,
    F: Parser<I, Output = O, Error = Error<I, E>>,
    CC: Parser<I, Output = Option<u8>, Error = Error<I, E>>,
    E: ParseError<I>,
{
    move |i: I| {
        if !i.as_bytes().is_ascii() {
            return Err(nom::Err::Error(Error::NonAscii));
        }

        let (i, _) = char::<I, Error<I, E>>('$').parse(i)?;

        let (cc, data) = alt((
            take_until::<_, I, Error<I, E>>("*"),
            take_until("\r\n"),
            take_until("\n"),
            rest,
        ))
        .parse(i)?;
        let (_, cc) = cc_parser.parse(cc)?;

        let (data, calc_cc) = checksum(data);

        if let Some(cc) = cc
            && cc != calc_cc
        {
            return Err(nom::Err::Error(Error::ChecksumMismatch {
                expected: calc_cc,
                found: cc,
            }));
        }

        f.parse(data)
    }
}
