use nom::{
    AsChar, Input, Parser, ToUsize,
    bytes::complete::take,
    character::complete::{char, digit0, digit1},
    combinator::{opt, recognize},
    error::{ErrorKind, ParseError},
};

use crate::{
    Error, IResult, NmeaParse,
    nmea_content::{Coordinate, Hemisphere, Length, MagneticVariation, Parsable, Timestamp},
    parsing::consumed,
};

/// Result of parsing one whole field. The error carries the offending field text.
pub type FieldResult<'a, T> = Result<T, Error<&'a str, nom::error::Error<&'a str>>>;

pub fn with_take<I, E, T, C>(count: C) -> impl Parser<I, Output = T, Error = Error<I, E>>
where
    T: NmeaParse<I, E>,
    I: Input,
    <I as Input>::Item: AsChar,
    E: ParseError<I>,
    C: ToUsize,
{
    take(count).and_then(consumed(T::parse, ErrorKind::Eof))
}

/// Parses a whole field as `T`; an empty field is `None`.
pub fn optional<'a, T>(field: &'a str) -> FieldResult<'a, Option<T>>
where
    T: NmeaParse<&'a str>,
{
    if field.is_empty() {
        return Ok(None);
    }

    consumed(T::parse, ErrorKind::Eof)
        .parse(field)
        .map(|(_, value)| Some(value))
        .map_err(|_| Error::InvalidField(field))
}

/// Parses a whole field as one of the single letter indicators; an empty field is `None`.
pub fn indicator<'a, T: Parsable>(field: &'a str) -> FieldResult<'a, Option<T>> {
    if field.is_empty() {
        return Ok(None);
    }

    consumed(T::parser, ErrorKind::Eof)
        .parse(field)
        .map(|(_, value)| Some(value))
        .map_err(|_| Error::InvalidField(field))
}

/// Parses `DDMM.MMMM` or `DDDMM.MMMM` into decimal degrees.
///
/// The minutes start two digits before the decimal point (or are the last two digits when
/// there is no decimal point); everything before them is whole degrees.
///
/// ```rust
/// use nmea0183_gnss::{IResult, nmea_content::parse::degrees_minutes};
///
/// let result: IResult<_, _> = degrees_minutes("4916.45");
/// let (_, degrees) = result.unwrap();
/// assert!((degrees - 49.274_166_666).abs() < 1e-9);
/// ```
pub fn degrees_minutes(i: &str) -> IResult<&str, f64> {
    let start = i;
    let (rest, whole) = digit1.parse(i)?;
    let (rest, _) = opt((char('.'), digit0)).parse(rest)?;

    if whole.len() < 3 {
        return Err(nom::Err::Error(Error::InvalidField(start)));
    }

    let split = whole.len() - 2;
    let minutes = &start[split..start.len() - rest.len()];
    let (_, degrees) =
        consumed(<u16 as NmeaParse<&str>>::parse, ErrorKind::Digit).parse(&whole[..split])?;
    let (_, minutes) =
        consumed(<f64 as NmeaParse<&str>>::parse, ErrorKind::Float).parse(minutes)?;

    Ok((rest, f64::from(degrees) + minutes / 60.0))
}

/// Combines a degrees/minutes field and the hemisphere field after it.
///
/// Both empty is `None`; one without the other is an invalid field.
pub fn coordinate<'a>(
    value: &'a str,
    hemisphere: &'a str,
) -> FieldResult<'a, Option<Coordinate>> {
    match (value.is_empty(), indicator::<Hemisphere>(hemisphere)?) {
        (true, None) => Ok(None),
        (false, Some(hemisphere)) => {
            let (_, degrees) = consumed(degrees_minutes, ErrorKind::Eof)
                .parse(value)
                .map_err(|_| Error::InvalidField(value))?;
            Ok(Some(Coordinate {
                degrees,
                hemisphere,
            }))
        }
        (true, Some(_)) => Err(Error::InvalidField(value)),
        (false, None) => Err(Error::InvalidField(hemisphere)),
    }
}

/// Parses `hhmmss` or `hhmmss.ss` as a UTC time of day.
///
/// Each of hours, minutes and seconds is exactly two digits. Fractions beyond milliseconds
/// are truncated.
pub fn timestamp(field: &str) -> FieldResult<'_, Option<Timestamp>> {
    if field.is_empty() {
        return Ok(None);
    }

    let parsed: IResult<&str, (u8, u8, u8, Option<&str>)> = consumed(
        (
            with_take(2u8),
            with_take(2u8),
            with_take(2u8),
            opt(recognize((char('.'), digit1))),
        ),
        ErrorKind::Eof,
    )
    .parse(field);
    let Ok((_, (hour, minute, second, fraction))) = parsed else {
        return Err(Error::InvalidField(field));
    };

    // 60 is a leap second
    if hour > 23 || minute > 59 || second > 60 {
        return Err(Error::InvalidField(field));
    }

    let millisecond = fraction
        .map(|fraction| {
            fraction[1..]
                .bytes()
                .chain(core::iter::repeat(b'0'))
                .take(3)
                .fold(0u16, |ms, digit| ms * 10 + u16::from(digit - b'0'))
        })
        .unwrap_or_default();

    Ok(Some(Timestamp {
        hour,
        minute,
        second,
        millisecond,
    }))
}

/// A value field followed by its unit letter, `545.4,M`.
pub fn with_unit<'a>(value: &'a str, unit: &'a str) -> FieldResult<'a, Option<Length>> {
    let Some(value) = optional::<f32>(value)? else {
        return Ok(None);
    };
    let Some(unit) = optional::<char>(unit)? else {
        return Err(Error::InvalidField(unit));
    };

    Ok(Some(Length { value, unit }))
}

/// Magnetic variation and its `E`/`W` letter. Both empty reads as zero degrees.
pub fn magnetic_variation<'a>(
    value: &'a str,
    direction: &'a str,
) -> FieldResult<'a, MagneticVariation> {
    let degrees = optional::<f32>(value)?.unwrap_or_default();

    match indicator::<Hemisphere>(direction)? {
        Some(Hemisphere::North | Hemisphere::South) => Err(Error::InvalidField(direction)),
        hemisphere => Ok(MagneticVariation {
            degrees,
            direction: hemisphere,
        }),
    }
}
