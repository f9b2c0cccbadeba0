use nom::{
    AsBytes, AsChar, Compare, Input, Offset, ParseTo, Parser, character::complete::anychar,
    combinator::opt, error::ParseError,
};

use crate::IResult;

/// Trait for parsing values out of a single NMEA 0183 field.
///
/// Implementations are provided for the unsigned integers, `f32`, `f64`, `char` and
/// `Option<T>`. The field helpers in [`nmea_content`](crate::nmea_content) build on it.
///
/// ```rust
/// use nmea0183_gnss::{IResult, NmeaParse};
///
/// let result: IResult<_, _> = u8::parse("42");
/// assert_eq!(result, Ok(("", 42)));
///
/// let result: IResult<_, _> = Option::<u8>::parse("");
/// assert_eq!(result, Ok(("", None)));
///
/// let result: IResult<_, _> = f32::parse("1.25,M");
/// assert_eq!(result, Ok((",M", 1.25)));
/// ```
pub trait NmeaParse<I, E = nom::error::Error<I>>
where
    I: Input,
    E: ParseError<I>,
    Self: Sized,
{
    /// Parses a value from the front of the input, returning the rest.
    fn parse(i: I) -> IResult<I, Self, E>;
}

macro_rules! impl_uints_type {
    ($($t:tt),*) => ($(
        impl<I, E> NmeaParse<I, E> for $t
        where
            I: Input,
            <I as Input>::Item: AsChar,
            E: ParseError<I>,
        {
            fn parse(i: I) -> IResult<I, Self, E> {
                nom::character::complete::$t.parse(i)
            }
        }
    )*)
}

impl_uints_type!(u8, u16, u32);

macro_rules! impl_float_type {
    ($($t:ty, $p:ident),*) => ($(
        impl<I, E> NmeaParse<I, E> for $t
        where
            I: Input + Offset + ParseTo<$t> + AsBytes,
            I: Compare<&'static str> + for<'a> Compare<&'a [u8]>,
            <I as Input>::Item: AsChar,
            <I as Input>::Iter: Clone,
            E: ParseError<I>,
        {
            fn parse(i: I) -> IResult<I, Self, E> {
                nom::number::complete::$p.parse(i)
            }
        }
    )*)
}

impl_float_type!(f32, float, f64, double);

impl<I, E> NmeaParse<I, E> for char
where
    I: Input,
    <I as Input>::Item: AsChar,
    E: ParseError<I>,
{
    fn parse(i: I) -> IResult<I, Self, E> {
        anychar.parse(i)
    }
}

impl<T, I, E> NmeaParse<I, E> for Option<T>
where
    T: NmeaParse<I, E>,
    I: Input,
    E: ParseError<I>,
{
    fn parse(i: I) -> IResult<I, Self, E> {
        opt(T::parse).parse(i)
    }
}

#[cfg(test)]
mod tests {
    use crate::{IResult, NmeaParse};

    #[test]
    fn test_parse_numbers() {
        let result: IResult<_, _> = u16::parse("0815");
        assert_eq!(result, Ok(("", 815)));

        let result: IResult<_, _> = f64::parse("4916.45");
        assert_eq!(result, Ok(("", 4916.45)));

        let result: IResult<_, _> = Option::<f32>::parse("x");
        assert_eq!(result, Ok(("x", None)));

        let result: IResult<_, u8> = u8::parse("A");
        assert!(result.is_err());
    }
}
