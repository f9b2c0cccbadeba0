//! # NMEA Content
//!
//! Typed views over stored sentences and the extractors that turn them into fixes.
//!
//! The extractors never fail. A sentence that has not arrived yet, a sentence whose validity
//! flag says the receiver has no solution, and a sentence whose fields cannot be read all come
//! back as [`Fix::NoFix`]; the last case is also logged as a warning.
//!
//! ```rust
//! use nmea0183_gnss::{
//!     Decoded, RawSentence, SentenceStore, decode,
//!     nmea_content::{Fix, position},
//! };
//!
//! let mut store = SentenceStore::new();
//! let raw = RawSentence::try_from(&b"$GPGLL,4916.45,N,12311.12,W,225444,A,A*5C\r\n"[..]).unwrap();
//! if let Decoded::Sentence(sentence) = decode(&raw).unwrap() {
//!     store.insert(sentence);
//! }
//!
//! let Fix::Fix(position) = position(&store, 2.5) else { panic!("no fix") };
//! assert_eq!(position.time.unwrap().to_string(), "22:54:44");
//! assert!(position.longitude.signed() < 0.0);
//! assert_eq!(position.horizontal_error, None);
//! ```

use core::fmt;

use log::warn;
use nom::Parser;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{IResult, SentenceId, SentenceStore};

pub mod parse;
pub mod sentences;

pub use sentences::{GGA, GLL, GSA, RMC};

/// Converts a combined 1-sigma error into a ~95% confidence radius.
pub const CONFIDENCE_95: f32 = 2.45;

/// A trait for types that can be parsed from a string input.
///
/// Implemented by the single letter indicators found in sentence fields, such as
/// [`Status`] and [`Quality`].
pub trait Parsable: Sized {
    /// Parses the input and returns a result.
    ///
    /// On success the result holds the unparsed rest of the input and the parsed value.
    fn parser(input: &str) -> IResult<&str, Self>;
}

macro_rules! parsable_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $char:literal => $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl Parsable for $name {
            fn parser(i: &str) -> IResult<&str, Self> {
                nom::branch::alt(($(
                    nom::character::complete::char($char).map(|_| Self::$variant),
                )*)).parse(i)
            }
        }
    };
}

parsable_enum! {
    /// Status Mode Indicator
    pub enum Status {
        /// A - Valid
        'A' => Valid,
        /// V - Invalid
        'V' => Invalid,
    }
}

parsable_enum! {
    /// Quality of the GPS fix
    pub enum Quality {
        /// 0 - Fix not available
        '0' => NoFix,
        /// 1 - GPS fix
        '1' => GPSFix,
        /// 2 - Differential GPS fix
        '2' => DGPSFix,
        /// 3 - PPS fix
        '3' => PPSFix,
        /// 4 - Real Time Kinematic
        '4' => RTK,
        /// 5 - Float RTK
        '5' => FloatRTK,
        /// 6 - estimated (dead reckoning)
        '6' => Estimated,
        /// 7 - Manual input mode
        '7' => Manual,
        /// 8 - Simulation mode
        '8' => Simulation,
    }
}

parsable_enum! {
    /// Hemisphere letter following a coordinate or a magnetic variation
    pub enum Hemisphere {
        /// N - North
        'N' => North,
        /// S - South
        'S' => South,
        /// E - East
        'E' => East,
        /// W - West
        'W' => West,
    }
}

parsable_enum! {
    /// Selection Mode
    pub enum SelectionMode {
        /// A - Automatic, 2D/3D
        'A' => Automatic,
        /// M - Manual, forced to operate in 2D or 3D
        'M' => Manual,
    }
}

parsable_enum! {
    /// Fix Mode
    pub enum FixMode {
        /// 1 - No fix
        '1' => NoFix,
        /// 2 - 2D Fix
        '2' => Fix2D,
        /// 3 - 3D Fix
        '3' => Fix3D,
    }
}

/// Either a solution or the "no fix" sentinel.
///
/// `NoFix` is not an error. It covers a sentence that never arrived as well as one whose
/// validity flag says the receiver has no solution; callers cannot tell the two apart.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub enum Fix<T> {
    NoFix,
    Fix(T),
}

impl<T> Fix<T> {
    pub fn is_fix(&self) -> bool {
        matches!(self, Fix::Fix(_))
    }

    pub fn as_ref(&self) -> Fix<&T> {
        match self {
            Fix::NoFix => Fix::NoFix,
            Fix::Fix(value) => Fix::Fix(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fix<U> {
        match self {
            Fix::NoFix => Fix::NoFix,
            Fix::Fix(value) => Fix::Fix(f(value)),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Fix::NoFix => None,
            Fix::Fix(value) => Some(value),
        }
    }
}

impl<T> From<Option<T>> for Fix<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Fix::NoFix, Fix::Fix)
    }
}

/// Unsigned decimal degrees and the hemisphere letter they were sent with.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub degrees: f64,
    pub hemisphere: Hemisphere,
}

impl Coordinate {
    /// Degrees with south and west folded into a negative sign.
    pub fn signed(&self) -> f64 {
        match self.hemisphere {
            Hemisphere::North | Hemisphere::East => self.degrees,
            Hemisphere::South | Hemisphere::West => -self.degrees,
        }
    }
}

/// UTC time of day as sent by the receiver.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub hour: u8,
    pub minute: u8,
    /// 0..=60, 60 being a leap second
    pub second: u8,
    pub millisecond: u16,
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.millisecond != 0 {
            write!(f, ".{:03}", self.millisecond)?;
        }
        Ok(())
    }
}

#[cfg(feature = "time")]
impl TryFrom<Timestamp> for time::Time {
    type Error = time::error::ComponentRange;

    fn try_from(value: Timestamp) -> Result<Self, Self::Error> {
        time::Time::from_hms_milli(value.hour, value.minute, value.second, value.millisecond)
    }
}

/// A measurement and the unit letter that followed it, `545.4,M`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: char,
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Magnetic variation in degrees. `direction` is `None` when the receiver left both fields
/// empty, which reads as zero.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MagneticVariation {
    pub degrees: f32,
    pub direction: Option<Hemisphere>,
}

impl fmt::Display for MagneticVariation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(Hemisphere::East) => write!(f, "{}E", self.degrees),
            Some(Hemisphere::West) => write!(f, "{}W", self.degrees),
            _ => write!(f, "{}", self.degrees),
        }
    }
}

/// Horizontal position from GLL.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub time: Option<Timestamp>,
    /// HDOP times the device accuracy, in meters. `None` without a GSA sentence.
    pub horizontal_error: Option<f32>,
}

/// Ground speed and track from RMC.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Velocity {
    /// Knots
    pub speed_over_ground: Option<f32>,
    /// Degrees true, `None` when the receiver sent nothing (typically while stationary)
    pub course_over_ground: Option<f32>,
    pub magnetic_variation: MagneticVariation,
    pub time: Option<Timestamp>,
}

/// Height information from GGA.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Altitude {
    /// Above mean sea level
    pub altitude: Option<Length>,
    /// Geoid above the WGS-84 ellipsoid, negative when below
    pub geoid_separation: Option<Length>,
    /// VDOP times the device accuracy, in meters. `None` without a GSA sentence.
    pub vertical_error: Option<f32>,
    pub satellites_in_use: Option<u8>,
    pub quality: Quality,
    pub time: Option<Timestamp>,
}

/// Position, velocity and altitude read from the same refresh cycle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct FusedFix {
    pub position: Fix<Position>,
    pub velocity: Fix<Velocity>,
    pub altitude: Fix<Altitude>,
    /// `2.45 × sqrt(h² + v²)`, only when position and altitude both carry an error estimate
    pub error_3d: Option<f32>,
}

/// Reads the position out of the stored GLL, and its horizontal error out of GSA.
pub fn position(store: &SentenceStore, device_accuracy_m: f32) -> Fix<Position> {
    let Some(sentence) = store.get(SentenceId::GLL) else {
        return Fix::NoFix;
    };
    if GLL::status(sentence) != Some(Status::Valid) {
        return Fix::NoFix;
    }

    let gll = match GLL::from_sentence(sentence) {
        Ok(gll) => gll,
        Err(e) => {
            warn!("valid GLL with unreadable fields: {e:?}");
            return Fix::NoFix;
        }
    };
    let (Some(latitude), Some(longitude)) = (gll.latitude, gll.longitude) else {
        warn!("valid GLL without a position");
        return Fix::NoFix;
    };

    Fix::Fix(Position {
        latitude,
        longitude,
        time: gll.time,
        horizontal_error: dop(store, |gsa| gsa.hdop).map(|hdop| hdop * device_accuracy_m),
    })
}

/// Reads speed, course and magnetic variation out of the stored RMC.
pub fn velocity(store: &SentenceStore) -> Fix<Velocity> {
    let Some(sentence) = store.get(SentenceId::RMC) else {
        return Fix::NoFix;
    };
    if RMC::status(sentence) != Some(Status::Valid) {
        return Fix::NoFix;
    }

    match RMC::from_sentence(sentence) {
        Ok(rmc) => Fix::Fix(Velocity {
            speed_over_ground: rmc.speed_over_ground,
            course_over_ground: rmc.course_over_ground,
            magnetic_variation: rmc.magnetic_variation,
            time: rmc.time,
        }),
        Err(e) => {
            warn!("valid RMC with unreadable fields: {e:?}");
            Fix::NoFix
        }
    }
}

/// Reads the altitude out of the stored GGA, and its vertical error out of GSA.
pub fn altitude(store: &SentenceStore, device_accuracy_m: f32) -> Fix<Altitude> {
    let Some(sentence) = store.get(SentenceId::GGA) else {
        return Fix::NoFix;
    };
    match GGA::quality(sentence) {
        None | Some(Quality::NoFix) => return Fix::NoFix,
        Some(_) => {}
    }

    match GGA::from_sentence(sentence) {
        Ok(gga) => Fix::Fix(Altitude {
            altitude: gga.altitude,
            geoid_separation: gga.geoid_separation,
            vertical_error: dop(store, |gsa| gsa.vdop).map(|vdop| vdop * device_accuracy_m),
            satellites_in_use: gga.satellites_in_use,
            quality: gga.quality,
            time: gga.time,
        }),
        Err(e) => {
            warn!("GGA with a fix and unreadable fields: {e:?}");
            Fix::NoFix
        }
    }
}

/// Combines the three extractors over the same store contents.
pub fn fused_fix(store: &SentenceStore, device_accuracy_m: f32) -> FusedFix {
    let position = position(store, device_accuracy_m);
    let velocity = velocity(store);
    let altitude = altitude(store, device_accuracy_m);

    let error_3d = match (&position, &altitude) {
        (Fix::Fix(position), Fix::Fix(altitude)) => position
            .horizontal_error
            .zip(altitude.vertical_error)
            .map(|(h, v)| error_3d(h, v)),
        _ => None,
    };

    FusedFix {
        position,
        velocity,
        altitude,
        error_3d,
    }
}

/// `2.45 × sqrt(h² + v²)`
pub fn error_3d(horizontal: f32, vertical: f32) -> f32 {
    CONFIDENCE_95 * horizontal.hypot(vertical)
}

fn dop(store: &SentenceStore, pick: impl FnOnce(GSA) -> Option<f32>) -> Option<f32> {
    let sentence = store.get(SentenceId::GSA)?;
    match GSA::from_sentence(sentence) {
        Ok(gsa) => pick(gsa),
        Err(e) => {
            warn!("GSA with unreadable fields: {e:?}");
            None
        }
    }
}
