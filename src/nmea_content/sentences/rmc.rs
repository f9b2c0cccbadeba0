#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::field;
use crate::{
    Sentence,
    nmea_content::{
        Coordinate, MagneticVariation, Status, Timestamp,
        parse::{FieldResult, coordinate, indicator, magnetic_variation, optional, timestamp},
    },
};

/// RMC - Recommended Minimum Navigation Information
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_rmc_recommended_minimum_navigation_information>
///
/// ```text
///         1         2 3       4 5        6  7   8   9    10 11
///         |         | |       | |        |  |   |   |    |  |
///  $--RMC,hhmmss.ss,A,ddmm.mm,a,dddmm.mm,a,x.x,x.x,xxxx,x.x,a*hh<CR><LF>
/// ```
///
/// The date in field 9 is not read.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct RMC {
    /// Fix time in UTC
    pub time: Option<Timestamp>,
    /// Status Mode Indicator
    pub status: Option<Status>,
    /// Latitude
    pub latitude: Option<Coordinate>,
    /// Longitude
    pub longitude: Option<Coordinate>,
    /// Speed over ground in knots
    pub speed_over_ground: Option<f32>,
    /// Course over ground in degrees true
    pub course_over_ground: Option<f32>,
    /// Magnetic variation
    pub magnetic_variation: MagneticVariation,
}

impl RMC {
    /// Reads only the status field, without touching the rest of the sentence.
    pub fn status(sentence: &Sentence) -> Option<Status> {
        indicator(field(sentence, 2)).ok().flatten()
    }

    pub fn from_sentence(sentence: &Sentence) -> FieldResult<'_, Self> {
        Ok(Self {
            time: timestamp(field(sentence, 1))?,
            status: indicator(field(sentence, 2))?,
            latitude: coordinate(field(sentence, 3), field(sentence, 4))?,
            longitude: coordinate(field(sentence, 5), field(sentence, 6))?,
            speed_over_ground: optional(field(sentence, 7))?,
            course_over_ground: optional(field(sentence, 8))?,
            magnetic_variation: magnetic_variation(field(sentence, 10), field(sentence, 11))?,
        })
    }
}
