#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::field;
use crate::{
    Sentence,
    nmea_content::{
        Coordinate, Status, Timestamp,
        parse::{FieldResult, coordinate, indicator, timestamp},
    },
};

/// GLL - Geographic Position - Latitude/Longitude
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_gll_geographic_position_latitudelongitude>
///
/// ```text
///         1       2 3        4 5         6 7
///         |       | |        | |         | |
///  $--GLL,ddmm.mm,a,dddmm.mm,a,hhmmss.ss,a,m*hh<CR><LF>
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct GLL {
    /// Latitude
    pub latitude: Option<Coordinate>,
    /// Longitude
    pub longitude: Option<Coordinate>,
    /// Fix time in UTC
    pub time: Option<Timestamp>,
    /// Status Mode Indicator
    pub status: Option<Status>,
}

impl GLL {
    /// Reads only the status field, without touching the rest of the sentence.
    pub fn status(sentence: &Sentence) -> Option<Status> {
        indicator(field(sentence, 6)).ok().flatten()
    }

    pub fn from_sentence(sentence: &Sentence) -> FieldResult<'_, Self> {
        Ok(Self {
            latitude: coordinate(field(sentence, 1), field(sentence, 2))?,
            longitude: coordinate(field(sentence, 3), field(sentence, 4))?,
            time: timestamp(field(sentence, 5))?,
            status: indicator(field(sentence, 6))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Decoded, Error, RawSentence, decode, nmea_content::Hemisphere};

    fn sentence(frame: &[u8]) -> Sentence {
        match decode(&RawSentence::try_from(frame).unwrap()).unwrap() {
            Decoded::Sentence(sentence) => sentence,
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_gll_parsing() {
        let sentence = sentence(b"$GPGLL,4916.45,N,12311.12,W,225444,A,A*5C\r\n");
        assert_eq!(GLL::status(&sentence), Some(Status::Valid));

        let gll = GLL::from_sentence(&sentence).unwrap();
        assert_eq!(gll.latitude.unwrap().hemisphere, Hemisphere::North);
        assert_eq!(gll.longitude.unwrap().hemisphere, Hemisphere::West);
        assert_eq!(gll.time.unwrap().to_string(), "22:54:44");
        assert_eq!(gll.status, Some(Status::Valid));
    }

    #[test]
    fn test_gll_short_sentence() {
        let sentence = sentence(b"$GPGLL,,,,*50\r\n");
        assert_eq!(GLL::status(&sentence), None);

        let gll = GLL::from_sentence(&sentence).unwrap();
        assert_eq!(gll.latitude, None);
        assert_eq!(gll.time, None);
    }

    #[test]
    fn test_gll_invalid_field() {
        let sentence = sentence(b"$GPGLL,4916.45,X,12311.12,W,225444,A,A*4A\r\n");
        assert_eq!(GLL::from_sentence(&sentence), Err(Error::InvalidField("X")));
    }
}
