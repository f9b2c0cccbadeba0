#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::field;
use crate::{
    Error, Sentence,
    nmea_content::{
        Coordinate, Length, Quality, Timestamp,
        parse::{FieldResult, coordinate, indicator, optional, timestamp, with_unit},
    },
};

/// GGA - Global Positioning System Fix Data
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_gga_global_positioning_system_fix_data>
///
/// ```text
///                                                      11
///         1         2       3 4        5 6 7  8   9  10 |  12 13  14
///         |         |       | |        | | |  |   |   | |   | |   |
///  $--GGA,hhmmss.ss,ddmm.mm,a,dddmm.mm,a,x,xx,x.x,x.x,M,x.x,M,x.x,xxxx*hh<CR><LF>
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct GGA {
    /// Fix time in UTC
    pub time: Option<Timestamp>,
    /// Latitude
    pub latitude: Option<Coordinate>,
    /// Longitude
    pub longitude: Option<Coordinate>,
    /// GPS Quality Indicator
    pub quality: Quality,
    /// Number of satellites in use
    pub satellites_in_use: Option<u8>,
    /// Horizontal Dilution of Precision
    pub hdop: Option<f32>,
    /// Altitude above/below mean sea level (geoid)
    pub altitude: Option<Length>,
    /// Geoidal separation, the difference between the WGS-84 earth ellipsoid and mean sea
    /// level (geoid), negative values indicate that the geoid is below the ellipsoid
    pub geoid_separation: Option<Length>,
    /// Age of Differential GPS data in seconds, null field when DGPS is not used
    pub age_of_dgps: Option<f32>,
    /// Differential reference station ID
    pub ref_station_id: Option<u16>,
}

impl GGA {
    /// Reads only the fix quality field, without touching the rest of the sentence.
    pub fn quality(sentence: &Sentence) -> Option<Quality> {
        indicator(field(sentence, 6)).ok().flatten()
    }

    pub fn from_sentence(sentence: &Sentence) -> FieldResult<'_, Self> {
        let quality = field(sentence, 6);

        Ok(Self {
            time: timestamp(field(sentence, 1))?,
            latitude: coordinate(field(sentence, 2), field(sentence, 3))?,
            longitude: coordinate(field(sentence, 4), field(sentence, 5))?,
            quality: indicator(quality)?.ok_or(Error::InvalidField(quality))?,
            satellites_in_use: optional(field(sentence, 7))?,
            hdop: optional(field(sentence, 8))?,
            altitude: with_unit(field(sentence, 9), field(sentence, 10))?,
            geoid_separation: with_unit(field(sentence, 11), field(sentence, 12))?,
            age_of_dgps: optional(field(sentence, 13))?,
            ref_station_id: optional(field(sentence, 14))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea_content::sentences::sentence;

    #[test]
    fn test_gga_parsing() {
        let sentence = sentence("GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,");
        assert_eq!(GGA::quality(&sentence), Some(Quality::GPSFix));

        let gga = GGA::from_sentence(&sentence).unwrap();
        assert_eq!(gga.time.unwrap().to_string(), "12:35:19");
        assert!((gga.latitude.unwrap().degrees - 48.1173).abs() < 1e-9);
        assert_eq!(gga.satellites_in_use, Some(8));
        assert_eq!(gga.hdop, Some(0.9));
        assert_eq!(gga.altitude, Some(Length { value: 545.4, unit: 'M' }));
        assert_eq!(gga.geoid_separation.unwrap().value, 46.9);
        assert_eq!(gga.age_of_dgps, None);
        assert_eq!(gga.ref_station_id, None);
    }

    #[test]
    fn test_gga_negative_geoid() {
        let sentence =
            sentence("GNGGA,001043.00,4404.14036,N,12118.85961,W,1,12,0.98,1113.0,M,-21.3,M,,");

        let gga = GGA::from_sentence(&sentence).unwrap();
        assert_eq!(gga.geoid_separation.unwrap().value, -21.3);
        assert!(gga.longitude.unwrap().signed() < -121.0);
    }

    #[test]
    fn test_gga_unknown_quality() {
        let sentence = sentence("GPGGA,123519,4807.038,N,01131.000,E,9,08,0.9,545.4,M,46.9,M,,");
        assert_eq!(GGA::quality(&sentence), None);
        assert_eq!(GGA::from_sentence(&sentence), Err(Error::InvalidField("9")));
    }
}
