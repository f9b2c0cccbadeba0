use nom::{Parser, error::ErrorKind};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::field;
use crate::{
    Error, NmeaParse, Sentence,
    nmea_content::{
        FixMode, SelectionMode,
        parse::{FieldResult, indicator, optional},
    },
    parsing::consumed,
};

/// GSA - GPS DOP and active satellites
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_gsa_gps_dop_and_active_satellites>
///
/// ```text
///         1 2 3                      15 16  17
///         | | |                       | |   |
///  $--GSA,a,a,x,x,x,x,x,x,x,x,x,x,x,x,x,x.x,x.x,*hh<CR><LF>
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct GSA {
    /// Selection mode
    pub selection_mode: Option<SelectionMode>,
    /// Fix mode
    pub fix_mode: Option<FixMode>,
    /// PRN numbers of the satellites used in the fix, up to 12
    pub fix_sats_prn: heapless::Vec<u8, 12>,
    /// Position Dilution of Precision
    pub pdop: Option<f32>,
    /// Horizontal Dilution of Precision
    pub hdop: Option<f32>,
    /// Vertical Dilution of Precision
    pub vdop: Option<f32>,
}

impl GSA {
    pub fn from_sentence(sentence: &Sentence) -> FieldResult<'_, Self> {
        let mut fix_sats_prn = heapless::Vec::new();
        for n in 3..=14 {
            let prn = field(sentence, n);
            if prn.is_empty() {
                continue;
            }

            let (_, prn) = consumed(<u8 as NmeaParse<&str>>::parse, ErrorKind::Eof)
                .parse(prn)
                .map_err(|_| Error::InvalidField(prn))?;
            // 12 slots for 12 fields
            let _ = fix_sats_prn.push(prn);
        }

        Ok(Self {
            selection_mode: indicator(field(sentence, 1))?,
            fix_mode: indicator(field(sentence, 2))?,
            fix_sats_prn,
            pdop: optional(field(sentence, 15))?,
            hdop: optional(field(sentence, 16))?,
            vdop: optional(field(sentence, 17))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea_content::sentences::sentence;

    #[test]
    fn test_gsa_parsing() {
        let gsa = GSA::from_sentence(&sentence("GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.0,1.2"))
            .unwrap();

        assert_eq!(gsa.selection_mode, Some(SelectionMode::Automatic));
        assert_eq!(gsa.fix_mode, Some(FixMode::Fix3D));
        assert_eq!(gsa.fix_sats_prn.as_slice(), &[4, 5, 9, 12, 24]);
        assert_eq!(gsa.pdop, Some(2.5));
        assert_eq!(gsa.hdop, Some(1.0));
        assert_eq!(gsa.vdop, Some(1.2));
    }

    #[test]
    fn test_gsa_empty() {
        let gsa = GSA::from_sentence(&sentence("GPGSA,A,3,,,,,,,,,,,,,,,")).unwrap();

        assert!(gsa.fix_sats_prn.is_empty());
        assert_eq!(gsa.hdop, None);
        assert_eq!(gsa.vdop, None);
    }

    #[test]
    fn test_gsa_truncated() {
        let gsa = GSA::from_sentence(&sentence("GPGSA,A,1")).unwrap();
        assert_eq!(gsa.fix_mode, Some(FixMode::NoFix));
        assert_eq!(gsa.vdop, None);
    }
}
