//! # GNSS Session
//!
//! Ties the framer, the decoder, the sentence store and the extractors together over one
//! [`ByteSource`].
//!
//! Every query can run a refresh cycle first: the session reads a fixed number of frames,
//! stores the ones that decode, and then answers from the store. Sentences persist across
//! cycles, so a query may see a sentence from an earlier cycle if the receiver did not send a
//! newer one.
//!
//! ```rust
//! use std::collections::VecDeque;
//! use nmea0183_gnss::{GnssSession, Refresh, SessionConfig, nmea_content::Fix};
//!
//! let bytes = b"$GPGLL,4916.45,N,12311.12,W,225444,A,A*5C\r\n".to_vec();
//! let config = SessionConfig::default()
//!     .with_sentences_per_cycle(1)
//!     .with_idle_read_limit(Some(0));
//! let mut session = GnssSession::with_config(VecDeque::from(bytes), config);
//!
//! let Fix::Fix(position) = session.position(Refresh::Cycle).unwrap() else { panic!() };
//! assert_eq!(position.time.unwrap().to_string(), "22:54:44");
//! assert_eq!(session.stats().stored, 1);
//! ```

use log::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    ByteSource, Decoded, Discard, Framer, SentenceStore, SessionError, decode,
    nmea_content::{self, Altitude, Fix, FusedFix, Position, Velocity},
};

/// Tuning for a [`GnssSession`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Frames read per refresh cycle, about one of each type the receiver sends per epoch
    pub sentences_per_cycle: usize,
    /// Meters of 1-sigma error per unit of dilution of precision, a property of the receiver
    pub device_accuracy_m: f32,
    /// Consecutive empty reads tolerated before a refresh gives up; `None` waits forever
    pub idle_read_limit: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sentences_per_cycle: 6,
            device_accuracy_m: 2.5,
            idle_read_limit: None,
        }
    }
}

impl SessionConfig {
    pub fn with_sentences_per_cycle(mut self, count: usize) -> Self {
        self.sentences_per_cycle = count;
        self
    }

    pub fn with_device_accuracy_m(mut self, meters: f32) -> Self {
        self.device_accuracy_m = meters;
        self
    }

    pub fn with_idle_read_limit(mut self, limit: Option<u32>) -> Self {
        self.idle_read_limit = limit;
        self
    }
}

/// Counters kept across the lifetime of a session.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Frames read off the wire
    pub frames: u64,
    /// Frames decoded and stored
    pub stored: u64,
    pub checksum_mismatches: u64,
    /// Checksum matched, address did not
    pub malformed: u64,
    /// Checksum matched, text did not decode
    pub decode_errors: u64,
    /// Frames abandoned for being too long
    pub overflows: u64,
}

/// Whether a query reads fresh sentences first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Run one refresh cycle, retrying once on a decode error.
    #[default]
    Cycle,
    /// Answer from the store as it is, when a cycle already ran for this epoch.
    Skip,
}

/// A receiver on the other end of a [`ByteSource`].
#[derive(Debug)]
pub struct GnssSession<S> {
    framer: Framer<S>,
    store: SentenceStore,
    config: SessionConfig,
    stats: Stats,
}

impl<S: ByteSource> GnssSession<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, SessionConfig::default())
    }

    pub fn with_config(source: S, config: SessionConfig) -> Self {
        Self {
            framer: Framer::new(source).with_idle_read_limit(config.idle_read_limit),
            store: SentenceStore::new(),
            config,
            stats: Stats::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn store(&self) -> &SentenceStore {
        &self.store
    }

    pub fn source_mut(&mut self) -> &mut S {
        self.framer.source_mut()
    }

    pub fn into_source(self) -> S {
        self.framer.into_source()
    }

    /// Reads exactly `count` frames.
    ///
    /// Frames that fail the checksum or carry a malformed address are dropped but still
    /// count. A frame that passes the checksum and is not valid text ends the cycle early
    /// with [`SessionError::Decode`]; the sentences stored before it stay stored.
    pub fn refresh(&mut self, count: usize) -> Result<(), SessionError> {
        for _ in 0..count {
            let raw = self.framer.next_sentence();
            self.stats.overflows = self.framer.overflows();
            let raw = raw?;
            self.stats.frames += 1;

            match decode(&raw) {
                Ok(Decoded::Sentence(sentence)) => {
                    trace!("storing {}{}", sentence.talker(), sentence.id());
                    self.store.insert(sentence);
                    self.stats.stored += 1;
                }
                Ok(Decoded::Discarded(Discard::ChecksumMismatch)) => {
                    debug!("checksum mismatch: {:?}", String::from_utf8_lossy(&raw));
                    self.stats.checksum_mismatches += 1;
                }
                Ok(Decoded::Discarded(Discard::Malformed)) => {
                    debug!("malformed address: {:?}", String::from_utf8_lossy(&raw));
                    self.stats.malformed += 1;
                }
                Err(e) => {
                    self.stats.decode_errors += 1;
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// [`refresh`](Self::refresh), run a second time if the first ends with a decode error.
    ///
    /// Only [`SessionError::Decode`] is retried. A second decode error is returned as is.
    pub fn refresh_with_retry(&mut self, count: usize) -> Result<(), SessionError> {
        match self.refresh(count) {
            Err(SessionError::Decode(e)) => {
                warn!("{e}, reading a fresh cycle");
                self.refresh(count)
            }
            result => result,
        }
    }

    /// Latitude, longitude and horizontal error, from GLL and GSA.
    pub fn position(&mut self, refresh: Refresh) -> Result<Fix<Position>, SessionError> {
        self.cycle(refresh)?;
        Ok(nmea_content::position(
            &self.store,
            self.config.device_accuracy_m,
        ))
    }

    /// Speed, course and magnetic variation, from RMC.
    pub fn velocity(&mut self, refresh: Refresh) -> Result<Fix<Velocity>, SessionError> {
        self.cycle(refresh)?;
        Ok(nmea_content::velocity(&self.store))
    }

    /// Altitude, geoid separation and vertical error, from GGA and GSA.
    pub fn altitude(&mut self, refresh: Refresh) -> Result<Fix<Altitude>, SessionError> {
        self.cycle(refresh)?;
        Ok(nmea_content::altitude(
            &self.store,
            self.config.device_accuracy_m,
        ))
    }

    /// All three of the above from a single cycle, plus the combined 3D error.
    pub fn fused_fix(&mut self, refresh: Refresh) -> Result<FusedFix, SessionError> {
        self.cycle(refresh)?;
        Ok(nmea_content::fused_fix(
            &self.store,
            self.config.device_accuracy_m,
        ))
    }

    fn cycle(&mut self, refresh: Refresh) -> Result<(), SessionError> {
        match refresh {
            Refresh::Cycle => self.refresh_with_retry(self.config.sentences_per_cycle),
            Refresh::Skip => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::{SentenceId, checksum, format_checksum};

    fn frame(body: &str) -> Vec<u8> {
        let (_, cc) = checksum(body);
        format!("${body}*{}\r\n", format_checksum(cc)).into_bytes()
    }

    fn not_text() -> Vec<u8> {
        let body = [b'G', b'P', b'T', b'X', b'T', b',', 0xC3, 0x28];
        let cc = body.iter().fold(0u8, |acc, b| acc ^ b);
        let mut frame = vec![b'$'];
        frame.extend_from_slice(&body);
        frame.extend_from_slice(format!("*{}\r\n", format_checksum(cc)).as_bytes());
        frame
    }

    fn session(frames: &[Vec<u8>], sentences_per_cycle: usize) -> GnssSession<VecDeque<u8>> {
        let config = SessionConfig::default()
            .with_sentences_per_cycle(sentences_per_cycle)
            .with_idle_read_limit(Some(0));
        GnssSession::with_config(frames.concat().into(), config)
    }

    #[test]
    fn test_refresh_keeps_latest_per_id() {
        let gll = "GPGLL,4916.46,N,12311.12,W,225445,A,A";
        let rmc = "GPRMC,225445,A,4916.46,N,12311.12,W,000.5,054.7,191194,020.3,E";
        let mut session = session(
            &[
                frame("GPGLL,4916.45,N,12311.12,W,225444,A,A"),
                frame("GPRMC,225444,V,,,,,,,191194,,"),
                frame(gll),
                frame(rmc),
            ],
            2,
        );

        session.refresh(2).unwrap();
        session.refresh(2).unwrap();

        let store = session.store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(SentenceId::GLL).unwrap().fields().join(","), gll);
        assert_eq!(store.get(SentenceId::RMC).unwrap().fields().join(","), rmc);
        assert_eq!(session.stats().stored, 4);
    }

    #[test]
    fn test_checksum_failure_counts_toward_cycle() {
        let mut bad = frame("GPGLL,4916.45,N,12311.12,W,225444,A,A");
        let star = bad.iter().position(|&b| b == b'*').unwrap();
        bad[star + 2] = if bad[star + 2] == b'0' { b'1' } else { b'0' };

        let mut session = session(
            &[bad, frame("GPGLL,4916.45,N,12311.12,W,225444,A,A")],
            1,
        );

        session.refresh(1).unwrap();
        assert!(session.store().is_empty());
        assert_eq!(session.stats().checksum_mismatches, 1);
        assert_eq!(session.stats().frames, 1);

        session.refresh(1).unwrap();
        assert!(session.store().get(SentenceId::GLL).is_some());
    }

    #[test]
    fn test_decode_error_retried_once() {
        let mut session = session(
            &[not_text(), frame("GPGLL,4916.45,N,12311.12,W,225444,A,A")],
            1,
        );

        session.refresh_with_retry(1).unwrap();
        assert!(session.store().get(SentenceId::GLL).is_some());
        assert_eq!(session.stats().decode_errors, 1);
    }

    #[test]
    fn test_second_decode_error_propagates() {
        let mut session = session(
            &[
                not_text(),
                not_text(),
                frame("GPGLL,4916.45,N,12311.12,W,225444,A,A"),
            ],
            1,
        );

        let err = session.refresh_with_retry(1).unwrap_err();
        assert!(matches!(err, SessionError::Decode(_)));
        assert_eq!(session.stats().decode_errors, 2);
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_stalled_not_retried() {
        let mut session = session(&[], 1);

        let err = session.refresh_with_retry(1).unwrap_err();
        assert!(matches!(err, SessionError::Stalled { reads: 1 }));

        session
            .source_mut()
            .extend(frame("GPGLL,4916.45,N,12311.12,W,225444,A,A"));
        session.refresh_with_retry(1).unwrap();
        assert_eq!(session.stats().frames, 1);
    }

    #[test]
    fn test_position_no_fix_on_void_gll() {
        let mut session = session(&[frame("GPGLL,4916.45,N,12311.12,W,225444,V,N")], 1);
        assert_eq!(session.position(Refresh::Cycle).unwrap(), Fix::NoFix);
    }

    #[test]
    fn test_fused_fix_reads_one_cycle() {
        let mut session = session(
            &[
                frame("GPGLL,4916.45,N,12311.12,W,225444,A,A"),
                frame("GPGGA,225444,4916.45,N,12311.12,W,1,08,0.9,545.4,M,46.9,M,,"),
                frame("GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.0,1.2"),
            ],
            3,
        );

        let fused = session.fused_fix(Refresh::Cycle).unwrap();
        let Fix::Fix(altitude) = &fused.altitude else {
            panic!("expected an altitude fix");
        };
        assert!((altitude.vertical_error.unwrap() - 3.0).abs() < 1e-6);
        assert!((fused.error_3d.unwrap() - 9.5675).abs() < 1e-3);
        assert_eq!(fused.velocity, Fix::NoFix);
        assert_eq!(session.stats().frames, 3);

        // Nothing left to read, skipping the cycle still answers from the store
        assert!(session.altitude(Refresh::Skip).unwrap().is_fix());
        assert!(session.altitude(Refresh::Cycle).is_err());
    }

    #[test]
    fn test_device_accuracy() {
        let mut session = GnssSession::with_config(
            VecDeque::from(
                [
                    frame("GPGLL,4916.45,N,12311.12,W,225444,A,A"),
                    frame("GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.2,1.2"),
                ]
                .concat(),
            ),
            SessionConfig::default()
                .with_sentences_per_cycle(2)
                .with_device_accuracy_m(1.5)
                .with_idle_read_limit(Some(0)),
        );

        let Fix::Fix(position) = session.position(Refresh::Cycle).unwrap() else {
            panic!("expected a fix");
        };
        assert!((position.horizontal_error.unwrap() - 1.8).abs() < 1e-6);
    }
}
