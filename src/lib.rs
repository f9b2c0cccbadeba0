//! # NMEA 0183 GNSS
//!
//! This library reads a u-blox style GNSS receiver over a byte-oriented serial link:
//!
//! - frames the incoming byte stream into `$...\n` sentences
//! - verifies the XOR checksum of each sentence and decodes its fields
//! - keeps the most recent sentence of each type
//! - extracts position, velocity, altitude and a combined error estimate from GLL, RMC, GGA
//!   and GSA
//! - encodes UBX command packets (disable a sentence, set the navigation rate) and decodes
//!   the acknowledgements
//!
//! The crate does not open or configure the serial port. It reads through a [`ByteSource`]
//! and writes through a [`ByteSink`].
//!
//! ## Usage
//!
//! ```rust
//! use std::collections::VecDeque;
//! use nmea0183_gnss::{GnssSession, Refresh, SessionConfig, nmea_content::Fix, ubx};
//!
//! let stream = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
//! let config = SessionConfig::default()
//!     .with_sentences_per_cycle(1)
//!     .with_idle_read_limit(Some(0));
//! let mut session = GnssSession::with_config(VecDeque::from(stream.to_vec()), config);
//!
//! match session.altitude(Refresh::Cycle).unwrap() {
//!     Fix::Fix(altitude) => assert_eq!(altitude.altitude.unwrap().to_string(), "545.4 M"),
//!     Fix::NoFix => unreachable!(),
//! }
//!
//! let mut port = Vec::new();
//! ubx::set_rate(5, 1).unwrap().write_to(&mut port).unwrap();
//! ```
//!
//! ## Sentence framing
//!
//! The `nom` framing parser is also available on its own, for content parsers of your own:
//!
//! ```rust
//! use nmea0183_gnss::{ChecksumMode, IResult, LineEndingMode, nmea0183};
//! use nom::Parser;
//!
//! fn parse_content(i: &str) -> IResult<&str, bool> {
//!     Ok((i, true))
//! }
//!
//! let mut parser = nmea0183(ChecksumMode::Required, LineEndingMode::Required)(parse_content);
//! assert!(parser.parse("$GPGGA,123456,data*41\r\n").is_ok());
//! ```

pub mod error;
mod framer;
mod nmea0183;
pub mod nmea_content;
mod parse;
pub mod parsing;
mod sentence;
mod session;
mod transport;
pub mod ubx;

pub use error::{DecodeError, Error, IResult, SessionError, UbxError};
pub use framer::{Framer, MAX_SENTENCE_LEN, RawSentence};
pub use nmea0183::*;
pub use parse::NmeaParse;
pub use sentence::{Decoded, Discard, Sentence, SentenceId, SentenceStore, Talker, decode};
pub use session::{GnssSession, Refresh, SessionConfig, Stats};
pub use transport::{ByteSink, ByteSource, IoSource};

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct README;

#[cfg(test)]
mod tests {
    mod checksum;
    mod framing;
    mod stream;
}
