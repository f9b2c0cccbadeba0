//! # Sentence Decoder
//!
//! Turns a checksum-verified [`RawSentence`] into a [`Sentence`] and keeps the most recent
//! one of each type in a [`SentenceStore`].

use core::{fmt, str};
use std::collections::HashMap;

use nom::{
    Parser,
    bytes::complete::{take, take_till},
    character::complete::char,
    multi::many0,
    sequence::preceded,
};

use crate::{
    ChecksumMode, DecodeError, Error, IResult, LineEndingMode, RawSentence, checksum_valid,
    nmea0183,
};

/// The three character sentence type that follows the talker, `GLL` in `$GPGLL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SentenceId([u8; 3]);

impl SentenceId {
    pub const GGA: Self = Self(*b"GGA");
    pub const GLL: Self = Self(*b"GLL");
    pub const GSA: Self = Self(*b"GSA");
    pub const RMC: Self = Self(*b"RMC");

    /// Builds an id from three ASCII alphanumerics.
    pub fn new(id: &str) -> Option<Self> {
        let bytes: [u8; 3] = id.as_bytes().try_into().ok()?;
        bytes
            .iter()
            .all(u8::is_ascii_alphanumeric)
            .then_some(Self(bytes))
    }

    pub fn as_str(&self) -> &str {
        // Only ever built from ASCII
        str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two character source prefix, `GP` in `$GPGLL`, `GN` for multi-constellation fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Talker([u8; 2]);

impl Talker {
    pub fn as_str(&self) -> &str {
        str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for Talker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified, decoded sentence split into its comma-separated fields.
///
/// Field 0 is the address (`GPGLL`), so `field(n)` is the n-th field in the usual NMEA
/// numbering. The checksum and line ending are not part of any field.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    talker: Talker,
    id: SentenceId,
    fields: Vec<String>,
}

impl Sentence {
    pub fn talker(&self) -> Talker {
        self.talker
    }

    pub fn id(&self) -> SentenceId {
        self.id
    }

    /// All fields, the address included.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The n-th field, `None` when the sentence has fewer fields.
    pub fn field(&self, n: usize) -> Option<&str> {
        self.fields.get(n).map(String::as_str)
    }
}

/// Why a frame was dropped without touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    /// The `*CC` field is missing or does not match the body.
    ChecksumMismatch,
    /// The checksum matched but the address is not a talker plus a sentence id.
    Malformed,
}

/// Outcome of decoding one frame.
#[derive(Debug, PartialEq)]
pub enum Decoded {
    Sentence(Sentence),
    Discarded(Discard),
}

/// Decodes one frame.
///
/// The checksum is checked on the raw bytes before anything else; a mismatch is not an
/// error, the frame is simply discarded. A frame that passes but is not valid UTF-8 is a
/// [`DecodeError`].
///
/// ```rust
/// use nmea0183_gnss::{Decoded, RawSentence, SentenceId, decode};
///
/// let raw = RawSentence::try_from(&b"$GPGLL,4916.45,N,12311.12,W,225444,A,A*5C\r\n"[..]).unwrap();
/// let Decoded::Sentence(sentence) = decode(&raw).unwrap() else { panic!() };
///
/// assert_eq!(sentence.id(), SentenceId::GLL);
/// assert_eq!(sentence.field(6), Some("A"));
/// ```
pub fn decode(raw: &RawSentence) -> Result<Decoded, DecodeError> {
    if !checksum_valid(raw) {
        return Ok(Decoded::Discarded(Discard::ChecksumMismatch));
    }

    let text = str::from_utf8(raw).map_err(|source| DecodeError {
        len: raw.len(),
        source,
    })?;

    let mut parser = nmea0183(ChecksumMode::Required, LineEndingMode::Lenient)(address_and_fields);
    match parser.parse(text) {
        Ok((_, sentence)) => Ok(Decoded::Sentence(sentence)),
        Err(_) => Ok(Decoded::Discarded(Discard::Malformed)),
    }
}

/// Parses the content between `$` and `*`: the address, then every field after it.
fn address_and_fields(i: &str) -> IResult<&str, Sentence> {
    let address = i;

    let (i, talker) = take(2u8).parse(i)?;
    let (i, id) = take(3u8).parse(i)?;
    let (i, fields) = many0(preceded(char(','), take_till(|c| c == ','))).parse(i)?;

    let unrecognized = || nom::Err::Error(Error::UnrecognizedMessage(address));
    if !i.is_empty() {
        return Err(unrecognized());
    }
    let talker = talker
        .as_bytes()
        .try_into()
        .map(Talker)
        .map_err(|_| unrecognized())?;
    let id = SentenceId::new(id).ok_or_else(unrecognized)?;

    let mut all = Vec::with_capacity(fields.len() + 1);
    all.push(format!("{talker}{id}"));
    all.extend(fields.into_iter().map(str::to_owned));

    Ok((
        i,
        Sentence {
            talker,
            id,
            fields: all,
        },
    ))
}

/// The last successfully decoded sentence of each type.
///
/// Entries are only ever replaced, never removed: a sentence that stops arriving stays
/// visible with its last known value.
#[derive(Debug, Default, Clone)]
pub struct SentenceStore {
    sentences: HashMap<SentenceId, Sentence>,
}

impl SentenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a sentence, returning the one it replaced.
    pub fn insert(&mut self, sentence: Sentence) -> Option<Sentence> {
        self.sentences.insert(sentence.id, sentence)
    }

    pub fn get(&self, id: SentenceId) -> Option<&Sentence> {
        self.sentences.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sentence> {
        self.sentences.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format_checksum;

    fn raw(body: &str) -> RawSentence {
        let (_, cc) = crate::checksum(body);
        let frame = format!("${body}*{}\r\n", format_checksum(cc));
        RawSentence::try_from(frame.as_bytes()).unwrap()
    }

    #[test]
    fn test_decode_splits_fields() {
        let decoded = decode(&raw("GNGGA,092725.00,4717.11399,N,00833.91590,E,1,08,1.01,499.6,M,48.0,M,,"))
            .unwrap();

        let Decoded::Sentence(sentence) = decoded else {
            panic!("expected a sentence, got {decoded:?}");
        };
        assert_eq!(sentence.talker().as_str(), "GN");
        assert_eq!(sentence.id(), SentenceId::GGA);
        assert_eq!(sentence.fields().len(), 15);
        assert_eq!(sentence.field(0), Some("GNGGA"));
        assert_eq!(sentence.field(6), Some("1"));
        assert_eq!(sentence.field(13), Some(""));
        assert_eq!(sentence.field(14), Some(""));
        assert_eq!(sentence.field(15), None);
    }

    #[test]
    fn test_decode_discards_bad_checksum() {
        let frame = RawSentence::try_from(&b"$GPGLL,4916.45,N,12311.12,W,225444,A,A*5D\r\n"[..])
            .unwrap();
        assert_eq!(
            decode(&frame).unwrap(),
            Decoded::Discarded(Discard::ChecksumMismatch)
        );

        let frame = RawSentence::try_from(&b"$GPGLL,4916.45,N,12311.12,W,225444,A,A\r\n"[..])
            .unwrap();
        assert_eq!(
            decode(&frame).unwrap(),
            Decoded::Discarded(Discard::ChecksumMismatch)
        );
    }

    #[test]
    fn test_decode_rejects_invalid_text() {
        // 0xC3 0x28 is not UTF-8; the XOR checksum does not care
        let body = [b'G', b'P', b'T', b'X', b'T', b',', 0xC3, 0x28];
        let cc = body.iter().fold(0u8, |acc, b| acc ^ b);
        let mut frame = vec![b'$'];
        frame.extend_from_slice(&body);
        frame.extend_from_slice(format!("*{}\r\n", format_checksum(cc)).as_bytes());

        let err = decode(&RawSentence::try_from(frame.as_slice()).unwrap()).unwrap_err();
        assert_eq!(err.len, frame.len());
    }

    #[test]
    fn test_decode_discards_short_address() {
        assert_eq!(
            decode(&raw("GP")).unwrap(),
            Decoded::Discarded(Discard::Malformed)
        );
        assert_eq!(
            decode(&raw("GPG,L,1")).unwrap(),
            Decoded::Discarded(Discard::Malformed)
        );
        assert_eq!(
            decode(&raw("GPGLLX,1")).unwrap(),
            Decoded::Discarded(Discard::Malformed)
        );
    }

    #[test]
    fn test_store_keeps_latest_per_id() {
        let mut store = SentenceStore::new();

        for body in ["GPGLL,1,N,2,E,000001,V,N", "GPRMC,000001,V", "GPGLL,3,N,4,E,000002,A,A"] {
            let Decoded::Sentence(sentence) = decode(&raw(body)).unwrap() else {
                panic!("{body} did not decode");
            };
            store.insert(sentence);
        }

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(SentenceId::GLL).unwrap().field(5), Some("000002"));
        assert_eq!(store.get(SentenceId::RMC).unwrap().field(2), Some("V"));
        assert!(store.get(SentenceId::GGA).is_none());
    }
}
