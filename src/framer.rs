//! # Sentence Framer
//!
//! Cuts a byte stream into raw NMEA frames: everything from a `$` up to and including the
//! next `\n`. Bytes before the `$` are discarded, so the framer resynchronises after line
//! noise, a UBX reply, or a frame it joined halfway through.

use core::ops::Deref;

use log::debug;

use crate::{ByteSource, SessionError};

/// Upper bound on the length of a frame, `$` and line ending included.
///
/// NMEA 0183 caps sentences at 82 characters. A frame that grows past this bound is abandoned
/// and the framer waits for the next `$`, so a stream that never sends `\n` cannot make it
/// buffer without limit.
pub const MAX_SENTENCE_LEN: usize = 128;

/// One frame as read off the wire, from `$` through `\n`.
///
/// Nothing about the content is checked yet; see [`decode`](crate::decode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSentence(heapless::Vec<u8, MAX_SENTENCE_LEN>);

impl RawSentence {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for RawSentence {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for RawSentence {
    type Error = ();

    fn try_from(bytes: &[u8]) -> Result<Self, ()> {
        heapless::Vec::from_slice(bytes).map(Self)
    }
}

/// Reads bytes from a [`ByteSource`] and yields one [`RawSentence`] at a time.
///
/// Reading blocks for as long as the source blocks. With an idle read limit set, the framer
/// gives up with [`SessionError::Stalled`] after that many consecutive empty reads instead of
/// waiting forever.
#[derive(Debug)]
pub struct Framer<S> {
    source: S,
    buf: heapless::Vec<u8, MAX_SENTENCE_LEN>,
    idle_read_limit: Option<u32>,
    overflows: u64,
}

impl<S: ByteSource> Framer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buf: heapless::Vec::new(),
            idle_read_limit: None,
            overflows: 0,
        }
    }

    pub fn with_idle_read_limit(mut self, limit: Option<u32>) -> Self {
        self.idle_read_limit = limit;
        self
    }

    /// Number of frames abandoned for growing past [`MAX_SENTENCE_LEN`].
    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Reads until a complete frame is available.
    pub fn next_sentence(&mut self) -> Result<RawSentence, SessionError> {
        loop {
            let byte = self.next_byte()?;

            if self.buf.is_empty() {
                if byte == b'$' {
                    // Capacity is at least one, this cannot fail
                    let _ = self.buf.push(byte);
                }
                continue;
            }

            if self.buf.push(byte).is_err() {
                debug!(
                    "abandoning frame longer than {MAX_SENTENCE_LEN} bytes: {:?}",
                    String::from_utf8_lossy(&self.buf[..16])
                );
                self.overflows += 1;
                self.buf.clear();
                if byte == b'$' {
                    let _ = self.buf.push(byte);
                }
                continue;
            }

            if byte == b'\n' {
                let frame = core::mem::take(&mut self.buf);
                return Ok(RawSentence(frame));
            }
        }
    }

    fn next_byte(&mut self) -> Result<u8, SessionError> {
        let mut idle = 0u32;
        loop {
            if let Some(byte) = self.source.read_byte()? {
                return Ok(byte);
            }

            idle = idle.saturating_add(1);
            if let Some(limit) = self.idle_read_limit
                && idle > limit
            {
                return Err(SessionError::Stalled { reads: idle });
            }
        }
    }
}

impl<S: ByteSource> Iterator for Framer<S> {
    type Item = Result<RawSentence, SessionError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_sentence())
    }
}
