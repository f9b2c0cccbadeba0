//! Index-based views over the four sentence types the extractors read.
//!
//! Each view parses the fields of a stored [`Sentence`] by position. A field past the end of
//! a short sentence reads as empty, the same as a field the receiver left blank.

mod gga;
mod gll;
mod gsa;
mod rmc;

pub use gga::GGA;
pub use gll::GLL;
pub use gsa::GSA;
pub use rmc::RMC;

use crate::Sentence;

fn field(sentence: &Sentence, n: usize) -> &str {
    sentence.field(n).unwrap_or_default()
}

/// Frames, checksums and decodes a sentence body.
#[cfg(test)]
fn sentence(body: &str) -> Sentence {
    use crate::{Decoded, RawSentence, checksum, decode, format_checksum};

    let (_, cc) = checksum(body);
    let frame = format!("${body}*{}\r\n", format_checksum(cc));
    match decode(&RawSentence::try_from(frame.as_bytes()).unwrap()).unwrap() {
        Decoded::Sentence(sentence) => sentence,
        other => panic!("{body}: {other:?}"),
    }
}
