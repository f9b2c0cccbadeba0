//! # Transport Seams
//!
//! The crate never opens or configures a serial port. It reads through [`ByteSource`] and
//! writes through [`ByteSink`], and the application decides what sits behind them.

use std::{
    collections::VecDeque,
    io::{self, ErrorKind, Read, Write},
    sync::mpsc::Receiver,
};

/// A byte-at-a-time input, possibly blocking.
///
/// `Ok(None)` means "nothing yet, keep waiting". Sources do not distinguish "no data yet" from
/// "end of stream"; a source that can tell the link is gone for good should return an error.
pub trait ByteSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// A fire-and-forget byte output. Nothing is read back.
pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<W: Write> ByteSink for W {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)?;
        self.flush()
    }
}

impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.pop_front())
    }
}

/// Bytes handed over by a reader thread.
///
/// A disconnected sender is reported as [`ErrorKind::BrokenPipe`], since no more bytes can
/// ever arrive.
impl ByteSource for Receiver<u8> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.recv()
            .map(Some)
            .map_err(|_| io::Error::new(ErrorKind::BrokenPipe, "byte channel disconnected"))
    }
}

/// Adapts any [`Read`] (a serial port handle, a file, a socket) into a [`ByteSource`].
///
/// End of stream, read timeouts, `WouldBlock` and `Interrupted` all read as `Ok(None)`.
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
}

impl<R: Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io::Cursor, sync::mpsc, thread};

    #[test]
    fn test_io_source_reads_then_waits() {
        let mut source = IoSource::new(Cursor::new(vec![b'$', b'G']));

        assert_eq!(source.read_byte().unwrap(), Some(b'$'));
        assert_eq!(source.read_byte().unwrap(), Some(b'G'));
        assert_eq!(source.read_byte().unwrap(), None);
        assert_eq!(source.read_byte().unwrap(), None);
    }

    #[test]
    fn test_channel_source() {
        let (tx, mut rx) = mpsc::channel();
        let reader = thread::spawn(move || {
            for byte in b"$GP" {
                tx.send(*byte).unwrap();
            }
        });
        reader.join().unwrap();

        assert_eq!(rx.read_byte().unwrap(), Some(b'$'));
        assert_eq!(rx.read_byte().unwrap(), Some(b'G'));
        assert_eq!(rx.read_byte().unwrap(), Some(b'P'));
        assert_eq!(
            rx.read_byte().unwrap_err().kind(),
            ErrorKind::BrokenPipe
        );
    }

    #[test]
    fn test_vec_sink() {
        let mut sink = Vec::new();
        sink.write_bytes(&[0xB5, 0x62]).unwrap();
        sink.write_bytes(&[0x06]).unwrap();
        assert_eq!(sink, vec![0xB5, 0x62, 0x06]);
    }
}
