// Windowed byte stream: a fixed 16-byte window sliding over a reader.
//
// `prime()` fills the window from the source; `advance()` moves it one
// byte, reporting the byte evicted from the front and the byte appended
// at the back. The window is backed by a ring buffer with a logical
// start offset, so advancing never shifts or reallocates.
//
// At end of stream the window is not zero-padded: the final valid
// position is the one ending at the last byte of the source.

use std::fmt;
use std::io::{self, Read};

use crate::hash::WINDOW_SIZE;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure modes of the byte source.
#[derive(Debug)]
pub enum WindowError {
    /// The source ran out of bytes. During `prime` this means the source
    /// is shorter than one window; during `advance` it is the normal
    /// end-of-input signal.
    EndOfStream,
    /// Any other read failure.
    Io(io::Error),
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream => write!(f, "end of stream"),
            Self::Io(e) => write!(f, "read error: {e}"),
        }
    }
}

impl std::error::Error for WindowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EndOfStream => None,
            Self::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for WindowError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::EndOfStream
        } else {
            Self::Io(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Sliding window
// ---------------------------------------------------------------------------

/// One step of the window: the byte that left the front and the byte
/// that entered the back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roll {
    pub evicted: u8,
    pub appended: u8,
}

/// A 16-byte window over a byte source.
///
/// The reader is injected at construction; tests drive the window with
/// in-memory cursors or failing readers instead of rebinding globals.
#[derive(Debug)]
pub struct ByteWindow<R> {
    reader: R,
    buf: [u8; WINDOW_SIZE],
    /// Index of the logical front byte within `buf`.
    start: usize,
}

impl<R: Read> ByteWindow<R> {
    /// Read exactly one window from the source.
    ///
    /// Fails with `EndOfStream` when fewer than `WINDOW_SIZE` bytes are
    /// available, and with `Io` on any other read failure.
    pub fn prime(mut reader: R) -> Result<Self, WindowError> {
        let mut buf = [0u8; WINDOW_SIZE];
        reader.read_exact(&mut buf)?;
        Ok(Self {
            reader,
            buf,
            start: 0,
        })
    }

    /// Slide the window one byte forward.
    ///
    /// Reads one byte from the source, evicts the byte at position 0 and
    /// appends the new byte at position `WINDOW_SIZE - 1`. Returns
    /// `EndOfStream` when the source is exhausted.
    pub fn advance(&mut self) -> Result<Roll, WindowError> {
        let mut next = [0u8; 1];
        self.reader.read_exact(&mut next)?;
        let appended = next[0];
        let evicted = self.buf[self.start];
        self.buf[self.start] = appended;
        self.start = (self.start + 1) % WINDOW_SIZE;
        Ok(Roll { evicted, appended })
    }

    /// The byte currently at the front of the window.
    #[inline]
    pub fn front(&self) -> u8 {
        self.buf[self.start]
    }

    /// The window content as two slices in logical order: everything
    /// from the front to the end of the ring, then the wrapped remainder.
    #[inline]
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        let (wrapped, front) = self.buf.split_at(self.start);
        (front, wrapped)
    }

    /// Materialize the window in logical order.
    pub fn to_array(&self) -> [u8; WINDOW_SIZE] {
        let mut out = [0u8; WINDOW_SIZE];
        let (front, back) = self.as_slices();
        out[..front.len()].copy_from_slice(front);
        out[front.len()..].copy_from_slice(back);
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that fails with a non-EOF error after `ok` successful bytes.
    #[derive(Debug)]
    struct FailingReader {
        ok: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.ok == 0 {
                return Err(io::Error::other("backing store went away"));
            }
            let n = buf.len().min(self.ok);
            buf[..n].fill(0x5A);
            self.ok -= n;
            Ok(n)
        }
    }

    #[test]
    fn prime_reads_exactly_one_window() {
        let w = ByteWindow::prime(Cursor::new(b"abcdefghijklmnopqrs".to_vec())).unwrap();
        assert_eq!(&w.to_array(), b"abcdefghijklmnop");
        assert_eq!(w.front(), b'a');
    }

    #[test]
    fn prime_short_source_is_end_of_stream() {
        let err = ByteWindow::prime(Cursor::new(b"too short".to_vec())).unwrap_err();
        assert!(matches!(err, WindowError::EndOfStream));
    }

    #[test]
    fn advance_reports_evicted_and_appended() {
        let mut w = ByteWindow::prime(Cursor::new(b"abcdefghijklmnopqr".to_vec())).unwrap();

        let roll = w.advance().unwrap();
        assert_eq!(roll, Roll { evicted: b'a', appended: b'q' });
        assert_eq!(&w.to_array(), b"bcdefghijklmnopq");
        assert_eq!(w.front(), b'b');

        let roll = w.advance().unwrap();
        assert_eq!(roll, Roll { evicted: b'b', appended: b'r' });
        assert_eq!(&w.to_array(), b"cdefghijklmnopqr");
    }

    #[test]
    fn advance_past_end_is_end_of_stream() {
        let mut w = ByteWindow::prime(Cursor::new(b"abcdefghijklmnop".to_vec())).unwrap();
        assert!(matches!(w.advance(), Err(WindowError::EndOfStream)));
        // The window is unchanged after a failed advance.
        assert_eq!(&w.to_array(), b"abcdefghijklmnop");
    }

    #[test]
    fn ring_wraps_across_full_revolution() {
        let data: Vec<u8> = (0u8..64).collect();
        let mut w = ByteWindow::prime(Cursor::new(data.clone())).unwrap();
        for i in 0..(64 - WINDOW_SIZE) {
            let roll = w.advance().unwrap();
            assert_eq!(roll.evicted, data[i]);
            assert_eq!(roll.appended, data[i + WINDOW_SIZE]);
            assert_eq!(w.to_array().as_slice(), &data[i + 1..i + 1 + WINDOW_SIZE]);
        }
    }

    #[test]
    fn as_slices_join_to_window() {
        let mut w = ByteWindow::prime(Cursor::new(b"abcdefghijklmnopqrstu".to_vec())).unwrap();
        for _ in 0..5 {
            w.advance().unwrap();
        }
        let (front, back) = w.as_slices();
        let mut joined = front.to_vec();
        joined.extend_from_slice(back);
        assert_eq!(joined.as_slice(), &w.to_array());
    }

    #[test]
    fn read_failure_is_io_error() {
        let err = ByteWindow::prime(FailingReader { ok: 4 }).unwrap_err();
        assert!(matches!(err, WindowError::Io(_)));

        let mut w = ByteWindow::prime(FailingReader { ok: WINDOW_SIZE }).unwrap();
        assert!(matches!(w.advance(), Err(WindowError::Io(_))));
    }
}
