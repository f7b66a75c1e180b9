//! Peek-capable wrapper around [`std::io::Read`]/[`std::io::Write`], and the
//! ownership sum the reference implementation expressed as a boolean flag.

use std::io::{self, ErrorKind, Read, Write};

/// Large enough for one header: `1` (type byte) `+ 9` (max vbyte-64 length) = 10.
const LOOKAHEAD_CAP: usize = 16;

/// Wraps any [`Read`] with a small fixed-capacity lookahead buffer so a
/// caller can peek at upcoming bytes without consuming them — the "ring
/// buffer" the reference implementation's peek/consume split calls for when
/// the underlying device has no native peek.
pub struct PeekReader<R> {
    inner: R,
    buf: [u8; LOOKAHEAD_CAP],
    len: usize,
}

impl<R: Read> PeekReader<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner, buf: [0; LOOKAHEAD_CAP], len: 0 }
    }

    /// Tops up the lookahead buffer up to `n` bytes (capped at
    /// [`LOOKAHEAD_CAP`]). Stops early, without error, on EOF or on a
    /// non-blocking source reporting [`ErrorKind::WouldBlock`] — both mean
    /// "no more data right now", which the caller (the `Reader` state
    /// machine) turns into a `Pending` token rather than an error.
    fn fill_to(&mut self, n: usize) -> io::Result<()> {
        let target = n.min(LOOKAHEAD_CAP);
        while self.len < target {
            match self.inner.read(&mut self.buf[self.len..]) {
                Ok(0) => break,
                Ok(read) => self.len += read,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Returns as many of the next `n` bytes as are currently available
    /// (`< n` means the stream is short right now, not necessarily at EOF).
    /// Does not consume them.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        self.fill_to(n)?;
        Ok(&self.buf[..self.len.min(n)])
    }

    /// Drops `n` previously peeked bytes from the front of the buffer.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.len);
        let n = n.min(self.len);
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
    }

    /// Peeks then consumes exactly `n` bytes, or returns `Ok(None)` if fewer
    /// than `n` are currently available.
    pub fn take(&mut self, n: usize) -> io::Result<Option<Vec<u8>>> {
        if n > LOOKAHEAD_CAP {
            // Longer reads (string/byte-array payloads) bypass the lookahead
            // buffer: drain what's buffered, then read the rest directly.
            let mut out = vec![0u8; n];
            let buffered = self.len.min(n);
            out[..buffered].copy_from_slice(&self.buf[..buffered]);
            self.consume(buffered);
            if buffered < n {
                match self.inner.read_exact(&mut out[buffered..]) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
                    Err(e) => return Err(e),
                }
            }
            return Ok(Some(out));
        }
        self.fill_to(n)?;
        if self.len < n {
            return Ok(None);
        }
        let out = self.buf[..n].to_vec();
        self.consume(n);
        Ok(Some(out))
    }
}

/// Ownership sum for a byte source, replacing the reference
/// implementation's `owner: bool` construction flag.
pub enum Source<'a> {
    /// The `Reader` owns and will drop the source.
    Owned(Box<dyn Read + 'a>),
    /// The `Reader` borrows the source; the caller retains ownership.
    Borrowed(&'a mut dyn Read),
}

impl Read for Source<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Source::Owned(r) => r.read(buf),
            Source::Borrowed(r) => r.read(buf),
        }
    }
}

/// Ownership sum for a byte sink, the `Writer` analogue of [`Source`].
pub enum Sink<'a> {
    /// The `Writer` owns and will drop the sink.
    Owned(Box<dyn Write + 'a>),
    /// The `Writer` borrows the sink; the caller retains ownership.
    Borrowed(&'a mut dyn Write),
}

impl Write for Sink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Owned(w) => w.write(buf),
            Sink::Borrowed(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Owned(w) => w.flush(),
            Sink::Borrowed(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut r = PeekReader::new(&b"hello"[..]);
        assert_eq!(r.peek(3).unwrap(), b"hel");
        assert_eq!(r.peek(3).unwrap(), b"hel");
        assert_eq!(r.take(3).unwrap().unwrap(), b"hel");
        assert_eq!(r.take(2).unwrap().unwrap(), b"lo");
    }

    #[test]
    fn take_past_eof_returns_none() {
        let mut r = PeekReader::new(&b"ab"[..]);
        assert_eq!(r.take(5).unwrap(), None);
    }

    #[test]
    fn take_long_run_bypasses_lookahead_cap() {
        let data = vec![7u8; 100];
        let mut r = PeekReader::new(&data[..]);
        let out = r.take(100).unwrap().unwrap();
        assert_eq!(out, data);
    }
}
