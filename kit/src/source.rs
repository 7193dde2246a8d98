//! Convenience input sources layered on top of `catena_core`'s bare
//! [`TokenSource`] trait: a `std::io::Read`-backed byte source, plus
//! one-line constructors for the common `&str`/`&[T]` cases.

use std::io::{self, Read};

use catena_core::source::{IterSource, SliceSource, TokenSource};

/// A byte source pulling from any [`Read`] implementation, e.g. a file or a
/// network socket. Reads are short-circuited to `0` on I/O error, which
/// `ParseState` sees as ordinary end-of-input — callers that care about the
/// distinction should check [`ReadSource::last_error`] after a parse fails
/// at end-of-input.
pub struct ReadSource<R> {
    reader: R,
    last_error: Option<io::Error>,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            last_error: None,
        }
    }

    /// The I/O error (if any) that caused the most recent `read` to report
    /// fewer tokens than requested.
    pub fn last_error(&self) -> Option<&io::Error> {
        self.last_error.as_ref()
    }
}

impl<R: Read> TokenSource<u8> for ReadSource<R> {
    fn read(&mut self, buf: &mut Vec<u8>, up_to: usize) -> usize {
        let start = buf.len();
        buf.resize(start + up_to, 0);
        let mut filled = 0;
        while filled < up_to {
            match self.reader.read(&mut buf[start + filled..start + up_to]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.last_error = Some(e);
                    break;
                }
            }
        }
        buf.truncate(start + filled);
        filled
    }
}

/// A char source decoding UTF-8 incrementally from any [`Read`], one byte
/// pulled from the reader at a time until a full code point is buffered.
/// Like [`ReadSource`], I/O errors and invalid byte sequences are reported
/// as ordinary end-of-input; check [`CharReaderSource::last_error`] to tell
/// the two apart.
pub struct CharReaderSource<R> {
    reader: R,
    pending: Vec<u8>,
    last_error: Option<io::Error>,
}

impl<R: Read> CharReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            last_error: None,
        }
    }

    pub fn last_error(&self) -> Option<&io::Error> {
        self.last_error.as_ref()
    }
}

/// Pulls the next decodable `char` out of `pending`, resyncing past invalid
/// byte sequences; returns `None` if `pending` holds no complete code point
/// yet (either empty, or a truncated multi-byte sequence awaiting more
/// bytes).
fn pop_char(pending: &mut Vec<u8>) -> Option<char> {
    loop {
        if pending.is_empty() {
            return None;
        }
        match std::str::from_utf8(pending) {
            Ok(s) => {
                let ch = s.chars().next()?;
                pending.drain(0..ch.len_utf8());
                return Some(ch);
            }
            Err(e) => {
                let valid_up_to = e.valid_up_to();
                if valid_up_to > 0 {
                    let ch = std::str::from_utf8(&pending[..valid_up_to])
                        .ok()
                        .and_then(|s| s.chars().next())?;
                    pending.drain(0..ch.len_utf8());
                    return Some(ch);
                }
                match e.error_len() {
                    Some(bad) => {
                        pending.drain(0..bad);
                        continue;
                    }
                    None => return None,
                }
            }
        }
    }
}

impl<R: Read> TokenSource<char> for CharReaderSource<R> {
    fn read(&mut self, buf: &mut Vec<char>, up_to: usize) -> usize {
        let mut produced = 0;
        let mut byte = [0u8; 1];
        while produced < up_to {
            if let Some(ch) = pop_char(&mut self.pending) {
                buf.push(ch);
                produced += 1;
                continue;
            }
            match self.reader.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => self.pending.push(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.last_error = Some(e);
                    break;
                }
            }
        }
        produced
    }
}

/// A zero-copy char source over a borrowed `&str`.
#[inline]
pub fn from_str(input: &str) -> IterSource<std::str::Chars<'_>> {
    IterSource::new(input.chars())
}

/// A zero-copy source over a borrowed slice of tokens.
#[inline]
pub fn from_slice<T: Clone>(input: &[T]) -> SliceSource<'_, T> {
    SliceSource::new(input)
}

/// A source over any `IntoIterator` of tokens, e.g. a `Vec<Token>` produced
/// by an earlier lexing pass.
#[inline]
pub fn from_iter<I: IntoIterator>(input: I) -> IterSource<I::IntoIter> {
    IterSource::new(input.into_iter())
}

/// A byte source pulling from any [`Read`] implementation.
#[inline]
pub fn from_read<R: Read>(reader: R) -> ReadSource<R> {
    ReadSource::new(reader)
}

/// A char source decoding UTF-8 incrementally from any [`Read`]
/// implementation, e.g. a file opened as bytes but parsed as text.
#[inline]
pub fn from_char_reader<R: Read>(reader: R) -> CharReaderSource<R> {
    CharReaderSource::new(reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_source_pulls_bytes_in_chunks() {
        let mut src = ReadSource::new(&b"hello"[..]);
        let mut buf = Vec::new();
        assert_eq!(src.read(&mut buf, 3), 3);
        assert_eq!(src.read(&mut buf, 3), 2);
        assert_eq!(buf, b"hello");
        assert_eq!(src.read(&mut buf, 3), 0);
        assert!(src.last_error().is_none());
    }

    #[test]
    fn from_str_yields_chars_in_order() {
        let mut src = from_str("ab");
        let mut buf = Vec::new();
        assert_eq!(src.read(&mut buf, 5), 2);
        assert_eq!(buf, vec!['a', 'b']);
    }

    #[test]
    fn from_slice_is_zero_copy_over_input() {
        let data = [1u8, 2, 3];
        let mut src = from_slice(&data);
        let mut buf = Vec::new();
        assert_eq!(src.read(&mut buf, 2), 2);
        assert_eq!(buf, vec![1, 2]);
    }

    #[test]
    fn from_iter_pulls_whatever_iterator_it_is_given() {
        let mut src = from_iter(vec!["a", "b", "c"]);
        let mut buf = Vec::new();
        assert_eq!(src.read(&mut buf, 10), 3);
        assert_eq!(buf, vec!["a", "b", "c"]);
    }

    #[test]
    fn from_char_reader_decodes_multibyte_utf8() {
        let mut src = from_char_reader("héllo".as_bytes());
        let mut buf = Vec::new();
        assert_eq!(src.read(&mut buf, 10), 5);
        assert_eq!(buf, vec!['h', 'é', 'l', 'l', 'o']);
        assert!(src.last_error().is_none());
    }

    #[test]
    fn from_char_reader_reads_incrementally_across_calls() {
        let mut src = from_char_reader("ab".as_bytes());
        let mut buf = Vec::new();
        assert_eq!(src.read(&mut buf, 1), 1);
        assert_eq!(src.read(&mut buf, 1), 1);
        assert_eq!(buf, vec!['a', 'b']);
    }
}
