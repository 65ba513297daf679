//! Input sources: lazy sequences of runes stamped with their location.
//!
//! [`ReaderInput`] decodes UTF-8 incrementally from any [`Read`], so the
//! scanner never needs the whole input in memory. [`RuneInput`] replays an
//! already decoded run of runes and is what nested scanning feeds on.

use std::collections::VecDeque;
use std::io::{self, Read};

use super::Location;

const CHUNK: usize = 8 * 1024;

/// A decoded code point and the location where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rune {
    pub ch: char,
    pub location: Location,
}

/// One item produced by an [`Input`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Rune(Rune),
    /// An ill-formed UTF-8 sequence. It occupies no column.
    Invalid { bytes: Vec<u8>, location: Location },
}

/// A lazy, location-stamped rune sequence.
pub trait Input {
    /// Returns the next item, or `None` once the input is exhausted.
    fn next_decoded(&mut self) -> io::Result<Option<Decoded>>;

    /// Location just past the last rune returned so far.
    fn location(&self) -> Location;
}

/// Incremental UTF-8 decoder over a byte reader.
pub struct ReaderInput<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    location: Location,
}

impl<R: Read> ReaderInput<R> {
    /// Creates a decoder reading from `reader`.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            pos: 0,
            eof: false,
            location: Location::default(),
        }
    }

    fn available(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Reads until at least `need` bytes are buffered or the reader is done.
    fn fill(&mut self, need: usize) -> io::Result<()> {
        while self.available() < need && !self.eof {
            if self.pos > 0 {
                self.buf.drain(..self.pos);
                self.pos = 0;
            }
            let start = self.buf.len();
            self.buf.resize(start + CHUNK, 0);
            let read = loop {
                match self.reader.read(&mut self.buf[start..]) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        self.buf.truncate(start);
                        return Err(e);
                    }
                }
            };
            self.buf.truncate(start + read);
            if read == 0 {
                self.eof = true;
            }
        }
        Ok(())
    }

    fn rune(&mut self, ch: char, width: usize) -> Decoded {
        let location = self.location;
        self.pos += width;
        self.location = location.advance(ch);
        Decoded::Rune(Rune { ch, location })
    }

    fn invalid(&mut self, len: usize) -> Decoded {
        let bytes = self.buf[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Decoded::Invalid {
            bytes,
            location: self.location,
        }
    }
}

impl<R: Read> Input for ReaderInput<R> {
    fn next_decoded(&mut self) -> io::Result<Option<Decoded>> {
        self.fill(1)?;
        if self.available() == 0 {
            return Ok(None);
        }

        let lead = self.buf[self.pos];
        // Width and the permitted range of the second byte, per RFC 3629.
        let (width, lo, hi) = match lead {
            0x00..=0x7F => return Ok(Some(self.rune(char::from(lead), 1))),
            0xC2..=0xDF => (2, 0x80, 0xBF),
            0xE0 => (3, 0xA0, 0xBF),
            0xE1..=0xEC | 0xEE..=0xEF => (3, 0x80, 0xBF),
            0xED => (3, 0x80, 0x9F),
            0xF0 => (4, 0x90, 0xBF),
            0xF1..=0xF3 => (4, 0x80, 0xBF),
            0xF4 => (4, 0x80, 0x8F),
            _ => return Ok(Some(self.invalid(1))),
        };

        self.fill(width)?;
        let mut len = 1;
        while len < width && self.pos + len < self.buf.len() {
            let byte = self.buf[self.pos + len];
            let (min, max) = if len == 1 { (lo, hi) } else { (0x80, 0xBF) };
            if !(min..=max).contains(&byte) {
                break;
            }
            len += 1;
        }
        if len < width {
            return Ok(Some(self.invalid(len)));
        }

        let decoded = std::str::from_utf8(&self.buf[self.pos..self.pos + width])
            .ok()
            .and_then(|s| s.chars().next());
        Ok(Some(match decoded {
            Some(ch) => self.rune(ch, width),
            None => self.invalid(width),
        }))
    }

    fn location(&self) -> Location {
        self.location
    }
}

/// Replays a run of already decoded runes.
#[derive(Debug, Clone, Default)]
pub struct RuneInput {
    runes: VecDeque<Rune>,
    end: Location,
}

impl RuneInput {
    /// Creates an input over `runes`; `end` is the location just past them.
    #[must_use]
    pub fn new(runes: impl IntoIterator<Item = Rune>, end: Location) -> Self {
        Self {
            runes: runes.into_iter().collect(),
            end,
        }
    }
}

impl Input for RuneInput {
    fn next_decoded(&mut self) -> io::Result<Option<Decoded>> {
        Ok(self.runes.pop_front().map(Decoded::Rune))
    }

    fn location(&self) -> Location {
        self.runes.front().map_or(self.end, |r| r.location)
    }
}
