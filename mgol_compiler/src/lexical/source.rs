//! Byte sources with a single-byte pushback slot

use std::io::{self, BufReader, Cursor, ErrorKind, Read};

/// Sequential byte input as the scanner consumes it
pub trait CharSource {
    /// Next byte, or `None` at end of stream
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Return `byte` to the stream; only one byte may be pending at a time
    fn unread_byte(&mut self, byte: u8);
}

impl<T: CharSource + ?Sized> CharSource for &mut T {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn unread_byte(&mut self, byte: u8) {
        (**self).unread_byte(byte)
    }
}

impl<T: CharSource + ?Sized> CharSource for Box<T> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn unread_byte(&mut self, byte: u8) {
        (**self).unread_byte(byte)
    }
}

/// Buffered reader adapter
pub struct ByteSource<R: Read> {
    reader: BufReader<R>,
    pending: Option<u8>,
}

impl<R: Read> ByteSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            pending: None,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl ByteSource<Cursor<Vec<u8>>> {
    /// In-memory source over a copy of `text`
    pub fn from_text(text: &str) -> Self {
        Self::new(Cursor::new(text.as_bytes().to_vec()))
    }
}

impl<R: Read> CharSource for ByteSource<R> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(byte) = self.pending.take() {
            return Ok(Some(byte));
        }

        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn unread_byte(&mut self, byte: u8) {
        debug_assert!(self.pending.is_none(), "pushback slot already occupied");
        self.pending = Some(byte);
    }
}
