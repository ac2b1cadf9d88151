use std::io::{self, Read};

use byteorder::{NetworkEndian, ReadBytesExt};

/// A forward-only reader of big-endian fields
///
/// Wraps any byte source (a slice while decoding headers in memory, a file while peeking at
/// the primary header) and keeps count of how many bytes have been consumed so far.
pub struct ByteCursor<R> {
    reader: R,
    position: usize,
}

impl<R: Read> ByteCursor<R> {
    pub fn new(reader: R) -> ByteCursor<R> {
        ByteCursor { reader, position: 0 }
    }

    /// Number of bytes read so far
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let v = self.reader.read_u8()?;
        self.position += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        let v = self.reader.read_u16::<NetworkEndian>()?;
        self.position += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        let v = self.reader.read_u32::<NetworkEndian>()?;
        self.position += 4;
        Ok(v)
    }

    pub fn read_u64(&mut self) -> io::Result<u64> {
        let v = self.reader.read_u64::<NetworkEndian>()?;
        self.position += 8;
        Ok(v)
    }

    /// Reads a fixed-size field, like a 32 byte projection name
    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.reader.read_exact(&mut buf)?;
        self.position += N;
        Ok(buf)
    }

    /// Reads exactly `len` bytes into a new buffer
    ///
    /// The buffer grows as data arrives, so a bogus length read from a corrupt file won't
    /// allocate gigabytes up front.  On a short read the bytes that did arrive are still
    /// counted as consumed.
    pub fn read_blob(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
        self.position += buf.len();
        if buf.len() != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("wanted {} bytes, only got {}", len, buf.len()),
            ));
        }
        Ok(buf)
    }

    /// Reads at most `len` bytes, stopping early at the end of the source
    pub fn read_up_to(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
        self.position += buf.len();
        Ok(buf)
    }

    /// Reads everything that's left
    pub fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        self.position += buf.len();
        Ok(buf)
    }

}

impl<'a> ByteCursor<&'a [u8]> {
    /// The bytes that haven't been read yet
    pub fn remaining(&self) -> &'a [u8] {
        self.reader
    }
}
