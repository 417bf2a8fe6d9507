/// Big-endian reader over an untrusted byte slice.
///
/// Every read is checked against the bytes that remain. A read that does not
/// fit returns `None` and leaves the position unchanged, so callers can bail
/// out with `?` without ever indexing past the end of the buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `n` bytes as a sub-slice.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if n > self.remaining() {
            return None;
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Some(out)
    }

    pub fn skip(&mut self, n: usize) -> Option<()> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        self.take(2).map(|b| u16::from_be_bytes([b[0], b[1]]))
    }

    /// Read a 3-byte big-endian length, as used by TLS handshake headers.
    pub fn read_u24(&mut self) -> Option<u32> {
        self.take(3)
            .map(|b| u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    /// Read a 1-byte length prefix followed by that many bytes.
    pub fn read_vec_u8(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        let len = self.read_u8()? as usize;
        self.take(len).or_else(|| {
            self.pos = start;
            None
        })
    }

    /// Read a 2-byte length prefix followed by that many bytes.
    pub fn read_vec_u16(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        let len = self.read_u16()? as usize;
        self.take(len).or_else(|| {
            self.pos = start;
            None
        })
    }
}
