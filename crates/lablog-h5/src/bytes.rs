//! Little-endian cursor over a byte slice.

use crate::error::H5Error;

/// Bounds-checked little-endian reader.
///
/// Every read returns [`H5Error::UnexpectedEof`] instead of panicking when
/// the slice runs out, so corrupt files surface as errors.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Start reading at `pos`. Out-of-range positions fail on first read.
    pub(crate) fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], H5Error> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(H5Error::UnexpectedEof {
                expected: self.pos.saturating_add(n),
                available: self.data.len(),
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, n: usize) -> Result<(), H5Error> {
        self.take(n).map(|_| ())
    }

    pub(crate) fn u8(&mut self) -> Result<u8, H5Error> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, H5Error> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, H5Error> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, H5Error> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_le_bytes(buf))
    }

    /// Read an unsigned integer stored in `width` bytes (1, 2, 4 or 8).
    pub(crate) fn uint(&mut self, width: usize) -> Result<u64, H5Error> {
        let b = self.take(width)?;
        Ok(b.iter()
            .rev()
            .fold(0u64, |acc, &byte| (acc << 8) | byte as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.u8().unwrap(), 0x01);
        assert_eq!(r.u16().unwrap(), 0x0302);
        assert_eq!(r.u32().unwrap(), 0x0706_0504);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn variable_width_uint() {
        let data = [0x34, 0x12, 0xff];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.uint(2).unwrap(), 0x1234);
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn short_read_is_eof_not_panic() {
        let data = [0u8; 3];
        let mut r = ByteReader::at(&data, 2);
        match r.u32() {
            Err(H5Error::UnexpectedEof {
                expected,
                available,
            }) => {
                assert_eq!(expected, 6);
                assert_eq!(available, 3);
            }
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }

    #[test]
    fn position_past_end_fails_cleanly() {
        let data = [0u8; 2];
        let mut r = ByteReader::at(&data, 100);
        assert_eq!(r.remaining(), 0);
        assert!(r.u8().is_err());
    }
}
