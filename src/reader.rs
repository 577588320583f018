// src/reader.rs
// Positioned, byte-order aware reads over a seekable source

use std::io::{self, Read, Seek, SeekFrom};

use crate::enums::CommOrder;
use crate::error::{Result, TrcError};

/// Wraps the caller's source with the byte order resolved from COMM_ORDER.
/// The position is tracked locally so truncation errors can name the offset.
pub(crate) struct ByteReader<'a, R> {
    inner: &'a mut R,
    order: CommOrder,
    pos: u64,
}

macro_rules! read_number {
    ($name:ident, $ty:ty) => {
        pub(crate) fn $name(&mut self) -> Result<$ty> {
            let bytes = self.read_array()?;
            Ok(match self.order {
                CommOrder::HiFirst => <$ty>::from_be_bytes(bytes),
                CommOrder::LoFirst => <$ty>::from_le_bytes(bytes),
            })
        }
    };
}

impl<'a, R: Read + Seek> ByteReader<'a, R> {
    pub(crate) fn new(inner: &'a mut R, order: CommOrder) -> Result<Self> {
        let pos = inner.stream_position()?;
        Ok(ByteReader { inner, order, pos })
    }

    pub(crate) fn order(&self) -> CommOrder {
        self.order
    }

    pub(crate) fn position(&self) -> u64 {
        self.pos
    }

    pub(crate) fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.pos = self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Bytes left between the current position and the end of the source.
    pub(crate) fn remaining(&mut self) -> Result<u64> {
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(self.pos))?;
        Ok(end.saturating_sub(self.pos))
    }

    /// Fail with `TruncatedInput` before allocating when fewer than `needed`
    /// bytes remain.
    pub(crate) fn ensure_available(&mut self, needed: u64) -> Result<()> {
        if self.remaining()? < needed {
            return Err(TrcError::TruncatedInput {
                offset: self.pos,
                needed,
            });
        }
        Ok(())
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.pos += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(TrcError::TruncatedInput {
                offset: self.pos,
                needed: buf.len() as u64,
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn read_i8(&mut self) -> Result<i8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte as i8)
    }

    read_number!(read_i16, i16);
    read_number!(read_i32, i32);
    read_number!(read_f32, f32);
    read_number!(read_f64, f64);

    /// Fixed-width text field with trailing NUL padding removed.
    pub(crate) fn read_string(&mut self, width: usize, field: &'static str) -> Result<String> {
        let raw = self.read_bytes(width)?;
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        String::from_utf8(raw[..end].to_vec()).map_err(|_| TrcError::InvalidText { field })
    }

    /// `count` signed samples of `width` bytes each, widened to f64.
    pub(crate) fn read_samples(&mut self, count: usize, width: usize) -> Result<Vec<f64>> {
        let len = count * width;
        self.ensure_available(len as u64)?;
        let raw = self.read_bytes(len)?;
        let order = self.order;

        let samples = if width == 1 {
            raw.iter().map(|&b| f64::from(b as i8)).collect()
        } else {
            raw.chunks_exact(2)
                .map(|pair| {
                    let pair = [pair[0], pair[1]];
                    let value = match order {
                        CommOrder::HiFirst => i16::from_be_bytes(pair),
                        CommOrder::LoFirst => i16::from_le_bytes(pair),
                    };
                    f64::from(value)
                })
                .collect()
        };
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_in_both_orders() {
        let mut be = Cursor::new(vec![0x01, 0x02, 0x3f, 0x80, 0x00, 0x00]);
        let mut reader = ByteReader::new(&mut be, CommOrder::HiFirst).unwrap();
        assert_eq!(reader.read_i16().unwrap(), 0x0102);
        assert_eq!(reader.read_f32().unwrap(), 1.0);

        let mut le = Cursor::new(vec![0x02, 0x01, 0x00, 0x00, 0x80, 0x3f]);
        let mut reader = ByteReader::new(&mut le, CommOrder::LoFirst).unwrap();
        assert_eq!(reader.read_i16().unwrap(), 0x0102);
        assert_eq!(reader.read_f32().unwrap(), 1.0);
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn strips_nul_padding() {
        let mut raw = b"LECROY_2_3".to_vec();
        raw.resize(16, 0);
        let mut source = Cursor::new(raw);
        let mut reader = ByteReader::new(&mut source, CommOrder::LoFirst).unwrap();
        assert_eq!(reader.read_string(16, "TEMPLATE_NAME").unwrap(), "LECROY_2_3");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let mut source = Cursor::new(vec![0xff, 0xfe, 0, 0]);
        let mut reader = ByteReader::new(&mut source, CommOrder::LoFirst).unwrap();
        let err = reader.read_string(4, "TRACE_LABEL").unwrap_err();
        assert!(matches!(err, TrcError::InvalidText { field: "TRACE_LABEL" }));
    }

    #[test]
    fn truncation_reports_offset() {
        let mut source = Cursor::new(vec![0u8; 3]);
        let mut reader = ByteReader::new(&mut source, CommOrder::LoFirst).unwrap();
        reader.read_i16().unwrap();
        let err = reader.read_i32().unwrap_err();
        assert!(matches!(err, TrcError::TruncatedInput { offset: 2, needed: 4 }));
    }

    #[test]
    fn word_samples_follow_byte_order() {
        let mut source = Cursor::new(vec![0xff, 0xfe, 0x00, 0x10]);
        let mut reader = ByteReader::new(&mut source, CommOrder::HiFirst).unwrap();
        assert_eq!(reader.read_samples(2, 2).unwrap(), vec![-2.0, 16.0]);
    }

    #[test]
    fn byte_samples_are_signed() {
        let mut source = Cursor::new(vec![0x80, 0x7f, 0x00]);
        let mut reader = ByteReader::new(&mut source, CommOrder::LoFirst).unwrap();
        assert_eq!(reader.read_samples(3, 1).unwrap(), vec![-128.0, 127.0, 0.0]);
    }

    #[test]
    fn short_payload_is_rejected_before_reading() {
        let mut source = Cursor::new(vec![0u8; 5]);
        let mut reader = ByteReader::new(&mut source, CommOrder::LoFirst).unwrap();
        let err = reader.read_samples(3, 2).unwrap_err();
        assert!(matches!(err, TrcError::TruncatedInput { offset: 0, needed: 6 }));
        assert_eq!(reader.position(), 0);
    }
}
