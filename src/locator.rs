// src/locator.rs
// Finding WAVEDESC and its byte order

use std::io::{self, Read, Seek, SeekFrom};

use tracing::debug;

use crate::enums::CommOrder;
use crate::error::{Result, TrcError};

pub const WAVEDESC_MARKER: &[u8; 8] = b"WAVEDESC";

/// Size of the preamble window searched for the marker.
pub const SEARCH_WINDOW: usize = 32;

/// Offset of COMM_ORDER from the start of the descriptor.
pub const COMM_ORDER_OFFSET: u64 = 34;

/// Where the descriptor starts and what the preamble says about file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLocation {
    pub start: u64,
    /// Preamble size prefix plus `start`; 0 when the descriptor opens the file.
    pub file_size: u64,
}

/// Scan the first 32 bytes of `source` for the WAVEDESC marker.
pub fn locate_header<R: Read + Seek>(source: &mut R) -> Result<HeaderLocation> {
    source.seek(SeekFrom::Start(0))?;

    let mut window = Vec::with_capacity(SEARCH_WINDOW);
    source.by_ref().take(SEARCH_WINDOW as u64).read_to_end(&mut window)?;

    let start = window
        .windows(WAVEDESC_MARKER.len())
        .position(|candidate| candidate == WAVEDESC_MARKER)
        .ok_or(TrcError::HeaderNotFound)?;

    let prefix = size_prefix(&window[..start]);
    let location = HeaderLocation {
        start: start as u64,
        file_size: prefix.saturating_add(start as u64),
    };
    debug!(start = location.start, file_size = location.file_size, "located WAVEDESC");
    Ok(location)
}

/// Little-endian unsigned value of the preamble bytes. Anything that does not
/// fit in a u64 is treated as absent.
fn size_prefix(bytes: &[u8]) -> u64 {
    let (low, high) = bytes.split_at(bytes.len().min(8));
    if high.iter().any(|&b| b != 0) {
        return 0;
    }
    low.iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

/// Read COMM_ORDER as a little-endian i16; only 0 and 1 are meaningful, and a
/// big-endian 0 reads the same either way.
pub fn resolve_byte_order<R: Read + Seek>(source: &mut R, header_start: u64) -> Result<CommOrder> {
    let offset = header_start + COMM_ORDER_OFFSET;
    source.seek(SeekFrom::Start(offset))?;

    let mut raw = [0u8; 2];
    source.read_exact(&mut raw).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => TrcError::TruncatedInput { offset, needed: 2 },
        _ => TrcError::Io(e),
    })?;

    let code = i16::from_le_bytes(raw);
    let order = CommOrder::from_code(code).map_err(|_| TrcError::InvalidByteOrderCode(code))?;
    debug!(order = order.label(), "resolved byte order");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn with_marker_at(offset: usize, prefix: &[u8]) -> Cursor<Vec<u8>> {
        let mut data = vec![0u8; 64];
        data[..prefix.len()].copy_from_slice(prefix);
        data[offset..offset + 8].copy_from_slice(WAVEDESC_MARKER);
        Cursor::new(data)
    }

    #[test]
    fn marker_at_file_start() {
        let mut source = with_marker_at(0, &[]);
        let location = locate_header(&mut source).unwrap();
        assert_eq!(location, HeaderLocation { start: 0, file_size: 0 });
    }

    #[test]
    fn size_prefix_is_added_to_offset() {
        let mut source = with_marker_at(4, &1000u32.to_le_bytes());
        let location = locate_header(&mut source).unwrap();
        assert_eq!(location.start, 4);
        assert_eq!(location.file_size, 1004);
    }

    #[test]
    fn oversized_prefix_falls_back_to_offset() {
        let mut source = with_marker_at(11, b"#9000012345");
        let location = locate_header(&mut source).unwrap();
        assert_eq!(location.start, 11);
        assert_eq!(location.file_size, 11);
    }

    #[test]
    fn missing_marker() {
        let mut source = Cursor::new(vec![0u8; 64]);
        assert!(matches!(locate_header(&mut source), Err(TrcError::HeaderNotFound)));
    }

    #[test]
    fn marker_beyond_window_is_not_found() {
        let mut source = with_marker_at(30, &[]);
        assert!(matches!(locate_header(&mut source), Err(TrcError::HeaderNotFound)));
    }

    #[test]
    fn short_source_is_searched() {
        let mut source = Cursor::new(b"WAVEDESC".to_vec());
        assert_eq!(locate_header(&mut source).unwrap().start, 0);
    }

    #[test]
    fn byte_order_codes() {
        let mut data = vec![0u8; 40];
        data[2 + 34] = 1;
        let mut source = Cursor::new(data);
        assert_eq!(resolve_byte_order(&mut source, 2).unwrap(), CommOrder::LoFirst);
        assert_eq!(resolve_byte_order(&mut source, 0).unwrap(), CommOrder::HiFirst);
    }

    #[test]
    fn invalid_byte_order_code() {
        let mut data = vec![0u8; 40];
        data[34] = 2;
        let mut source = Cursor::new(data);
        assert!(matches!(
            resolve_byte_order(&mut source, 0),
            Err(TrcError::InvalidByteOrderCode(2))
        ));
    }

    #[test]
    fn byte_order_past_end() {
        let mut source = Cursor::new(vec![0u8; 20]);
        assert!(matches!(
            resolve_byte_order(&mut source, 0),
            Err(TrcError::TruncatedInput { offset: 34, needed: 2 })
        ));
    }
}
