//! Checked little-endian integer reads from byte windows.
//!
//! Every reader returns [`ReadError`] instead of reading past the end of the
//! buffer, so a corrupt chunk size can never turn into an out-of-bounds read.

use crate::error::ReadError;

fn take<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], ReadError> {
    let err = ReadError { offset, width: N, len: buf.len() };
    let end = offset.checked_add(N).ok_or(err)?;
    let bytes = buf.get(offset..end).ok_or(err)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

pub fn read_u32_le(buf: &[u8], offset: usize) -> Result<u32, ReadError> {
    take::<4>(buf, offset).map(u32::from_le_bytes)
}

pub fn read_i32_le(buf: &[u8], offset: usize) -> Result<i32, ReadError> {
    take::<4>(buf, offset).map(i32::from_le_bytes)
}

pub fn read_i16_le(buf: &[u8], offset: usize) -> Result<i16, ReadError> {
    take::<2>(buf, offset).map(i16::from_le_bytes)
}

pub fn read_u16_le(buf: &[u8], offset: usize) -> Result<u16, ReadError> {
    take::<2>(buf, offset).map(u16::from_le_bytes)
}

/// Read a 4-byte ASCII tag such as `RIFF` or `fmt `.
pub fn read_tag(buf: &[u8], offset: usize) -> Result<[u8; 4], ReadError> {
    take::<4>(buf, offset)
}

/// Convert a "binary string" (one char per byte, as returned by `atob`) to bytes.
///
/// Code points above 0xFF keep only their low byte.
pub fn bytes_from_binary_string(raw: &str) -> Vec<u8> {
    raw.chars().map(|c| (c as u32 & 0xFF) as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reads_at_offset() {
        let buf = [0xAA, 0x44, 0xAC, 0x00, 0x00, 0xFE, 0xFF];
        assert_eq!(read_u32_le(&buf, 1).unwrap(), 44_100);
        assert_eq!(read_i16_le(&buf, 5).unwrap(), -2);
        assert_eq!(read_u16_le(&buf, 5).unwrap(), 0xFFFE);
        assert_eq!(read_i32_le(&[0xFF, 0xFF, 0xFF, 0xFF], 0).unwrap(), -1);
    }

    #[test]
    fn test_read_past_end_is_error() {
        let buf = [1u8, 2, 3];
        let err = read_u32_le(&buf, 0).unwrap_err();
        assert_eq!(err, ReadError { offset: 0, width: 4, len: 3 });
        assert!(read_i16_le(&buf, 2).is_err());
        assert!(read_i16_le(&buf, usize::MAX).is_err());
        assert!(read_i16_le(&[], 0).is_err());
    }

    #[test]
    fn test_binary_string_bytes() {
        assert_eq!(bytes_from_binary_string("RIFF"), b"RIFF".to_vec());
        assert_eq!(bytes_from_binary_string("\u{00}\u{FF}\u{0141}"), vec![0x00, 0xFF, 0x41]);
    }

    proptest! {
        #[test]
        fn prop_u32_round_trip(b in any::<[u8; 4]>()) {
            let v = read_u32_le(&b, 0).unwrap();
            prop_assert_eq!(v.to_le_bytes(), b);
        }

        #[test]
        fn prop_i16_round_trip(b in any::<[u8; 2]>()) {
            let v = read_i16_le(&b, 0).unwrap();
            prop_assert_eq!(v.to_le_bytes(), b);
        }

        #[test]
        fn prop_reads_never_panic(buf in prop::collection::vec(any::<u8>(), 0..16), offset in 0usize..32) {
            let _ = read_u32_le(&buf, offset);
            let _ = read_i16_le(&buf, offset);
            prop_assert_eq!(read_u32_le(&buf, offset).is_ok(), offset + 4 <= buf.len());
        }
    }
}
