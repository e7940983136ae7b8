//! Byte-slice utilities for bounds-oriented parsing.
//!
//! Word documents are a flat run of small fixed-layout structures, so most parsing is
//! "read a little-endian field at a fixed offset of this payload". The helpers here return
//! `Option<T>` and never panic; callers decide whether a short read is an error or a default.
//!
//! All numeric reads are **little-endian**. Offsets are relative to the slice passed in.

/// Read `N` raw bytes at `offset`.
///
/// Returns `None` if the range is out of bounds.
pub(crate) fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    let bytes: [u8; N] = buf.get(offset..end)?.try_into().ok()?;
    Some(bytes)
}

/// Read a single byte at `offset`.
pub(crate) fn read_u8(buf: &[u8], offset: usize) -> Option<u8> {
    buf.get(offset).copied()
}

/// Read a `u16` (little-endian) at `offset`.
pub(crate) fn read_u16_le(buf: &[u8], offset: usize) -> Option<u16> {
    Some(u16::from_le_bytes(read_array::<2>(buf, offset)?))
}

/// Read a `u16` at `offset`, treating a truncated field as zero.
///
/// Used for fixed-layout records whose declared size has already been validated but whose
/// payload may have been cut short by the end of the file.
pub(crate) fn read_u16_le_or_zero(buf: &[u8], offset: usize) -> u16 {
    read_u16_le(buf, offset).unwrap_or(0)
}

/// Read a byte at `offset`, treating a truncated field as zero.
pub(crate) fn read_u8_or_zero(buf: &[u8], offset: usize) -> u8 {
    read_u8(buf, offset).unwrap_or(0)
}

/// Read the 16-bit little-endian value held in the first two bytes of `data`.
///
/// Returns `-1` when `data` holds fewer than two bytes.
///
/// ```
/// use psion_word::utils::word_value;
///
/// assert_eq!(word_value(&[4, 8]), 2052);
/// assert_eq!(word_value(&[4]), -1);
/// ```
pub fn word_value(data: &[u8]) -> i32 {
    match read_u16_le(data, 0) {
        Some(value) => i32::from(value),
        None => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_value_reads_little_endian() {
        assert_eq!(word_value(&[4, 8]), 2052);
        assert_eq!(word_value(&[0x00, 0x01]), 256);
        assert_eq!(word_value(&[0xff, 0xff]), 65535);
        // Extra bytes are ignored.
        assert_eq!(word_value(&[1, 0, 7]), 1);
    }

    #[test]
    fn test_word_value_short_input() {
        assert_eq!(word_value(&[4]), -1);
        assert_eq!(word_value(&[]), -1);
    }

    #[test]
    fn test_reads_out_of_bounds() {
        let buf = [1_u8, 2, 3];
        assert_eq!(read_u16_le(&buf, 1), Some(0x0302));
        assert_eq!(read_u16_le(&buf, 2), None);
        assert_eq!(read_u16_le(&buf, usize::MAX), None);
        assert_eq!(read_u16_le_or_zero(&buf, 2), 0);
        assert_eq!(read_u8_or_zero(&buf, 3), 0);
        assert_eq!(read_array::<3>(&buf, 0), Some([1, 2, 3]));
    }
}
