//! Deterministic, seekable body pattern
//!
//! The canonical stream is the concatenation of 8-byte blocks: block `i` is
//! `i & 0x0FFF_FFFF` written as 7 lower-case, zero-padded hex digits followed
//! by a space:
//!
//! ```text
//! 0000000 0000001 0000002 0000003 ...
//! ```
//!
//! Every byte is a function of its absolute offset alone, so any sub-range can
//! be produced (and verified by a client) without materialising what comes
//! before it.

use crate::error::RangeError;

/// Width of one pattern block in bytes.
pub const BLOCK_LEN: u64 = 8;

const BLOCK_MASK: u64 = 0x0FFF_FFFF;
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Byte at absolute offset `offset` of the canonical stream.
#[inline]
pub const fn byte_at(offset: u64) -> u8 {
    let block = (offset / BLOCK_LEN) & BLOCK_MASK;
    let pos = offset % BLOCK_LEN;
    if pos == BLOCK_LEN - 1 {
        return b' ';
    }
    let shift = 4 * (6 - pos);
    HEX_DIGITS[((block >> shift) & 0xF) as usize]
}

/// Produce bytes `start..=end` of the canonical stream.
///
/// Fails with [`RangeError::Invalid`] when `start > end`.
///
/// # Examples
/// ```
/// use canned_origin::http::pattern::generate;
///
/// assert_eq!(generate(6, 16).unwrap(), b"0 0000001 0");
/// ```
pub fn generate(start: u64, end: u64) -> Result<Vec<u8>, RangeError> {
    if start > end {
        return Err(RangeError::Invalid {
            start,
            end,
            len: 0,
        });
    }
    Ok((start..=end).map(byte_at).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_blocks() {
        assert_eq!(generate(0, 23).unwrap(), b"0000000 0000001 0000002 ");
    }

    #[test]
    fn test_canonical_range() {
        assert_eq!(generate(6, 16).unwrap(), b"0 0000001 0");
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(generate(7, 7).unwrap(), b" ");
        assert_eq!(generate(14, 14).unwrap(), b"1");
    }

    #[test]
    fn test_hex_digits_are_lower_case() {
        // block 0xab starts at offset 0xab * 8
        let start = 0xab * BLOCK_LEN;
        assert_eq!(generate(start, start + 7).unwrap(), b"00000ab ");
    }

    #[test]
    fn test_block_index_wraps_at_28_bits() {
        let wrapped = (BLOCK_MASK + 1) * BLOCK_LEN;
        assert_eq!(generate(wrapped, wrapped + 7).unwrap(), b"0000000 ");
        let last = BLOCK_MASK * BLOCK_LEN;
        assert_eq!(generate(last, last + 7).unwrap(), b"fffffff ");
    }

    #[test]
    fn test_deterministic_and_seekable() {
        let whole = generate(0, 4095).unwrap();
        for (a, b) in [(0, 0), (3, 9), (100, 1000), (4000, 4095), (8, 15)] {
            let part = generate(a, b).unwrap();
            assert_eq!(part, generate(a, b).unwrap());
            assert_eq!(part.len() as u64, b - a + 1);
            assert_eq!(part.as_slice(), &whole[a as usize..=b as usize]);
        }
    }

    #[test]
    fn test_reversed_bounds_rejected() {
        assert!(matches!(
            generate(10, 5),
            Err(RangeError::Invalid { start: 10, end: 5, .. })
        ));
    }
}
