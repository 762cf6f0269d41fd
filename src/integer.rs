//! The prefix-N integer primitive every hpack representation is built on
//! (RFC 7541 5.1). The value lives in the low N bits of the first octet;
//! `padding` carries the representation's pattern in the high `8 - N` bits.

use algorithm::buf::{Bt, BtMut};

use crate::{HpackError, HpackResult};

fn prefix_mask(prefix_size: u8) -> u8 {
    debug_assert!(prefix_size >= 1 && prefix_size <= 8);
    if prefix_size == 8 {
        0xFF
    } else {
        (1u8 << prefix_size) - 1
    }
}

/// Encodes `value` with the given prefix size, merging `padding` into the
/// bits above the prefix. Returns the number of octets written.
pub fn encode_integer<B: Bt + BtMut>(
    value: u32,
    prefix_size: u8,
    padding: u8,
    buf: &mut B,
) -> usize {
    let mask = prefix_mask(prefix_size);
    if value < mask as u32 {
        buf.put_u8((padding & !mask) | value as u8);
        return 1;
    }

    buf.put_u8(padding | mask);
    let mut count = 1;
    let mut value = value - mask as u32;
    while value >= 128 {
        buf.put_u8((value % 128) as u8 | 0x80);
        value /= 128;
        count += 1;
    }
    buf.put_u8(value as u8);
    count + 1
}

/// Decodes a prefix integer, returning the value and the bits above the
/// prefix of the first octet.
///
/// The continuation loop is bounded by the 32-bit accounting width: a
/// chunk that would shift set bits past it, a shift at or beyond it, or
/// an addition past `u32::MAX` all fail with `IntegerOverflow`. Input
/// running out mid-integer fails with `Truncated`.
pub fn decode_integer<B: Bt>(buf: &mut B, prefix_size: u8) -> HpackResult<(u32, u8)> {
    if !buf.has_remaining() {
        return Err(HpackError::Truncated);
    }
    let mask = prefix_mask(prefix_size);
    let b = buf.get_u8();
    let padding = b & !mask;
    let mut value = (b & mask) as u32;
    if value < mask as u32 {
        return Ok((value, padding));
    }

    let mut shift: u32 = 0;
    loop {
        if !buf.has_remaining() {
            return Err(HpackError::Truncated);
        }
        let b = buf.get_u8();
        let chunk = (b & 0x7F) as u32;
        if shift >= 32 || (shift > 0 && chunk >> (32 - shift) != 0) {
            return Err(HpackError::IntegerOverflow);
        }
        value = value
            .checked_add(chunk << shift)
            .ok_or(HpackError::IntegerOverflow)?;
        shift += 7;
        if b & 0x80 == 0 {
            return Ok((value, padding));
        }
    }
}
