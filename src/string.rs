//! Length-prefixed octet strings (RFC 7541 5.2): a 7-bit prefix integer
//! length whose top bit selects Huffman coding for the payload.

use algorithm::buf::{Binary, Bt, BtMut};

use crate::huffman::{HuffmanDecoder, HuffmanEncoder};
use crate::integer::{decode_integer, encode_integer};
use crate::{HpackError, HpackResult};

const HUFFMAN_FLAG: u8 = 0x80;

/// 字符串编码时是否使用哈夫曼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanPolicy {
    Never,
    Always,
    /// Huffman only when the coded form is strictly shorter.
    WhenSmaller,
}

/// Encodes `src` as a string literal. Returns the number of octets
/// written.
pub fn encode_string<B: Bt + BtMut>(src: &[u8], policy: HuffmanPolicy, buf: &mut B) -> usize {
    let huffman = match policy {
        HuffmanPolicy::Never => false,
        HuffmanPolicy::Always => true,
        HuffmanPolicy::WhenSmaller => HuffmanEncoder::new().encoded_len(src) < src.len(),
    };
    if huffman {
        let coded = HuffmanEncoder::new().encode(src);
        let count = encode_integer(coded.len() as u32, 7, HUFFMAN_FLAG, buf);
        buf.put_slice(&coded);
        count + coded.len()
    } else {
        let count = encode_integer(src.len() as u32, 7, 0x00, buf);
        buf.put_slice(src);
        count + src.len()
    }
}

/// Decodes one string literal, Huffman-decoding the payload when the
/// length prefix carries the flag.
pub fn decode_string<B: Bt>(buf: &mut B) -> HpackResult<Binary> {
    let (len, padding) = decode_integer(buf, 7)?;
    let len = len as usize;
    if len > buf.remaining() {
        return Err(HpackError::Truncated);
    }
    let result = if padding & HUFFMAN_FLAG == HUFFMAN_FLAG {
        let decoded = HuffmanDecoder::new().decode(&buf.chunk()[..len])?;
        Binary::copy_from_slice(&decoded)
    } else {
        Binary::copy_from_slice(&buf.chunk()[..len])
    };
    buf.advance(len);
    Ok(result)
}
