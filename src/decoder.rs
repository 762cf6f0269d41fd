//! Exposes the struct `Decoder` that allows for hpack-encoded header
//! blocks to be decoded into a header list.
//!
//! The decoder only follows hpack rules, without performing any
//! additional (semantic) checks on the header name/value pairs, i.e. it
//! considers the headers as opaque octets. One call decodes one complete
//! header block: in HTTP/2 all CONTINUATION frames must be concatenated
//! into a single buffer before being passed in, and the sequence of
//! table insertions it performs mirrors, byte for byte, the insertions
//! the encoder performed while producing the block.
//!
//! # Example
//!
//! A simple example of using the decoder that demonstrates its API:
//!
//! ```rust
//! use hpackparse::Decoder;
//! use algorithm::buf::{Binary, Bt};
//! let mut decoder = Decoder::new();
//!
//! let mut buf = Binary::from_static(&[0x82, 0x84]);
//! let header_list = decoder.decode(&mut buf).unwrap();
//!
//! assert_eq!(header_list[0].name.chunk(), b":method");
//! assert_eq!(header_list[0].value.chunk(), b"GET");
//! assert_eq!(header_list[1].name.chunk(), b":path");
//! assert_eq!(header_list[1].value.chunk(), b"/");
//! ```
//!
//! A table size update is not a header: callers that need to observe
//! them use the callback API, which yields tagged `HeaderEvent`s.
//!
//! ```rust
//! use hpackparse::{Decoder, HeaderEvent};
//! use algorithm::buf::Binary;
//! let mut decoder = Decoder::new();
//!
//! let mut buf = Binary::from_static(&[0x20, 0x82]);
//! let mut events = Vec::new();
//! decoder.decode_with_cb(&mut buf, |event| events.push(event)).unwrap();
//!
//! assert_eq!(events[0], HeaderEvent::SizeUpdate(0));
//! assert!(matches!(events[1], HeaderEvent::Field(_)));
//! ```

use algorithm::buf::{Binary, Bt};

use crate::dynamic_table::DynamicTable;
use crate::field::HeaderField;
use crate::integer::decode_integer;
use crate::static_table;
use crate::string::decode_string;
use crate::{HpackError, HpackResult, DEFAULT_SETTINGS_HEADER_TABLE_SIZE};

/// Different variants of how a particular header field can be
/// represented in an hpack encoding.
enum FieldRepresentation {
    Indexed,
    LiteralWithIncrementalIndexing,
    SizeUpdate,
    LiteralNeverIndexed,
    LiteralWithoutIndexing,
}

impl FieldRepresentation {
    /// Based on the given octet, returns the type of the field
    /// representation. The given octet should be the top-order byte of
    /// the header field that is about to be decoded.
    fn new(octet: u8) -> FieldRepresentation {
        if octet & 128 == 128 {
            // High-order bit set
            FieldRepresentation::Indexed
        } else if octet & 64 == 64 {
            // Bit pattern `01`
            FieldRepresentation::LiteralWithIncrementalIndexing
        } else if octet & 32 == 32 {
            // Bit pattern `001`
            FieldRepresentation::SizeUpdate
        } else if octet & 16 == 16 {
            // Bit pattern `0001`
            FieldRepresentation::LiteralNeverIndexed
        } else {
            // None of the top 4 bits is set => bit pattern `0000xxxx`
            FieldRepresentation::LiteralWithoutIndexing
        }
    }
}

/// One decoded item: a header field, or a table size update the peer
/// folded into the block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderEvent {
    Field(HeaderField),
    SizeUpdate(u32),
}

/// Where we are inside the current header block. Size updates are only
/// legal before the first header, at most two of them.
#[derive(Clone, Copy, PartialEq)]
enum BlockState {
    Start,
    AfterSizeUpdate(u8),
    InBlock,
}

/// Decodes headers encoded using hpack, maintaining the dynamic table
/// state necessary to correctly decode subsequent blocks on the same
/// connection.
pub struct Decoder {
    table: DynamicTable,
}

impl Decoder {
    /// Creates a new `Decoder` with the default dynamic table budget.
    pub fn new() -> Decoder {
        Decoder::with_max_table_size(DEFAULT_SETTINGS_HEADER_TABLE_SIZE)
    }

    /// Creates a new `Decoder` whose dynamic table is bounded by the
    /// local SETTINGS_HEADER_TABLE_SIZE value.
    pub fn with_max_table_size(max_size: usize) -> Decoder {
        Decoder {
            table: DynamicTable::new(max_size),
        }
    }

    /// Applies a new local SETTINGS_HEADER_TABLE_SIZE value.
    pub fn set_max_table_size(&mut self, new_max_size: usize) {
        self.table.set_max_capacity(new_max_size);
    }

    pub fn table(&self) -> &DynamicTable {
        &self.table
    }

    /// Decodes one header block, invoking the callback `cb` for each
    /// event in turn.
    ///
    /// If an error is encountered during the decoding of any
    /// representation, decoding halts and the appropriate error is
    /// returned as the `Err` variant of the `Result`. Every decode error
    /// is fatal to the connection; the partially delivered events must
    /// be discarded.
    pub fn decode_with_cb<B: Bt, F>(&mut self, buf: &mut B, mut cb: F) -> HpackResult<()>
    where
        F: FnMut(HeaderEvent),
    {
        let mut state = BlockState::Start;
        let mut count = 0;
        while buf.has_remaining() {
            cb(self.decode_event(buf, &mut state)?);
            count += 1;
        }
        log::trace!("HPACK: 解码头块完成; events={}", count);
        Ok(())
    }

    /// Decodes one header block into a list of fields. Table size
    /// updates are applied to the dynamic table and omitted from the
    /// returned list.
    pub fn decode<B: Bt>(&mut self, buf: &mut B) -> HpackResult<Vec<HeaderField>> {
        let mut header_list = Vec::new();
        self.decode_with_cb(buf, |event| {
            if let HeaderEvent::Field(field) = event {
                header_list.push(field);
            }
        })?;
        Ok(header_list)
    }

    /// Consumes exactly one representation from the input.
    fn decode_event<B: Bt>(&mut self, buf: &mut B, state: &mut BlockState) -> HpackResult<HeaderEvent> {
        if !buf.has_remaining() {
            return Err(HpackError::Truncated);
        }
        let initial_octet = buf.chunk()[0];
        match FieldRepresentation::new(initial_octet) {
            FieldRepresentation::Indexed => {
                *state = BlockState::InBlock;
                let (index, _) = decode_integer(buf, 7)?;
                if index == 0 {
                    return Err(HpackError::ProtocolError);
                }
                let (name, value) = self.get_from_table(index as usize)?;
                Ok(HeaderEvent::Field(HeaderField::new(name, value)))
            }
            FieldRepresentation::LiteralWithIncrementalIndexing => {
                *state = BlockState::InBlock;
                let field = self.decode_literal(buf, 6)?;
                self.table.insert(field.name.clone(), field.value.clone());
                Ok(HeaderEvent::Field(field))
            }
            FieldRepresentation::LiteralWithoutIndexing => {
                *state = BlockState::InBlock;
                let field = self.decode_literal(buf, 4)?;
                Ok(HeaderEvent::Field(field))
            }
            FieldRepresentation::LiteralNeverIndexed => {
                *state = BlockState::InBlock;
                let mut field = self.decode_literal(buf, 4)?;
                field.never_indexed = true;
                Ok(HeaderEvent::Field(field))
            }
            FieldRepresentation::SizeUpdate => {
                let seen = match *state {
                    BlockState::Start => 0,
                    BlockState::AfterSizeUpdate(n) => n,
                    BlockState::InBlock => return Err(HpackError::ProtocolError),
                };
                if seen >= 2 {
                    return Err(HpackError::ProtocolError);
                }
                let (new_capacity, _) = decode_integer(buf, 5)?;
                self.table.set_capacity(new_capacity as usize)?;
                log::trace!("HPACK: 动态表容量调整为{}", new_capacity);
                *state = BlockState::AfterSizeUpdate(seen + 1);
                Ok(HeaderEvent::SizeUpdate(new_capacity))
            }
        }
    }

    /// Gets the header `(name, value)` pair with the given index from
    /// the single index space: the static table occupies 1..=61, the
    /// dynamic table follows, newest first.
    fn get_from_table(&self, index: usize) -> HpackResult<(Binary, Binary)> {
        if index <= static_table::SIZE {
            let (name, value) = static_table::get(index).ok_or(HpackError::IndexOutOfRange)?;
            Ok((Binary::from_static(name), Binary::from_static(value)))
        } else {
            self.table.lookup(index - static_table::SIZE)
        }
    }

    /// Decodes a literal header representation: a name index (or a name
    /// literal when the index is zero), then a value literal.
    fn decode_literal<B: Bt>(&mut self, buf: &mut B, prefix_size: u8) -> HpackResult<HeaderField> {
        let (index, _) = decode_integer(buf, prefix_size)?;
        let name = if index == 0 {
            decode_string(buf)?
        } else {
            let (name, _) = self.get_from_table(index as usize)?;
            name
        };
        let value = decode_string(buf)?;
        Ok(HeaderField::new(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Helper;

    fn block(hex: &str) -> Binary {
        Binary::copy_from_slice(&Helper::hexstr_to_vec(hex))
    }

    #[test]
    fn indexed_static_header() {
        let mut decoder = Decoder::new();
        let fields = decoder.decode(&mut block("82")).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name.chunk(), b":method");
        assert_eq!(fields[0].value.chunk(), b"GET");
        assert!(!fields[0].never_indexed);
        assert_eq!(decoder.table().len(), 0);
    }

    #[test]
    fn literal_with_incremental_indexing() {
        // RFC 7541 C.2.1
        let mut decoder = Decoder::new();
        let fields = decoder
            .decode(&mut block(
                "400a 6375 7374 6f6d 2d6b 6579 0d63 7573 746f 6d2d 6865 6164 6572",
            ))
            .unwrap();
        assert_eq!(fields[0].name.chunk(), b"custom-key");
        assert_eq!(fields[0].value.chunk(), b"custom-header");
        assert_eq!(decoder.table().len(), 1);
        assert_eq!(decoder.table().get_size(), 55);
        let (name, value) = decoder.table().lookup(1).unwrap();
        assert_eq!(name.chunk(), b"custom-key");
        assert_eq!(value.chunk(), b"custom-header");
    }

    #[test]
    fn literal_without_indexing() {
        // RFC 7541 C.2.2
        let mut decoder = Decoder::new();
        let fields = decoder
            .decode(&mut block("040c 2f73 616d 706c 652f 7061 7468"))
            .unwrap();
        assert_eq!(fields[0].name.chunk(), b":path");
        assert_eq!(fields[0].value.chunk(), b"/sample/path");
        assert_eq!(decoder.table().len(), 0);
    }

    #[test]
    fn literal_never_indexed() {
        // RFC 7541 C.2.3
        let mut decoder = Decoder::new();
        let fields = decoder
            .decode(&mut block("1008 7061 7373 776f 7264 0673 6563 7265 74"))
            .unwrap();
        assert_eq!(fields[0].name.chunk(), b"password");
        assert_eq!(fields[0].value.chunk(), b"secret");
        assert!(fields[0].never_indexed);
        assert_eq!(decoder.table().len(), 0);
    }

    #[test]
    fn size_update_to_zero_empties_the_table() {
        let mut decoder = Decoder::new();
        decoder
            .decode(&mut block(
                "400a 6375 7374 6f6d 2d6b 6579 0d63 7573 746f 6d2d 6865 6164 6572",
            ))
            .unwrap();
        assert_eq!(decoder.table().len(), 1);

        let mut events = Vec::new();
        decoder
            .decode_with_cb(&mut block("20"), |event| events.push(event))
            .unwrap();
        assert_eq!(events, vec![HeaderEvent::SizeUpdate(0)]);
        assert_eq!(decoder.table().len(), 0);
        assert_eq!(decoder.table().capacity(), 0);
    }

    #[test]
    fn size_update_after_a_header_is_an_error() {
        let mut decoder = Decoder::new();
        assert_eq!(
            decoder.decode(&mut block("82 20")),
            Err(HpackError::ProtocolError)
        );
    }

    #[test]
    fn three_size_updates_are_an_error() {
        let mut decoder = Decoder::new();
        assert!(decoder.decode(&mut block("20 20")).is_ok());
        assert_eq!(
            decoder.decode(&mut block("20 20 20")),
            Err(HpackError::ProtocolError)
        );
    }

    #[test]
    fn size_update_above_the_maximum_is_an_error() {
        let mut decoder = Decoder::new();
        // 4097 with a 5-bit prefix
        assert_eq!(
            decoder.decode(&mut block("3f e2 1f")),
            Err(HpackError::CapacityExceeded)
        );
    }

    #[test]
    fn zero_index_is_an_error() {
        let mut decoder = Decoder::new();
        assert_eq!(
            decoder.decode(&mut block("80")),
            Err(HpackError::ProtocolError)
        );
    }

    #[test]
    fn index_past_both_tables_is_an_error() {
        let mut decoder = Decoder::new();
        // 62 addresses the (empty) dynamic table
        assert_eq!(
            decoder.decode(&mut block("be")),
            Err(HpackError::IndexOutOfRange)
        );
    }

    #[test]
    fn truncated_literal() {
        let mut decoder = Decoder::new();
        assert_eq!(
            decoder.decode(&mut block("40 05 61")),
            Err(HpackError::Truncated)
        );
    }

    #[test]
    fn indexed_name_with_literal_value() {
        let mut decoder = Decoder::new();
        // literal with incremental indexing, name = static 2 (:method)
        let fields = decoder
            .decode(&mut block("42 05 5041 5443 48"))
            .unwrap();
        assert_eq!(fields[0].name.chunk(), b":method");
        assert_eq!(fields[0].value.chunk(), b"PATCH");
        let (name, value) = decoder.table().lookup(1).unwrap();
        assert_eq!(name.chunk(), b":method");
        assert_eq!(value.chunk(), b"PATCH");
    }
}
