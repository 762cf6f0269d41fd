//! Exposes the struct `Encoder` that turns an ordered list of header
//! fields into an hpack-encoded header block.
//!
//! For every field the encoder picks one of the four wire
//! representations: a full `(name, value)` match in the static or
//! dynamic table becomes an indexed header; a field that fits the
//! dynamic table budget is inserted there and sent as a literal with
//! incremental indexing (reusing a name index when one exists); a field
//! too large to ever be stored is sent as a literal without indexing;
//! and a field flagged never-indexed keeps that representation and
//! stays out of the table. The insertions performed while encoding are
//! exactly the insertions the peer performs while decoding, which keeps
//! the two dynamic tables in lockstep.
//!
//! # Example
//!
//! ```rust
//! use hpackparse::{Encoder, HeaderField};
//! use algorithm::buf::{Binary, Bt};
//! let mut encoder = Encoder::new();
//!
//! let headers = vec![HeaderField::new(
//!     Binary::from_static(b":method"),
//!     Binary::from_static(b"GET"),
//! )];
//! let buf = encoder.encode(headers.iter());
//!
//! assert_eq!(buf.chunk(), &[0x82]);
//! ```

use algorithm::buf::{BinaryMut, Bt, BtMut};

use crate::dynamic_table::DynamicTable;
use crate::field::HeaderField;
use crate::integer::encode_integer;
use crate::static_table;
use crate::string::{encode_string, HuffmanPolicy};
use crate::DEFAULT_SETTINGS_HEADER_TABLE_SIZE;

pub struct Encoder {
    table: DynamicTable,
    huffman: HuffmanPolicy,
    /// Capacity changes not yet on the wire, collapsed to the interim
    /// minimum and the final value so a block never starts with more
    /// than two size updates.
    pending_resize: Option<(usize, usize)>,
}

impl Encoder {
    /// Creates a new `Encoder` with the default dynamic table budget.
    pub fn new() -> Encoder {
        Encoder::with_max_table_size(DEFAULT_SETTINGS_HEADER_TABLE_SIZE)
    }

    /// Creates a new `Encoder` whose dynamic table is bounded by the
    /// peer's SETTINGS_HEADER_TABLE_SIZE value.
    pub fn with_max_table_size(max_size: usize) -> Encoder {
        Encoder {
            table: DynamicTable::new(max_size),
            huffman: HuffmanPolicy::WhenSmaller,
            pending_resize: None,
        }
    }

    pub fn set_huffman_policy(&mut self, policy: HuffmanPolicy) {
        self.huffman = policy;
    }

    pub fn table(&self) -> &DynamicTable {
        &self.table
    }

    /// Applies the peer's new SETTINGS_HEADER_TABLE_SIZE value. When it
    /// shrinks the table, the matching size update is queued for the
    /// start of the next block so the peer's decoder follows along.
    pub fn set_max_table_size(&mut self, new_max_size: usize) {
        let old_capacity = self.table.capacity();
        self.table.set_max_capacity(new_max_size);
        if self.table.capacity() < old_capacity {
            self.queue_resize(self.table.capacity());
        }
    }

    /// Moves the dynamic table budget (within the negotiated maximum),
    /// evicting immediately and queueing the wire update for the start
    /// of the next block.
    pub fn resize_table(&mut self, capacity: usize) {
        let capacity = capacity.min(self.table.max_capacity());
        // infallible: clamped to the maximum above
        let _ = self.table.set_capacity(capacity);
        self.queue_resize(capacity);
    }

    fn queue_resize(&mut self, capacity: usize) {
        self.pending_resize = match self.pending_resize {
            None => Some((capacity, capacity)),
            Some((min, _)) => Some((min.min(capacity), capacity)),
        };
    }

    /// Encodes a full block of headers into a fresh buffer.
    pub fn encode<'b, I>(&mut self, headers: I) -> BinaryMut
    where
        I: IntoIterator<Item = &'b HeaderField>,
    {
        let mut buf = BinaryMut::new();
        self.encode_into(headers, &mut buf);
        buf
    }

    /// Encodes a full block of headers, appending to `buf`. Any queued
    /// table resize is emitted first, before the first header. Returns
    /// the number of octets written.
    pub fn encode_into<'b, I, B>(&mut self, headers: I, buf: &mut B) -> usize
    where
        I: IntoIterator<Item = &'b HeaderField>,
        B: Bt + BtMut,
    {
        let mut size = 0;
        if let Some((min, last)) = self.pending_resize.take() {
            if min < last {
                size += encode_integer(min as u32, 5, 0x20, buf);
            }
            size += encode_integer(last as u32, 5, 0x20, buf);
        }
        for header in headers {
            size += self.encode_header_into(header, buf);
        }
        log::trace!("HPACK: 编码头块; len={}", size);
        size
    }

    /// Encodes one header field, choosing its wire representation and
    /// updating the dynamic table accordingly.
    pub fn encode_header_into<B: Bt + BtMut>(&mut self, header: &HeaderField, buf: &mut B) -> usize {
        let name = header.name.chunk();
        let value = header.value.chunk();

        if header.never_indexed {
            // Only the name may be referenced by index; the field never
            // enters a dynamic table, neither here nor downstream.
            let index = self
                .search_tables(name, value)
                .map(|(index, _)| index)
                .unwrap_or(0);
            return self.encode_literal(header, index, 4, 0x10, buf);
        }

        let statik = static_table::search(name, value);
        if let Some((index, true)) = statik {
            return encode_integer(index as u32, 7, 0x80, buf);
        }
        let mut name_index = statik.map(|(index, _)| index);
        if let Some((dynindex, has_value)) = self.table.search(name, value) {
            let unified = dynindex + static_table::SIZE;
            if has_value {
                return encode_integer(unified as u32, 7, 0x80, buf);
            } else if name_index.is_none() {
                name_index = Some(unified);
            }
        }
        let index = name_index.unwrap_or(0);

        // An entry that cannot fit would only clear the table; keep it
        // out entirely.
        if header.table_size() > self.table.capacity() {
            return self.encode_literal(header, index, 4, 0x00, buf);
        }

        self.table
            .insert(header.name.clone(), header.value.clone());
        self.encode_literal(header, index, 6, 0x40, buf)
    }

    /// Emits a literal representation: the name index (zero when the
    /// name goes out as a literal), then the string literals.
    fn encode_literal<B: Bt + BtMut>(
        &mut self,
        header: &HeaderField,
        index: usize,
        prefix_size: u8,
        padding: u8,
        buf: &mut B,
    ) -> usize {
        let mut size = encode_integer(index as u32, prefix_size, padding, buf);
        if index == 0 {
            size += encode_string(header.name.chunk(), self.huffman, buf);
        }
        size += encode_string(header.value.chunk(), self.huffman, buf);
        size
    }

    /// Finds a name index in the single index space, static table
    /// first.
    fn search_tables(&self, name: &[u8], value: &[u8]) -> Option<(usize, bool)> {
        if let Some(found) = static_table::search(name, value) {
            return Some(found);
        }
        self.table
            .search(name, value)
            .map(|(index, has_value)| (index + static_table::SIZE, has_value))
    }
}
