// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh
// -----
// Created Date: 2023/09/15 14:12:30

use std::collections::{vec_deque, VecDeque};

use algorithm::buf::{Binary, Bt};

use crate::field::HEADER_FIELD_OVERHEAD;
use crate::{HpackError, HpackResult};

/// The mutable half of the index space: entries ordered newest-first,
/// bounded by a byte budget.
///
/// `capacity` is the budget currently in force; the peer may move it up
/// and down through table size updates, but never above `max_capacity`,
/// which only the settings channel changes. The sum of entry sizes
/// (name + value + 32 per entry) never exceeds `capacity`; making room
/// always evicts from the oldest end.
#[derive(Debug, Clone)]
pub struct DynamicTable {
    table: VecDeque<(Binary, Binary)>,
    size: usize,
    capacity: usize,
    max_capacity: usize,
}

/// An `Iterator` through the entries of the `DynamicTable`, newest
/// first, yielding borrows of the underlying buffers.
pub struct DynamicTableIter<'a> {
    inner: vec_deque::Iter<'a, (Binary, Binary)>,
}

impl<'a> Iterator for DynamicTableIter<'a> {
    type Item = (&'a Binary, &'a Binary);

    fn next(&mut self) -> Option<(&'a Binary, &'a Binary)> {
        match self.inner.next() {
            Some(header) => Some((&header.0, &header.1)),
            None => None,
        }
    }
}

impl DynamicTable {
    pub fn new(max_capacity: usize) -> DynamicTable {
        DynamicTable {
            table: VecDeque::new(),
            size: 0,
            capacity: max_capacity,
            max_capacity,
        }
    }

    /// Returns the current size of the table in octets, as defined by the
    /// IETF hpack spec.
    pub fn get_size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> DynamicTableIter {
        DynamicTableIter {
            inner: self.table.iter(),
        }
    }

    /// Converts the current state of the table to a `Vec`, newest first.
    pub fn to_vec(&self) -> Vec<(Binary, Binary)> {
        let mut ret = Vec::with_capacity(self.table.len());
        for elem in self.table.iter() {
            ret.push(elem.clone());
        }
        ret
    }

    /// 按1开始的下标取条目, 1为最新
    pub fn lookup(&self, index: usize) -> HpackResult<(Binary, Binary)> {
        if index == 0 || index > self.table.len() {
            return Err(HpackError::IndexOutOfRange);
        }
        let (name, value) = &self.table[index - 1];
        Ok((name.clone(), value.clone()))
    }

    /// Looks for `(name, value)`. Returns the matching 1-based index
    /// (1 = newest) and whether the value matched too; a full match wins
    /// over a name-only match.
    pub fn search(&self, name: &[u8], value: &[u8]) -> Option<(usize, bool)> {
        let mut name_only = None;
        for (idx, (n, v)) in self.iter().enumerate() {
            if n.chunk() != name {
                continue;
            }
            if v.chunk() == value {
                return Some((idx + 1, true));
            }
            if name_only.is_none() {
                name_only = Some(idx + 1);
            }
        }
        name_only.map(|idx| (idx, false))
    }

    /// Prepends an entry, evicting from the oldest end until it fits.
    /// An entry bigger than the whole budget empties the table and is
    /// not inserted.
    pub fn insert(&mut self, name: Binary, value: Binary) {
        let esize = name.remaining() + value.remaining() + HEADER_FIELD_OVERHEAD;
        if esize > self.capacity {
            self.table.clear();
            self.size = 0;
            return;
        }
        self.consolidate(self.capacity - esize);
        self.size += esize;
        self.table.push_front((name, value));
    }

    /// Moves the byte budget, evicting as needed. The budget may not go
    /// above the settings-negotiated maximum.
    pub fn set_capacity(&mut self, capacity: usize) -> HpackResult<()> {
        if capacity > self.max_capacity {
            return Err(HpackError::CapacityExceeded);
        }
        self.capacity = capacity;
        self.consolidate(capacity);
        Ok(())
    }

    /// Applies a new settings-negotiated ceiling, pulling the current
    /// budget down with it when needed.
    pub fn set_max_capacity(&mut self, max_capacity: usize) {
        self.max_capacity = max_capacity;
        if self.capacity > max_capacity {
            self.capacity = max_capacity;
            self.consolidate(max_capacity);
        }
    }

    /// Evicts oldest-first until the table size is within `budget`.
    fn consolidate(&mut self, budget: usize) {
        while self.size > budget {
            match self.table.pop_back() {
                Some((name, value)) => {
                    self.size -= name.remaining() + value.remaining() + HEADER_FIELD_OVERHEAD;
                }
                None => {
                    // the size reaches 0 by the time all entries are gone
                    panic!("dynamic table size out of sync");
                }
            }
        }
    }
}
