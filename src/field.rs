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
// Created Date: 2023/09/14 11:02:11

use std::fmt;

use algorithm::buf::{Binary, Bt};

/// 每个表条目的固定开销, 32字节 (RFC 7541 4.1)
pub const HEADER_FIELD_OVERHEAD: usize = 32;

/// A single `(name, value)` header field as carried through the codec.
///
/// Both halves are opaque octets; HTTP/2's lowercase-name rule is the
/// caller's concern. A field with `never_indexed` set must not enter a
/// dynamic table, here or on any intermediary, and the flag survives
/// re-encoding.
#[derive(Clone, Eq, PartialEq)]
pub struct HeaderField {
    pub name: Binary,
    pub value: Binary,
    pub never_indexed: bool,
}

impl HeaderField {
    pub fn new(name: Binary, value: Binary) -> HeaderField {
        HeaderField {
            name,
            value,
            never_indexed: false,
        }
    }

    /// 敏感头, 禁止写入动态表
    pub fn sensitive(name: Binary, value: Binary) -> HeaderField {
        HeaderField {
            name,
            value,
            never_indexed: true,
        }
    }

    /// The octets this field occupies in a dynamic table.
    pub fn table_size(&self) -> usize {
        self.name.remaining() + self.value.remaining() + HEADER_FIELD_OVERHEAD
    }
}

impl fmt::Debug for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("HeaderField");
        builder.field("name", &self.name);
        builder.field("value", &self.value);

        if self.never_indexed {
            builder.field("never_indexed", &self.never_indexed);
        }

        builder.finish()
    }
}
