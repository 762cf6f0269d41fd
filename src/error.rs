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
// Created Date: 2023/09/14 10:21:36

use std::{fmt, result};

/// hpack解码中所有可能的错误, 均为致命错误, 上层需以COMPRESSION_ERROR关闭连接
#[derive(PartialEq)]
#[derive(Eq)]
#[derive(Copy)]
#[derive(Clone)]
#[derive(Debug)]
pub enum HpackError {
    /// The input ended in the middle of a representation.
    Truncated,
    /// A prefix integer needs more bits than the accounting type has, or
    /// a continuation octet would shift set bits past it, or the final
    /// addition would wrap.
    IntegerOverflow,
    /// A zero index where one is required, or a table size update after
    /// the first header of a block, or a third consecutive update.
    ProtocolError,
    /// The index addresses neither the static nor the current dynamic table.
    IndexOutOfRange,
    /// Huffman padding of 8 bits or more, or padding that is not a prefix
    /// of the EOS code.
    HuffmanPadding,
    /// The EOS symbol was fully decoded inside a Huffman string.
    HuffmanEOS,
    /// A table size update above the settings-negotiated maximum.
    CapacityExceeded,
}

impl HpackError {
    #[inline]
    pub fn description_str(&self) -> &'static str {
        match self {
            HpackError::Truncated => "input ended mid representation",
            HpackError::IntegerOverflow => "prefix integer overflow",
            HpackError::ProtocolError => "protocol error",
            HpackError::IndexOutOfRange => "header index out of bounds",
            HpackError::HuffmanPadding => "invalid huffman padding",
            HpackError::HuffmanEOS => "eos in huffman string",
            HpackError::CapacityExceeded => "table capacity exceeded",
        }
    }
}

impl fmt::Display for HpackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description_str())
    }
}

pub type HpackResult<T> = result::Result<T, HpackError>;
