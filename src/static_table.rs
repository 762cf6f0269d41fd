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
// Created Date: 2023/09/15 09:30:48

use std::collections::HashMap;

use lazy_static::lazy_static;

/// 静态表固定61项
pub const SIZE: usize = 61;

/// The read-only table of well-known headers, in wire order
/// (RFC 7541, Appendix A). Externally 1-indexed.
static STATIC_TABLE_RAW: &'static [(&'static str, &'static str)] = &[
    (":authority", ""),
    (":method", "GET"),
    (":method", "POST"),
    (":path", "/"),
    (":path", "/index.html"),
    (":scheme", "http"),
    (":scheme", "https"),
    (":status", "200"),
    (":status", "204"),
    (":status", "206"),
    (":status", "304"),
    (":status", "400"),
    (":status", "404"),
    (":status", "500"),
    ("accept-charset", ""),
    ("accept-encoding", "gzip, deflate"),
    ("accept-language", ""),
    ("accept-ranges", ""),
    ("accept", ""),
    ("access-control-allow-origin", ""),
    ("age", ""),
    ("allow", ""),
    ("authorization", ""),
    ("cache-control", ""),
    ("content-disposition", ""),
    ("content-encoding", ""),
    ("content-language", ""),
    ("content-length", ""),
    ("content-location", ""),
    ("content-range", ""),
    ("content-type", ""),
    ("cookie", ""),
    ("date", ""),
    ("etag", ""),
    ("expect", ""),
    ("expires", ""),
    ("from", ""),
    ("host", ""),
    ("if-match", ""),
    ("if-modified-since", ""),
    ("if-none-match", ""),
    ("if-range", ""),
    ("if-unmodified-since", ""),
    ("last-modified", ""),
    ("link", ""),
    ("location", ""),
    ("max-forwards", ""),
    ("proxy-authenticate", ""),
    ("proxy-authorization", ""),
    ("range", ""),
    ("referer", ""),
    ("refresh", ""),
    ("retry-after", ""),
    ("server", ""),
    ("set-cookie", ""),
    ("strict-transport-security", ""),
    ("transfer-encoding", ""),
    ("user-agent", ""),
    ("vary", ""),
    ("via", ""),
    ("www-authenticate", ""),
];

lazy_static! {
    /// name -> (lowest index carrying the name, value -> index)
    static ref STATIC_HASH: HashMap<&'static [u8], (usize, HashMap<&'static [u8], usize>)> = {
        let mut h = HashMap::<&'static [u8], (usize, HashMap<&'static [u8], usize>)>::new();
        for (idx, &(name, value)) in STATIC_TABLE_RAW.iter().enumerate() {
            let entry = h
                .entry(name.as_bytes())
                .or_insert_with(|| (idx + 1, HashMap::new()));
            entry.1.insert(value.as_bytes(), idx + 1);
        }
        h
    };
}

/// Returns the entry at the 1-based `index`, or `None` when out of
/// bounds (index 0 included).
pub fn get(index: usize) -> Option<(&'static [u8], &'static [u8])> {
    if index == 0 || index > STATIC_TABLE_RAW.len() {
        return None;
    }
    let (name, value) = STATIC_TABLE_RAW[index - 1];
    Some((name.as_bytes(), value.as_bytes()))
}

/// Looks for `(name, value)`. Returns the matching 1-based index and
/// whether the value matched too; a full match wins over a name-only
/// match, a name-only match reports the lowest index carrying the name.
pub fn search(name: &[u8], value: &[u8]) -> Option<(usize, bool)> {
    match STATIC_HASH.get(name) {
        Some((first, values)) => match values.get(value) {
            Some(index) => Some((*index, true)),
            None => Some((*first, false)),
        },
        None => None,
    }
}
