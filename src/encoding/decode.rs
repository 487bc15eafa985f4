//! Inverse of the binary tree encoding
//!
//! Reads a byte buffer produced by [`ByteEncoder`](crate::encoding::ByteEncoder)
//! back into a tree of match nodes. Every read is bounds-checked; any
//! marker or length violation is reported as corrupt match data with the
//! offending offset.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::common::errors::DecodeError;

/// Decoder recursion bound, matching the walker's default nesting limit.
const MAX_DECODE_DEPTH: usize = 256;

/// One decoded match node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchNode {
    /// 1-based start position
    pub s: usize,
    /// 1-based end position
    pub e: usize,
    /// Capture type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Constant-capture payload, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
    /// Child nodes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subs: Vec<MatchNode>,
}

/// Decode a byte-encoded match, returning the tree and the time taken.
pub fn decode_match(data: &[u8]) -> Result<(MatchNode, Duration), DecodeError> {
    let started = Instant::now();
    let mut reader = Reader { data, pos: 0 };
    let node = decode_node(&mut reader, 0)?;
    if reader.pos != data.len() {
        return Err(DecodeError::corrupt("trailing bytes after tree", reader.pos));
    }
    Ok((node, started.elapsed()))
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn read_i32(&mut self, what: &'static str) -> Result<i32, DecodeError> {
        let bytes = self
            .data
            .get(self.pos..self.pos + 4)
            .ok_or(DecodeError::corrupt(what, self.pos))?;
        self.pos += 4;
        Ok(i32::from_le_bytes(bytes.try_into().expect("4-byte slice")))
    }

    fn read_i16(&mut self, what: &'static str) -> Result<i16, DecodeError> {
        let bytes = self
            .data
            .get(self.pos..self.pos + 2)
            .ok_or(DecodeError::corrupt(what, self.pos))?;
        self.pos += 2;
        Ok(i16::from_le_bytes(bytes.try_into().expect("2-byte slice")))
    }

    fn read_bytes(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], DecodeError> {
        let bytes = self
            .data
            .get(self.pos..self.pos + n)
            .ok_or(DecodeError::corrupt(what, self.pos))?;
        self.pos += n;
        Ok(bytes)
    }

    /// Next i32 without consuming it, if four bytes remain
    fn peek_i32(&self) -> Option<i32> {
        self.data
            .get(self.pos..self.pos + 4)
            .map(|b| i32::from_le_bytes(b.try_into().expect("4-byte slice")))
    }
}

fn decode_node(r: &mut Reader<'_>, depth: usize) -> Result<MatchNode, DecodeError> {
    if depth >= MAX_DECODE_DEPTH {
        return Err(DecodeError::corrupt("nesting too deep", r.pos));
    }

    let marker_offset = r.pos;
    let pos = r.read_i32("start marker")?;
    if pos >= 0 {
        return Err(DecodeError::corrupt("expected start marker", marker_offset));
    }
    let s = -(pos as i64) as usize;

    let mut len = r.read_i16("name length")?;
    let mut data = None;
    if len <= 0 {
        // A non-positive length prefixes a constant-capture payload; the
        // real name length follows it.
        let n = -(len as i32) as usize;
        data = Some(r.read_bytes(n, "constant data")?.to_vec());
        len = r.read_i16("name length")?;
        if len <= 0 {
            return Err(DecodeError::corrupt("expected name length", r.pos - 2));
        }
    }

    let name_offset = r.pos;
    let name_bytes = r.read_bytes(len as usize, "name bytes")?;
    let type_name = std::str::from_utf8(name_bytes)
        .map_err(|_| DecodeError::corrupt("name is not valid UTF-8", name_offset))?
        .to_string();

    let mut subs = Vec::new();
    while matches!(r.peek_i32(), Some(next) if next < 0) {
        subs.push(decode_node(r, depth + 1)?);
    }

    let end_offset = r.pos;
    let end = r.read_i32("end position")?;
    if end < 0 {
        return Err(DecodeError::corrupt("expected end position", end_offset));
    }

    Ok(MatchNode {
        s,
        e: end as usize,
        type_name,
        data,
        subs,
    })
}
