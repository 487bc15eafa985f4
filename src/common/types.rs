//! Core capture record types shared across the processor

use serde::{Deserialize, Serialize};

use crate::common::errors::CaptureError;

/// One marker in the linear capture stream produced by the match VM.
///
/// The stream interleaves open/close brackets with self-contained full
/// captures; the processor reconstructs the implied tree from it. Records
/// are fixed-size and stored contiguously, so cursors are plain indices
/// into the slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capture {
    /// Byte offset into the subject where this capture begins. For close
    /// records, where it ends.
    pub start: usize,
    /// Size discriminator: 0 marks an open record (a matching close
    /// follows later); a non-zero value `n` marks a full capture of
    /// `n - 1` bytes. Close records carry 1 by convention.
    pub siz: u32,
    /// Ktable payload index, runtime value slot, or small integer
    /// parameter, depending on `kind`.
    pub idx: u16,
    /// Capture kind tag
    pub kind: CapKind,
}

impl Capture {
    /// An open record for a bracketed capture
    pub fn open(start: usize, kind: CapKind, idx: u16) -> Self {
        Self {
            start,
            siz: 0,
            idx,
            kind,
        }
    }

    /// A self-contained capture of `len` subject bytes
    pub fn full(start: usize, len: u32, kind: CapKind, idx: u16) -> Self {
        Self {
            start,
            siz: len + 1,
            idx,
            kind,
        }
    }

    /// A close record ending the innermost open capture at `start`
    pub fn close(start: usize) -> Self {
        Self {
            start,
            siz: 1,
            idx: 0,
            kind: CapKind::Close,
        }
    }

    /// The abend sentinel left behind when the VM exits non-locally
    pub fn abend(start: usize) -> Self {
        Self {
            start,
            siz: 1,
            idx: 0,
            kind: CapKind::Final,
        }
    }

    pub fn is_full(&self) -> bool {
        self.siz != 0
    }

    pub fn is_close(&self) -> bool {
        self.kind == CapKind::Close
    }

    pub fn is_final(&self) -> bool {
        self.kind == CapKind::Final
    }

    /// Close or final; both terminate a traversal level
    pub fn is_terminator(&self) -> bool {
        self.is_close() || self.is_final()
    }

    pub fn is_open(&self) -> bool {
        !self.is_close() && self.siz == 0
    }

    /// Matched byte length of a full capture
    pub fn match_len(&self) -> usize {
        debug_assert!(self.is_full());
        self.siz as usize - 1
    }

    /// Offset one past the last matched byte (full and close records)
    pub fn close_addr(&self) -> usize {
        self.start + self.siz as usize - 1
    }

    /// 1-based subject position of this record
    pub fn pos(&self) -> usize {
        self.start + 1
    }
}

/// Capture kinds.
///
/// The legacy constant and substitution kinds of the reference lineage are
/// not part of this enum; the processor targets the Rosie-only kind set.
/// Named groups remain because the table builder and the back-reference
/// resolver are defined in terms of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapKind {
    /// Close bracket for an open capture
    Close,
    /// Abend sentinel: the VM stopped mid-match
    Final,
    /// Subject position, reified as a 1-based integer
    Position,
    /// Extra argument reference
    Arg,
    /// Plain text capture (whole match first, then nested values)
    Simple,
    /// Value produced earlier by a runtime capture
    Runtime,
    /// Format-string capture with %N substitution
    String,
    /// Group; named when `idx != 0`
    Group,
    /// Back-reference to a previously named capture
    Backref,
    /// Table constructor over nested captures
    Table,
    /// Host function application over nested values
    Function,
    /// Select the Nth nested value
    Num,
    /// Ktable map lookup keyed by the first nested value
    Query,
    /// Strict left fold over nested values
    Fold,
    /// Named Rosie capture; the only kind the tree encoders accept
    Rosie,
    /// Rosie position-pair capture
    RosieSimple,
}

/// Output encodings accepted by the encoded-mode entry point.
///
/// The numeric values are the wire tags callers pass in; anything else is
/// rejected with an invalid-encoding error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Human-readable event trace (buffer stays empty)
    Debug = 0,
    /// Compact little-endian binary tree
    Byte = 1,
    /// JSON tree
    Json = 2,
    /// Whole-subject copy, bypassing the walker
    Line = 3,
}

impl TryFrom<i32> for Encoding {
    type Error = CaptureError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Encoding::Debug),
            1 => Ok(Encoding::Byte),
            2 => Ok(Encoding::Json),
            3 => Ok(Encoding::Line),
            other => Err(CaptureError::InvalidEncoding(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_capture_geometry() {
        let cap = Capture::full(2, 4, CapKind::Rosie, 1);
        assert!(cap.is_full());
        assert!(!cap.is_open());
        assert_eq!(cap.match_len(), 4);
        assert_eq!(cap.pos(), 3);
        assert_eq!(cap.close_addr(), 6);
    }

    #[test]
    fn open_and_close_predicates() {
        let open = Capture::open(0, CapKind::Rosie, 1);
        assert!(open.is_open());
        assert!(!open.is_full());
        assert!(!open.is_terminator());

        let close = Capture::close(5);
        assert!(close.is_close());
        assert!(close.is_terminator());
        assert!(!close.is_open());
        assert_eq!(close.pos(), 6);
    }

    #[test]
    fn final_is_terminator_but_not_close() {
        let fin = Capture::abend(3);
        assert!(fin.is_final());
        assert!(fin.is_terminator());
        assert!(!fin.is_close());
        assert!(!fin.is_open());
    }

    #[test]
    fn encoding_tag_round_trip() {
        for tag in 0..=3 {
            let enc = Encoding::try_from(tag).unwrap();
            assert_eq!(enc as i32, tag);
        }
        assert!(Encoding::try_from(4).is_err());
        assert!(Encoding::try_from(-1).is_err());
    }
}
