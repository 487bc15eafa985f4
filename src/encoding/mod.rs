//! Output back-ends for the capture tree walker
//!
//! Each back-end implements the three-event [`CaptureEncoder`] contract;
//! the walker drives it in depth-first pre-order and the encoder appends
//! to a growable byte buffer. Encoders validate the kind invariants of
//! every event they receive and never look at the capture array itself.

pub mod byte;
pub mod debug;
pub mod decode;
pub mod json;

use tracing::debug;

use crate::common::errors::{CaptureError, EncodeError, WalkError};
use crate::common::types::{CapKind, Capture, Encoding};
use crate::engine::ktable::Ktable;
use crate::engine::state::CapState;
use crate::engine::walker::{walk, WalkOutcome};

pub use byte::ByteEncoder;
pub use debug::DebugEncoder;
pub use decode::{decode_match, MatchNode};
pub use json::JsonEncoder;

/// One traversal event handed to an encoder.
///
/// Carries a copy of the event record (synthetic closes produced during
/// abend recovery have no backing array slot) plus the read-only context
/// the encoders need: the subject for text extraction and the ktable for
/// name resolution.
pub struct CapFrame<'a> {
    /// The record this event is about
    pub cap: Capture,
    /// Whether the record after an open is its close; lets the JSON
    /// back-end decide between the empty and the subs-bearing shape.
    pub next_is_close: bool,
    pub subject: &'a [u8],
    pub ktable: &'a Ktable,
}

impl<'a> CapFrame<'a> {
    /// 1-based start position of the event record
    pub fn pos(&self) -> usize {
        self.cap.pos()
    }

    /// 1-based end position of a full capture
    pub fn end_pos(&self) -> usize {
        self.cap.pos() + self.cap.siz as usize - 1
    }

    /// Resolved capture name, if the record's payload is a string
    pub fn name(&self) -> Option<&'a str> {
        self.ktable.name(self.cap.idx).ok()
    }

    /// Matched subject bytes of a full capture
    pub fn text(&self) -> &'a [u8] {
        let start = self.cap.start.min(self.subject.len());
        let end = (self.cap.start + self.cap.match_len()).min(self.subject.len());
        &self.subject[start..end.max(start)]
    }
}

/// The Open/Close/Full encoder contract.
///
/// Callbacks only append to `buf`; the sibling and child counts let
/// back-ends place separators without tracking their own state.
pub trait CaptureEncoder {
    /// Called on an open record; `count` is how many siblings were
    /// already emitted at this level.
    fn open(&mut self, frame: &CapFrame<'_>, buf: &mut Vec<u8>, count: usize)
        -> Result<(), EncodeError>;

    /// Called on a close or synthesised close; `count` is how many
    /// children of the closing frame were emitted and `open_start` the
    /// subject offset of the matching open.
    fn close(
        &mut self,
        frame: &CapFrame<'_>,
        buf: &mut Vec<u8>,
        count: usize,
        open_start: usize,
    ) -> Result<(), EncodeError>;

    /// Called on a full capture; `count` as for [`open`](Self::open).
    fn full(&mut self, frame: &CapFrame<'_>, buf: &mut Vec<u8>, count: usize)
        -> Result<(), EncodeError>;
}

/// Result of an encoded-mode traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMatch {
    /// Encoder output; empty when the list holds no Rosie captures
    pub data: Vec<u8>,
    /// Subject bytes beyond the match end
    pub leftover: usize,
    /// Whether the VM abended and the tree was closed synthetically
    pub abend: bool,
}

/// Encode a capture list into a fresh buffer.
///
/// `match_end` is the byte offset one past the matched range. A list
/// without an outermost Rosie capture (or with no captures at all)
/// produces an empty buffer and no abend.
pub fn encode_captures(
    subject: &[u8],
    caps: &[Capture],
    ktable: &Ktable,
    match_end: usize,
    encoding: Encoding,
    max_depth: usize,
) -> Result<EncodedMatch, CaptureError> {
    let mut buf = Vec::new();
    encode_captures_into(subject, caps, ktable, match_end, encoding, max_depth, &mut buf)
        .map(|(leftover, abend)| EncodedMatch {
            data: buf,
            leftover,
            abend,
        })
}

/// Encode a capture list into a caller-supplied buffer, which is
/// truncated first. Returns (leftover, abend).
pub fn encode_captures_into(
    subject: &[u8],
    caps: &[Capture],
    ktable: &Ktable,
    match_end: usize,
    encoding: Encoding,
    max_depth: usize,
    buf: &mut Vec<u8>,
) -> Result<(usize, bool), CaptureError> {
    buf.clear();
    let leftover = subject.len().saturating_sub(match_end);

    if encoding == Encoding::Line {
        // The line encoding bypasses the walker entirely.
        buf.extend_from_slice(subject);
        return Ok((leftover, false));
    }

    // A well-formed Rosie list starts with a single outermost Rosie
    // capture; anything else (e.g. a classic list of position captures)
    // has no tree to encode.
    let has_tree = caps
        .first()
        .map(|c| c.kind == CapKind::Rosie && !c.is_terminator())
        .unwrap_or(false);
    if !has_tree {
        debug!(encoding = ?encoding, "no rosie capture tree; empty output");
        return Ok((leftover, false));
    }

    let mut cs = CapState::new(caps, subject, ktable);
    let outcome = match encoding {
        Encoding::Byte => walk(&mut cs, &mut ByteEncoder, buf, max_depth),
        Encoding::Json => walk(&mut cs, &mut JsonEncoder, buf, max_depth),
        Encoding::Debug => walk(&mut cs, &mut DebugEncoder::stderr(), buf, max_depth),
        Encoding::Line => unreachable!("handled above"),
    };

    match outcome {
        Ok(WalkOutcome::Complete) => Ok((leftover, false)),
        Ok(WalkOutcome::Halted) => Ok((leftover, true)),
        Err(WalkError::Encode(e)) => Err(CaptureError::Encode(e)),
        Err(e) => Err(CaptureError::Walk(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_encoding_copies_subject() {
        let kt = Ktable::new();
        let out = encode_captures(b"hello world", &[], &kt, 5, Encoding::Line, 256).unwrap();
        assert_eq!(out.data, b"hello world");
        assert_eq!(out.leftover, 6);
        assert!(!out.abend);
    }

    #[test]
    fn non_rosie_list_yields_empty_output() {
        let mut kt = Ktable::new();
        kt.push_str("pos");
        let caps = vec![
            Capture::full(0, 0, CapKind::Position, 1),
            Capture::close(3),
        ];
        let out = encode_captures(b"abc", &caps, &kt, 3, Encoding::Byte, 256).unwrap();
        assert!(out.data.is_empty());
        assert!(!out.abend);
        assert_eq!(out.leftover, 0);
    }
}
