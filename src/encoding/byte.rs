//! Compact binary tree encoding
//!
//! Positions are 1-based 32-bit little-endian integers; a start position
//! is stored negated so the decoder can tell "next sibling" from "end of
//! node" by sign alone. Name lengths are 16-bit little-endian, strictly
//! positive; a non-positive length is reserved for constant-capture data
//! payloads on the decode side.

use crate::common::errors::EncodeError;
use crate::common::types::CapKind;
use crate::encoding::{CapFrame, CaptureEncoder};

/// The binary back-end. Stateless; all layout lives in the callbacks.
pub struct ByteEncoder;

fn encode_pos(buf: &mut Vec<u8>, pos: usize, negate: bool) {
    let mut v = pos as i32;
    if negate {
        v = -v;
    }
    buf.extend_from_slice(&v.to_le_bytes());
}

fn encode_name(frame: &CapFrame<'_>, buf: &mut Vec<u8>) -> Result<(), ()> {
    let name = frame.name().ok_or(())?;
    let len = name.len();
    if len == 0 || len > i16::MAX as usize {
        return Err(());
    }
    buf.extend_from_slice(&(len as i16).to_le_bytes());
    buf.extend_from_slice(name.as_bytes());
    Ok(())
}

impl CaptureEncoder for ByteEncoder {
    fn open(
        &mut self,
        frame: &CapFrame<'_>,
        buf: &mut Vec<u8>,
        _count: usize,
    ) -> Result<(), EncodeError> {
        if !frame.cap.is_open() || frame.cap.kind != CapKind::Rosie {
            return Err(EncodeError::Open);
        }
        encode_pos(buf, frame.pos(), true);
        encode_name(frame, buf).map_err(|_| EncodeError::Open)
    }

    fn close(
        &mut self,
        frame: &CapFrame<'_>,
        buf: &mut Vec<u8>,
        _count: usize,
        _open_start: usize,
    ) -> Result<(), EncodeError> {
        if !frame.cap.is_close() {
            return Err(EncodeError::Close);
        }
        encode_pos(buf, frame.pos(), false);
        Ok(())
    }

    fn full(
        &mut self,
        frame: &CapFrame<'_>,
        buf: &mut Vec<u8>,
        _count: usize,
    ) -> Result<(), EncodeError> {
        if !frame.cap.is_full() || frame.cap.kind != CapKind::Rosie {
            return Err(EncodeError::FullCapture);
        }
        encode_pos(buf, frame.pos(), true);
        encode_name(frame, buf).map_err(|_| EncodeError::FullCapture)?;
        encode_pos(buf, frame.end_pos(), false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Capture;
    use crate::engine::ktable::Ktable;

    fn frame<'a>(cap: Capture, subject: &'a [u8], kt: &'a Ktable) -> CapFrame<'a> {
        CapFrame {
            cap,
            next_is_close: false,
            subject,
            ktable: kt,
        }
    }

    #[test]
    fn full_layout_is_start_name_end() {
        let mut kt = Ktable::new();
        let idx = kt.push_str("word");
        let cap = Capture {
            start: 0,
            siz: 4,
            idx,
            kind: CapKind::Rosie,
        };
        let mut buf = Vec::new();
        ByteEncoder
            .full(&frame(cap, b"abcd", &kt), &mut buf, 0)
            .unwrap();

        let mut expect = Vec::new();
        expect.extend_from_slice(&(-1i32).to_le_bytes());
        expect.extend_from_slice(&4i16.to_le_bytes());
        expect.extend_from_slice(b"word");
        expect.extend_from_slice(&4i32.to_le_bytes());
        assert_eq!(buf, expect);
    }

    #[test]
    fn open_emits_negated_start_and_name() {
        let mut kt = Ktable::new();
        let idx = kt.push_str("g");
        let cap = Capture::open(2, CapKind::Rosie, idx);
        let mut buf = Vec::new();
        ByteEncoder.open(&frame(cap, b"abcd", &kt), &mut buf, 0).unwrap();

        let mut expect = Vec::new();
        expect.extend_from_slice(&(-3i32).to_le_bytes());
        expect.extend_from_slice(&1i16.to_le_bytes());
        expect.extend_from_slice(b"g");
        assert_eq!(buf, expect);
    }

    #[test]
    fn close_emits_positive_end() {
        let kt = Ktable::new();
        let cap = Capture::close(3);
        let mut buf = Vec::new();
        ByteEncoder.close(&frame(cap, b"abcd", &kt), &mut buf, 0, 0).unwrap();
        assert_eq!(buf, 4i32.to_le_bytes());
    }

    #[test]
    fn non_rosie_kinds_are_rejected() {
        let mut kt = Ktable::new();
        let idx = kt.push_str("p");
        let cap = Capture::full(0, 0, CapKind::Position, idx);
        let mut buf = Vec::new();
        let err = ByteEncoder.full(&frame(cap, b"a", &kt), &mut buf, 0);
        assert_eq!(err, Err(EncodeError::FullCapture));

        let cap = Capture::open(0, CapKind::Group, idx);
        let err = ByteEncoder.open(&frame(cap, b"a", &kt), &mut buf, 0);
        assert_eq!(err, Err(EncodeError::Open));
    }

    #[test]
    fn missing_name_is_an_event_error() {
        let kt = Ktable::new();
        let cap = Capture::open(0, CapKind::Rosie, 9);
        let mut buf = Vec::new();
        let err = ByteEncoder.open(&frame(cap, b"a", &kt), &mut buf, 0);
        assert_eq!(err, Err(EncodeError::Open));
    }
}
