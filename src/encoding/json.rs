//! JSON tree encoding
//!
//! Mirrors the binary layout textually: each node is an object with `s`,
//! `type`, an optional `subs` array, and `e`. Only Rosie captures are
//! representable.

use crate::common::errors::EncodeError;
use crate::common::types::CapKind;
use crate::encoding::{CapFrame, CaptureEncoder};

/// The JSON back-end
pub struct JsonEncoder;

fn push_usize(buf: &mut Vec<u8>, n: usize) {
    buf.extend_from_slice(n.to_string().as_bytes());
}

fn push_name(frame: &CapFrame<'_>, buf: &mut Vec<u8>) -> Result<(), ()> {
    let name = frame.name().ok_or(())?;
    // serde_json produces the quoted, escaped form.
    let quoted = serde_json::to_string(name).map_err(|_| ())?;
    buf.extend_from_slice(quoted.as_bytes());
    Ok(())
}

impl CaptureEncoder for JsonEncoder {
    fn open(
        &mut self,
        frame: &CapFrame<'_>,
        buf: &mut Vec<u8>,
        count: usize,
    ) -> Result<(), EncodeError> {
        if !frame.cap.is_open() || frame.cap.kind != CapKind::Rosie {
            return Err(EncodeError::Open);
        }
        if count > 0 {
            buf.push(b',');
        }
        buf.extend_from_slice(b"{\"s\":");
        push_usize(buf, frame.pos());
        buf.extend_from_slice(b",\"type\":");
        push_name(frame, buf).map_err(|_| EncodeError::Open)?;
        if !frame.next_is_close {
            buf.extend_from_slice(b",\"subs\":[");
        }
        Ok(())
    }

    fn close(
        &mut self,
        frame: &CapFrame<'_>,
        buf: &mut Vec<u8>,
        count: usize,
        _open_start: usize,
    ) -> Result<(), EncodeError> {
        if !frame.cap.is_close() {
            return Err(EncodeError::Close);
        }
        if count > 0 {
            buf.push(b']');
        }
        buf.extend_from_slice(b",\"e\":");
        push_usize(buf, frame.pos());
        buf.push(b'}');
        Ok(())
    }

    fn full(
        &mut self,
        frame: &CapFrame<'_>,
        buf: &mut Vec<u8>,
        count: usize,
    ) -> Result<(), EncodeError> {
        if !frame.cap.is_full() || frame.cap.kind != CapKind::Rosie {
            return Err(EncodeError::FullCapture);
        }
        if count > 0 {
            buf.push(b',');
        }
        buf.extend_from_slice(b"{\"s\":");
        push_usize(buf, frame.pos());
        buf.extend_from_slice(b",\"type\":");
        push_name(frame, buf).map_err(|_| EncodeError::FullCapture)?;
        buf.extend_from_slice(b",\"e\":");
        push_usize(buf, frame.end_pos());
        buf.push(b'}');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{Capture, Encoding};
    use crate::encoding::encode_captures;
    use crate::engine::ktable::Ktable;

    #[test]
    fn full_node_shape() {
        let mut kt = Ktable::new();
        let idx = kt.push_str("word");
        let caps = vec![
            Capture {
                start: 0,
                siz: 4,
                idx,
                kind: CapKind::Rosie,
            },
            Capture::close(3),
        ];
        let out = encode_captures(b"abcd", &caps, &kt, 3, Encoding::Json, 256).unwrap();
        assert_eq!(out.data, br#"{"s":1,"type":"word","e":4}"#);
    }

    #[test]
    fn nested_node_shape() {
        let mut kt = Ktable::new();
        let pair = kt.push_str("pair");
        let l = kt.push_str("L");
        let r = kt.push_str("R");
        let caps = vec![
            Capture::open(0, CapKind::Rosie, pair),
            Capture::full(0, 1, CapKind::Rosie, l),
            Capture::full(1, 1, CapKind::Rosie, r),
            Capture::close(2),
            Capture::close(2),
        ];
        let out = encode_captures(b"ab", &caps, &kt, 2, Encoding::Json, 256).unwrap();
        assert_eq!(
            out.data,
            br#"{"s":1,"type":"pair","subs":[{"s":1,"type":"L","e":2},{"s":2,"type":"R","e":3}],"e":3}"#
        );
    }

    #[test]
    fn childless_open_omits_subs() {
        let mut kt = Ktable::new();
        let idx = kt.push_str("empty");
        let caps = vec![
            Capture::open(1, CapKind::Rosie, idx),
            Capture::close(1),
            Capture::close(1),
        ];
        let out = encode_captures(b"ab", &caps, &kt, 1, Encoding::Json, 256).unwrap();
        assert_eq!(out.data, br#"{"s":2,"type":"empty","e":2}"#);
    }

    #[test]
    fn name_escaping_uses_json_rules() {
        let mut kt = Ktable::new();
        let idx = kt.push_str("we\"ird");
        let caps = vec![
            Capture::full(0, 1, CapKind::Rosie, idx),
            Capture::close(1),
        ];
        let out = encode_captures(b"a", &caps, &kt, 1, Encoding::Json, 256).unwrap();
        assert_eq!(out.data, br#"{"s":1,"type":"we\"ird","e":2}"#);
    }
}
