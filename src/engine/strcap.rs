//! Format-string captures
//!
//! A string capture's ktable payload is a format string interpreted over
//! the capture's nested values: `%0` is the whole match, `%1`..`%9` the
//! collected nested captures, `%%` and any other `%X` pass `X` through
//! literally. Nested captures that are plain text substitute directly;
//! anything else is re-evaluated on demand and must produce a stringable
//! first value.

use crate::common::errors::ReifyError;
use crate::common::types::CapKind;
use crate::engine::reifier::Reifier;
use crate::engine::value::Value;

/// One collected substitution slot: either a resolved subject range or a
/// deferred capture to re-evaluate on use.
#[derive(Debug, Clone, Copy)]
enum StrSlot {
    Str { start: usize, end: usize },
    Deferred(usize),
}

impl<'a> Reifier<'a> {
    /// Interpret the string capture at the cursor, appending the result
    /// to `buf`.
    pub(crate) fn string_cap(&mut self, buf: &mut Vec<u8>) -> Result<(), ReifyError> {
        let fmt = self.cs.name_at_cursor()?.as_bytes().to_vec();
        let mut slots = Vec::with_capacity(self.max_str_caps);
        self.collect_str_caps(&mut slots)?;
        let top = slots.len() - 1;

        let mut i = 0;
        while i < fmt.len() {
            let b = fmt[i];
            if b != b'%' {
                buf.push(b);
                i += 1;
                continue;
            }
            i += 1;
            let Some(&escaped) = fmt.get(i) else {
                // Trailing escape character passes through.
                buf.push(b'%');
                break;
            };
            i += 1;
            if !escaped.is_ascii_digit() {
                buf.push(escaped);
                continue;
            }
            let l = (escaped - b'0') as usize;
            if l > top {
                return Err(ReifyError::InvalidCaptureIndex(l as u8));
            }
            match slots[l] {
                StrSlot::Str { start, end } => {
                    let subject = self.cs.subject();
                    let start = start.min(subject.len());
                    let end = end.min(subject.len()).max(start);
                    buf.extend_from_slice(&subject[start..end]);
                }
                StrSlot::Deferred(pos) => {
                    let saved = self.cs.pos;
                    self.cs.pos = pos;
                    self.add_one_string(buf, "capture", l as u8)?;
                    self.cs.pos = saved;
                }
            }
        }
        Ok(())
    }

    /// Collect substitution slots from the capture at the cursor. The
    /// first slot spans the whole match; plain captures nested directly
    /// inside merge their own slots, everything else is deferred. Slots
    /// beyond the configured maximum are skipped.
    fn collect_str_caps(&mut self, slots: &mut Vec<StrSlot>) -> Result<(), ReifyError> {
        let k = slots.len();
        let cap = *self.cs.current()?;
        slots.push(StrSlot::Str {
            start: cap.start,
            end: 0,
        });
        self.cs.advance();
        if !cap.is_full() {
            while !self.cs.current()?.is_close() {
                if slots.len() >= self.max_str_caps {
                    // Excess captures are skipped outright.
                    self.cs.skip_capture()?;
                } else if self.cs.cap().kind == CapKind::Simple {
                    self.collect_str_caps(slots)?;
                } else {
                    slots.push(StrSlot::Deferred(self.cs.pos));
                    self.cs.skip_capture()?;
                }
            }
            self.cs.advance();
        }
        // The previous record (the close, or the capture itself when it
        // was full) carries the end of the collected range.
        let end = self.cs.caps[self.cs.pos - 1].close_addr();
        if let StrSlot::Str { start, .. } = slots[k] {
            slots[k] = StrSlot::Str { start, end };
        }
        Ok(())
    }

    /// Evaluate the capture at the cursor and append its first value,
    /// which must be stringable, to `buf`.
    fn add_one_string(
        &mut self,
        buf: &mut Vec<u8>,
        what: &'static str,
        index: u8,
    ) -> Result<(), ReifyError> {
        if self.cs.current()?.kind == CapKind::String {
            return self.string_cap(buf);
        }
        let mut tmp = Vec::new();
        let n = self.push_capture(&mut tmp)?;
        if n == 0 {
            return Err(ReifyError::NoValuesInCapture(index));
        }
        tmp.truncate(1);
        match tmp.pop().expect("one value") {
            Value::Str(s) => buf.extend_from_slice(&s),
            // Numbers coerce to their decimal form, as host strings do.
            Value::Int(n) => buf.extend_from_slice(n.to_string().as_bytes()),
            other => {
                return Err(ReifyError::InvalidValue {
                    what,
                    type_name: other.type_name(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::common::errors::ReifyError;
    use crate::common::types::{CapKind, Capture};
    use crate::engine::ktable::Ktable;
    use crate::engine::reifier::reify_captures;
    use crate::engine::value::Value;

    fn reify(
        subject: &[u8],
        caps: &[Capture],
        kt: &Ktable,
    ) -> Result<Vec<Value>, ReifyError> {
        reify_captures(subject, caps, kt, subject.len(), &[], &[], 10)
    }

    #[test]
    fn whole_match_substitution() {
        let mut kt = Ktable::new();
        let f = kt.push_str("<%0>");
        let caps = vec![
            Capture::full(0, 3, CapKind::String, f),
            Capture::close(3),
        ];
        let values = reify(b"abc", &caps, &kt).unwrap();
        assert_eq!(values, vec![Value::str("<abc>")]);
    }

    #[test]
    fn nested_capture_substitution() {
        let mut kt = Ktable::new();
        let f = kt.push_str("%2-%1");
        let caps = vec![
            Capture::open(0, CapKind::String, f),
            Capture::full(0, 1, CapKind::Simple, 0),
            Capture::full(2, 1, CapKind::Simple, 0),
            Capture::close(3),
            Capture::close(3),
        ];
        let values = reify(b"a-b", &caps, &kt).unwrap();
        assert_eq!(values, vec![Value::str("b-a")]);
    }

    #[test]
    fn percent_escape_passes_through() {
        let mut kt = Ktable::new();
        let f = kt.push_str("100%% sure");
        let caps = vec![
            Capture::full(0, 1, CapKind::String, f),
            Capture::close(1),
        ];
        let values = reify(b"x", &caps, &kt).unwrap();
        assert_eq!(values, vec![Value::str("100% sure")]);
    }

    #[test]
    fn out_of_range_index_fails() {
        let mut kt = Ktable::new();
        let f = kt.push_str("%3");
        let caps = vec![
            Capture::open(0, CapKind::String, f),
            Capture::full(0, 1, CapKind::Simple, 0),
            Capture::close(1),
            Capture::close(1),
        ];
        let err = reify(b"x", &caps, &kt).unwrap_err();
        assert_eq!(err, ReifyError::InvalidCaptureIndex(3));
    }

    #[test]
    fn deferred_position_capture_renders_decimal() {
        let mut kt = Ktable::new();
        let f = kt.push_str("@%1");
        let caps = vec![
            Capture::open(0, CapKind::String, f),
            Capture::full(2, 0, CapKind::Position, 0),
            Capture::close(3),
            Capture::close(3),
        ];
        let values = reify(b"abc", &caps, &kt).unwrap();
        assert_eq!(values, vec![Value::str("@3")]);
    }

    #[test]
    fn deferred_table_capture_is_invalid() {
        let mut kt = Ktable::new();
        let f = kt.push_str("%1");
        let caps = vec![
            Capture::open(0, CapKind::String, f),
            Capture::open(0, CapKind::Table, 0),
            Capture::close(1),
            Capture::close(1),
            Capture::close(1),
        ];
        let err = reify(b"x", &caps, &kt).unwrap_err();
        assert_eq!(
            err,
            ReifyError::InvalidValue {
                what: "capture",
                type_name: "table"
            }
        );
    }

    #[test]
    fn excess_captures_are_skipped() {
        let mut kt = Ktable::new();
        let f = kt.push_str("%9");
        let mut caps = vec![Capture::open(0, CapKind::String, f)];
        for i in 0..12 {
            caps.push(Capture::full(i, 1, CapKind::Simple, 0));
        }
        caps.push(Capture::close(12));
        caps.push(Capture::close(12));
        let values = reify(b"abcdefghijkl", &caps, &kt).unwrap();
        // Slot 9 is the ninth nested capture; the last three were dropped.
        assert_eq!(values, vec![Value::str("i")]);
    }
}
