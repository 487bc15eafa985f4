//! Transient traversal state over one capture list

use crate::common::errors::ReifyError;
use crate::common::types::Capture;
use crate::engine::ktable::Ktable;

/// Cursor state for one traversal of a capture list.
///
/// Owns nothing: the capture array, subject, and ktable all outlive the
/// traversal. The cursor is a plain index so reverse scans and restores
/// are cheap.
pub struct CapState<'a> {
    pub(crate) caps: &'a [Capture],
    pub(crate) pos: usize,
    pub(crate) subject: &'a [u8],
    pub(crate) ktable: &'a Ktable,
    /// Last resolved ktable index; reset at traversal entry
    pub(crate) value_cached: Option<u16>,
}

impl<'a> CapState<'a> {
    pub fn new(caps: &'a [Capture], subject: &'a [u8], ktable: &'a Ktable) -> Self {
        Self {
            caps,
            pos: 0,
            subject,
            ktable,
            value_cached: None,
        }
    }

    pub fn subject(&self) -> &'a [u8] {
        self.subject
    }

    pub fn ktable(&self) -> &'a Ktable {
        self.ktable
    }

    /// Record at the cursor. Callers must know the cursor is in range;
    /// use [`current`](Self::current) when that is not structurally
    /// guaranteed.
    pub fn cap(&self) -> &Capture {
        &self.caps[self.pos]
    }

    /// Record at the cursor, or an unbalanced-list error past the end
    pub fn current(&self) -> Result<&Capture, ReifyError> {
        self.caps.get(self.pos).ok_or(ReifyError::Unbalanced)
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.caps.len()
    }

    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Ktable name for the record at the cursor, memoising the resolved
    /// index in the traversal-local cache slot.
    pub fn name_at_cursor(&mut self) -> Result<&'a str, ReifyError> {
        let idx = self.cap().idx;
        self.value_cached = Some(idx);
        let ktable = self.ktable;
        ktable.name(idx)
    }

    /// Skip the entire capture at the cursor, including any nested
    /// captures and the trailing close.
    pub fn skip_capture(&mut self) -> Result<(), ReifyError> {
        if !self.current()?.is_full() {
            let mut opens = 0usize;
            loop {
                self.advance();
                let cap = self.current()?;
                if cap.is_close() {
                    if opens == 0 {
                        break;
                    }
                    opens -= 1;
                } else if !cap.is_full() {
                    opens += 1;
                }
            }
        }
        self.advance();
        Ok(())
    }
}

/// Scan left from the close record at `from` to its matching open. The
/// record at `from` itself is not examined, so the caller may pass a slot
/// that has not been materialised as a close yet.
pub fn find_open(caps: &[Capture], from: usize) -> Result<usize, ReifyError> {
    let mut closes = 0usize;
    let mut i = from;
    while i > 0 {
        i -= 1;
        let cap = &caps[i];
        if cap.is_close() {
            closes += 1;
        } else if !cap.is_full() {
            if closes == 0 {
                return Ok(i);
            }
            closes -= 1;
        }
    }
    Err(ReifyError::Unbalanced)
}
