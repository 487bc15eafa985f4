//! Human-readable event trace
//!
//! Dumps every Open/Close/Full event to a writer (standard error by
//! default) and validates the kind invariants as it goes. The output
//! buffer is left untouched, so an encoded match using this back-end is
//! empty.

use std::io::{self, Write};

use crate::common::errors::EncodeError;
use crate::encoding::{CapFrame, CaptureEncoder};

/// The trace back-end, generic over its sink so tests can capture it
pub struct DebugEncoder<W: Write> {
    out: W,
}

impl DebugEncoder<io::Stderr> {
    /// Trace to standard error
    pub fn stderr() -> Self {
        Self { out: io::stderr() }
    }
}

impl<W: Write> DebugEncoder<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_capture(&mut self, frame: &CapFrame<'_>) -> io::Result<()> {
        let cap = &frame.cap;
        writeln!(self.out, "  kind = {:?}", cap.kind)?;
        writeln!(self.out, "  pos (1-based) = {}", cap.pos())?;
        writeln!(
            self.out,
            "  size (actual) = {}",
            cap.siz.saturating_sub(1)
        )?;
        writeln!(self.out, "  idx = {}", cap.idx)?;
        writeln!(
            self.out,
            "  ktable[idx] = {}",
            frame.ktable.render(cap.idx)
        )?;
        Ok(())
    }

    fn print_text(&mut self, frame: &CapFrame<'_>) -> io::Result<()> {
        write!(self.out, "  text of match: |")?;
        self.out.write_all(frame.text())?;
        writeln!(self.out, "|")
    }
}

impl<W: Write> CaptureEncoder for DebugEncoder<W> {
    fn open(
        &mut self,
        frame: &CapFrame<'_>,
        _buf: &mut Vec<u8>,
        _count: usize,
    ) -> Result<(), EncodeError> {
        if !frame.cap.is_open() {
            return Err(EncodeError::Open);
        }
        writeln!(self.out, "OPEN:").map_err(|_| EncodeError::Open)?;
        self.print_capture(frame).map_err(|_| EncodeError::Open)
    }

    fn close(
        &mut self,
        frame: &CapFrame<'_>,
        _buf: &mut Vec<u8>,
        _count: usize,
        _open_start: usize,
    ) -> Result<(), EncodeError> {
        if !frame.cap.is_close() {
            return Err(EncodeError::Close);
        }
        writeln!(self.out, "CLOSE:").map_err(|_| EncodeError::Close)?;
        self.print_capture(frame).map_err(|_| EncodeError::Close)
    }

    fn full(
        &mut self,
        frame: &CapFrame<'_>,
        _buf: &mut Vec<u8>,
        _count: usize,
    ) -> Result<(), EncodeError> {
        if !frame.cap.is_full() || frame.cap.is_close() {
            return Err(EncodeError::FullCapture);
        }
        writeln!(self.out, "Full capture:").map_err(|_| EncodeError::FullCapture)?;
        self.print_capture(frame)
            .and_then(|_| self.print_text(frame))
            .map_err(|_| EncodeError::FullCapture)
    }
}
