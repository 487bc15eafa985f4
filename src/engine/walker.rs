//! Depth-tracked tree reconstruction over the flat capture stream

use tracing::trace;

use crate::common::errors::{EncodeError, WalkError};
use crate::common::types::Capture;
use crate::encoding::{CapFrame, CaptureEncoder};
use crate::engine::state::CapState;

/// How a traversal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Every open was closed by the stream
    Complete,
    /// A final sentinel forced synthetic closes; output is partial
    Halted,
}

/// One open frame on the depth stack: subject offset of the open record
/// and the sibling count accumulated at the enclosing level.
#[derive(Debug, Clone, Copy)]
struct OpenFrame {
    start: usize,
    saved_count: usize,
}

/// Walk the capture list from the cursor, driving `encoder` over
/// Open/Close/Full events in depth-first pre-order.
///
/// The cursor must sit on the outermost capture of a well-formed list.
/// Encoder errors abort immediately and are returned verbatim; a final
/// sentinel switches to synthesis mode, closing every open frame before
/// reporting [`WalkOutcome::Halted`].
pub fn walk<E>(
    cs: &mut CapState<'_>,
    encoder: &mut E,
    buf: &mut Vec<u8>,
    max_depth: usize,
) -> Result<WalkOutcome, WalkError>
where
    E: CaptureEncoder + ?Sized,
{
    cs.value_cached = None;
    let first = *cs.caps.get(cs.pos).ok_or(WalkError::Unbalanced)?;

    // A collapsed outermost open/close pair arrives as a single full
    // capture; it must then be the entire tree.
    if first.is_full() {
        encoder.full(&frame(cs, first), buf, 0)?;
        cs.advance();
        return match cs.caps.get(cs.pos) {
            Some(c) if c.is_final() => Ok(WalkOutcome::Halted),
            Some(c) if c.is_close() => Ok(WalkOutcome::Complete),
            _ => Err(EncodeError::Open.into()),
        };
    }
    if !first.is_open() {
        return Err(EncodeError::Open.into());
    }

    let mut stack: Vec<OpenFrame> = Vec::with_capacity(16);
    stack.push(OpenFrame {
        start: first.start,
        saved_count: 0,
    });
    encoder.open(&frame(cs, first), buf, 0)?;
    cs.advance();

    let mut count = 0usize;
    while !stack.is_empty() {
        // Descend through opens and fulls until this level terminates.
        loop {
            let cap = *cs.caps.get(cs.pos).ok_or(WalkError::Unbalanced)?;
            if cap.is_terminator() {
                break;
            }
            if cap.is_open() {
                if stack.len() >= max_depth {
                    return Err(WalkError::DepthExceeded);
                }
                stack.push(OpenFrame {
                    start: cap.start,
                    saved_count: count,
                });
                encoder.open(&frame(cs, cap), buf, count)?;
                count = 0;
            } else {
                encoder.full(&frame(cs, cap), buf, count)?;
                count += 1;
            }
            cs.advance();
        }

        let top = stack.pop().expect("loop guard");
        let cap = *cs.cap();

        if cap.is_final() {
            trace!(depth = stack.len() + 1, "abend; synthesising closes");
            let synth = Capture::close(cap.start);
            let mut child_count = count;
            let mut open_start = top.start;
            let mut saved = top.saved_count;
            loop {
                encoder.close(&frame(cs, synth), buf, child_count, open_start)?;
                match stack.pop() {
                    Some(outer) => {
                        // The frame just closed counts as one child of
                        // the enclosing level.
                        child_count = saved + 1;
                        open_start = outer.start;
                        saved = outer.saved_count;
                    }
                    None => return Ok(WalkOutcome::Halted),
                }
            }
        }

        encoder.close(&frame(cs, cap), buf, count, top.start)?;
        cs.advance();
        count = top.saved_count + 1;
    }

    Ok(WalkOutcome::Complete)
}

fn frame<'a>(cs: &CapState<'a>, cap: Capture) -> CapFrame<'a> {
    let next_is_close = cs
        .caps
        .get(cs.pos + 1)
        .map(|c| c.is_terminator())
        .unwrap_or(false);
    CapFrame {
        cap,
        next_is_close,
        subject: cs.subject,
        ktable: cs.ktable,
    }
}
