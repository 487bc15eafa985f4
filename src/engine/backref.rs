//! Back-reference resolution
//!
//! A back-reference reproduces the value of a previously named capture.
//! Resolution scans leftward from the reference: closed sibling groups
//! are jumped over wholesale, enclosing opens are skipped, and the first
//! named group or Rosie capture with the requested name wins.

use crate::common::errors::ReifyError;
use crate::common::types::CapKind;
use crate::engine::state::{find_open, CapState};

/// Find the capture a back-reference at `from` refers to, returning its
/// index in the capture list.
pub fn find_back(cs: &CapState<'_>, from: usize, name: &str) -> Result<usize, ReifyError> {
    let caps = cs.caps;
    let mut i = from;
    while i > 0 {
        i -= 1;
        let cap = &caps[i];
        if cap.is_close() {
            // Jump to the open of the group this close terminates, then
            // consider that open itself.
            i = find_open(caps, i)?;
        } else if cap.is_open() {
            // An open reached directly encloses the reference; it cannot
            // be a complete capture to reproduce.
            continue;
        }
        let cap = &caps[i];
        if matches!(cap.kind, CapKind::Group | CapKind::Rosie) && cap.idx != 0 {
            if cs.ktable().name(cap.idx).map(|n| n == name).unwrap_or(false) {
                return Ok(i);
            }
        }
    }
    Err(ReifyError::BackrefNotFound(name.to_string()))
}
