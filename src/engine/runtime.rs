//! Runtime (match-time) capture dispatch
//!
//! A runtime capture calls a host function in the middle of VM execution,
//! with the subject, the current position, and the values of the group it
//! closes. Results are spliced into the runtime value stack, superseding
//! any dynamic values the group had accrued.

use tracing::debug;

use crate::common::errors::ReifyError;
use crate::common::types::{CapKind, Capture};
use crate::engine::ktable::Ktable;
use crate::engine::reifier::Reifier;
use crate::engine::state::{find_open, CapState};
use crate::engine::value::Value;

/// Result of a runtime capture call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynCaptureOutcome {
    /// Capture records consumed by the call (the group's open through the
    /// record before its close)
    pub captures_removed: usize,
    /// Dynamic values removed from the runtime stack
    pub dyn_removed: usize,
    /// Values the call appended to the runtime stack
    pub dyn_added: usize,
}

/// Slot of the first runtime capture in `caps[from..to]`, if any.
pub fn find_dyn_cap(caps: &[Capture], from: usize, to: usize) -> Option<u16> {
    caps[from..to.min(caps.len())]
        .iter()
        .find(|c| c.kind == CapKind::Runtime)
        .map(|c| c.idx)
}

/// Execute the runtime capture whose close record sits at `close_idx`.
///
/// `pos` is the 0-based subject offset the VM has reached. The group's
/// close is materialised at that position, the group function is called
/// with `(subject, position, nested values...)`, and its results replace
/// the group's previously accrued dynamic values on `runtime_values`.
pub fn run_dynamic_capture(
    caps: &mut [Capture],
    close_idx: usize,
    subject: &[u8],
    pos: usize,
    ktable: &Ktable,
    runtime_values: &mut Vec<Value>,
    extra_args: &[Value],
    max_str_caps: usize,
) -> Result<DynCaptureOutcome, ReifyError> {
    let open_idx = find_open(caps, close_idx)?;
    if caps[open_idx].kind != CapKind::Group {
        return Err(ReifyError::DynamicNotGroup);
    }
    let first_dyn = find_dyn_cap(caps, open_idx, close_idx);
    caps[close_idx] = Capture::close(pos);

    let f = ktable.function(caps[open_idx].idx)?.clone();

    let mut args = vec![
        Value::Str(subject.to_vec()),
        Value::Int(pos as i64 + 1),
    ];
    {
        let mut cs = CapState::new(caps, subject, ktable);
        cs.pos = open_idx;
        let mut reifier = Reifier::new(cs, extra_args, runtime_values.as_slice(), max_str_caps);
        reifier.push_nested_values(&mut args, false)?;
    }
    let results = f(&args)?;

    let dyn_removed = match first_dyn {
        Some(slot) => {
            let slot = slot as usize;
            let removed = runtime_values.len().saturating_sub(slot);
            runtime_values.truncate(slot);
            removed
        }
        None => 0,
    };
    let dyn_added = results.len();
    runtime_values.extend(results);

    debug!(
        captures_removed = close_idx - open_idx,
        dyn_removed, dyn_added, "runtime capture call"
    );
    Ok(DynCaptureOutcome {
        captures_removed: close_idx - open_idx,
        dyn_removed,
        dyn_added,
    })
}
