//! Capture evaluation engine: traversal state, the tree walker, and the
//! classic-mode value reifier.

pub mod backref;
pub mod ktable;
pub mod reifier;
pub mod runtime;
pub mod state;
mod strcap;
pub mod value;
pub mod walker;

pub use ktable::{HostFn, Ktable, KtableEntry};
pub use reifier::reify_captures;
pub use runtime::{find_dyn_cap, run_dynamic_capture, DynCaptureOutcome};
pub use state::CapState;
pub use value::{create_match, CapTable, MapKey, Value};
pub use walker::{walk, WalkOutcome};
