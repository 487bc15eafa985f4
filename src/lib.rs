//! # Rosie Capture Tree Processor
//!
//! Post-match capture processing for a Rosie-flavoured PEG engine. The
//! match VM leaves behind a flat stream of capture markers; this crate
//! reconstructs the implied tree and renders it.
//!
//! ## Architecture Overview
//!
//! ```text
//! Capture stream → Tree walker → Encoder → Output buffer
//!        ↓
//!   Value reifier → Host values
//! ```
//!
//! Two consumption modes share the capture data model: the *encoded* mode
//! walks the tree once, driving one of the pluggable back-ends (binary,
//! JSON, debug trace); the *classic* mode evaluates captures into host
//! values (positions, strings, tables, function results).
//!
//! ## Quick Start
//!
//! ```rust
//! use rosie_captures::{
//!     CapKind, Capture, Encoding, Ktable, MatchInput, MatchProcessor, ProcessorConfig,
//! };
//!
//! let mut ktable = Ktable::new();
//! let word = ktable.push_str("word");
//!
//! let subject = b"abcd";
//! let captures = vec![
//!     Capture::full(0, 4, CapKind::Rosie, word),
//!     Capture::close(4),
//! ];
//!
//! let mut processor = MatchProcessor::new(ProcessorConfig::default());
//! let input = MatchInput {
//!     subject,
//!     captures: &captures,
//!     ktable: &ktable,
//!     match_end: 4,
//! };
//! let encoded = processor.encode(&input, Encoding::Json)?;
//! assert_eq!(encoded.data, br#"{"s":1,"type":"word","e":5}"#);
//! # Ok::<(), rosie_captures::CaptureError>(())
//! ```

pub mod common;
pub mod encoding;
pub mod engine;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export main types for convenience
pub use common::{
    config::{ConfigLoader, LimitsConfig, OutputConfig, ProcessorConfig},
    errors::{
        CaptureError, CaptureResult, ConfigError, DecodeError, EncodeError, ReifyError,
        WalkError, ENCODE_OK,
    },
    types::{CapKind, Capture, Encoding},
};

pub use encoding::{
    decode_match, encode_captures, ByteEncoder, CapFrame, CaptureEncoder, DebugEncoder,
    EncodedMatch, JsonEncoder, MatchNode,
};

pub use engine::{
    create_match, find_dyn_cap, reify_captures, run_dynamic_capture, CapTable, CapState,
    DynCaptureOutcome, HostFn, Ktable, KtableEntry, MapKey, Value, WalkOutcome,
};

use std::time::Duration;

/// Everything the match VM hands over for one processed match
#[derive(Clone, Copy)]
pub struct MatchInput<'a> {
    /// The subject the pattern was matched against
    pub subject: &'a [u8],
    /// The capture stream, including its terminating close
    pub captures: &'a [Capture],
    /// Payload registry for the pattern that matched
    pub ktable: &'a Ktable,
    /// Byte offset one past the matched range
    pub match_end: usize,
}

/// Encoded output borrowed from a processor's reusable buffer
#[derive(Debug, Clone, Copy)]
pub struct EncodedRef<'a> {
    pub data: &'a [u8],
    pub leftover: usize,
    pub abend: bool,
}

/// Main processor facade owning configuration and a reusable output
/// buffer.
///
/// The buffer is truncated at the start of every encode, so repeated
/// matching reuses one allocation. A processor serves one traversal at a
/// time; concurrent matching wants one processor per task.
pub struct MatchProcessor {
    config: ProcessorConfig,
    out: Vec<u8>,
}

impl MatchProcessor {
    /// Create a new processor with configuration
    pub fn new(config: ProcessorConfig) -> Self {
        let out = Vec::with_capacity(config.output.initial_buffer_capacity);
        Self { config, out }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Encode a match with the given encoding into the reusable buffer.
    pub fn encode(
        &mut self,
        input: &MatchInput<'_>,
        encoding: Encoding,
    ) -> CaptureResult<EncodedRef<'_>> {
        let (leftover, abend) = encoding::encode_captures_into(
            input.subject,
            input.captures,
            input.ktable,
            input.match_end,
            encoding,
            self.config.limits.max_depth,
            &mut self.out,
        )?;
        Ok(EncodedRef {
            data: &self.out,
            leftover,
            abend,
        })
    }

    /// Encode with the configured default encoding.
    pub fn encode_default(&mut self, input: &MatchInput<'_>) -> CaptureResult<EncodedRef<'_>> {
        let encoding = self.config.output.default_encoding;
        self.encode(input, encoding)
    }

    /// Encode with a raw numeric encoding tag, as the VM boundary
    /// surfaces it. Unknown tags are rejected.
    pub fn encode_with_tag(
        &mut self,
        input: &MatchInput<'_>,
        tag: i32,
    ) -> CaptureResult<EncodedRef<'_>> {
        let encoding = Encoding::try_from(tag)?;
        self.encode(input, encoding)
    }

    /// Reify a match into host values (classic mode).
    pub fn reify(&self, input: &MatchInput<'_>) -> CaptureResult<Vec<Value>> {
        self.reify_with(input, &[], &[])
    }

    /// Classic mode with extra arguments and runtime capture values.
    pub fn reify_with(
        &self,
        input: &MatchInput<'_>,
        extra_args: &[Value],
        runtime_values: &[Value],
    ) -> CaptureResult<Vec<Value>> {
        reify_captures(
            input.subject,
            input.captures,
            input.ktable,
            input.match_end,
            extra_args,
            runtime_values,
            self.config.limits.max_string_captures,
        )
        .map_err(CaptureError::Reify)
    }

    /// Decode a byte-encoded match back into a tree.
    pub fn decode(&self, data: &[u8]) -> CaptureResult<(MatchNode, Duration)> {
        decode_match(data).map_err(CaptureError::Decode)
    }
}

impl Default for MatchProcessor {
    fn default() -> Self {
        Self::new(ProcessorConfig::default())
    }
}
