//! Common test utilities and helpers
//!
//! Shared functionality used across the integration test modules.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use rosie_captures::{CapKind, Capture, Ktable, MatchInput, MatchProcessor, ProcessorConfig};

/// Test harness for creating temporary test environments
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub processor: MatchProcessor,
}

impl TestEnvironment {
    /// Create a new test environment with default configuration
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    /// Create a new test environment with custom configuration
    pub fn with_config(config: ProcessorConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let processor = MatchProcessor::new(config);
        Self {
            temp_dir,
            processor,
        }
    }

    /// Get the path to the temporary directory
    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write data to a file in the temp directory
    pub fn write_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.temp_path().join(name);
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Write text to a file in the temp directory
    pub fn write_text_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_path().join(name);
        fs::write(&path, content).expect("Failed to write test file");
        path
    }
}

/// Incremental builder for capture streams and their ktable
pub struct StreamBuilder {
    pub ktable: Ktable,
    pub caps: Vec<Capture>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self {
            ktable: Ktable::new(),
            caps: Vec::new(),
        }
    }

    /// Register a name, returning its ktable index
    pub fn name(&mut self, name: &str) -> u16 {
        self.ktable.push_str(name)
    }

    pub fn open(&mut self, start: usize, kind: CapKind, idx: u16) -> &mut Self {
        self.caps.push(Capture::open(start, kind, idx));
        self
    }

    pub fn full(&mut self, start: usize, len: u32, kind: CapKind, idx: u16) -> &mut Self {
        self.caps.push(Capture::full(start, len, kind, idx));
        self
    }

    pub fn open_rosie(&mut self, start: usize, name: &str) -> &mut Self {
        let idx = self.name(name);
        self.open(start, CapKind::Rosie, idx)
    }

    pub fn full_rosie(&mut self, start: usize, len: u32, name: &str) -> &mut Self {
        let idx = self.name(name);
        self.full(start, len, CapKind::Rosie, idx)
    }

    pub fn close(&mut self, at: usize) -> &mut Self {
        self.caps.push(Capture::close(at));
        self
    }

    pub fn abend(&mut self, at: usize) -> &mut Self {
        self.caps.push(Capture::abend(at));
        self
    }

    /// Borrow the stream as match input over `subject`
    pub fn input<'a>(&'a self, subject: &'a [u8], match_end: usize) -> MatchInput<'a> {
        MatchInput {
            subject,
            captures: &self.caps,
            ktable: &self.ktable,
            match_end,
        }
    }
}

/// Sample capture streams mirroring common match shapes
pub struct SampleStreams;

impl SampleStreams {
    /// A single full rosie capture spanning the whole subject
    pub fn single_word(subject_len: u32) -> StreamBuilder {
        let mut b = StreamBuilder::new();
        b.full_rosie(0, subject_len, "word")
            .close(subject_len as usize);
        b
    }

    /// `pair` wrapping two adjacent one-byte captures
    pub fn nested_pair() -> StreamBuilder {
        let mut b = StreamBuilder::new();
        b.open_rosie(0, "pair");
        b.full_rosie(0, 1, "L");
        b.full_rosie(1, 1, "R");
        b.close(2).close(2);
        b
    }

    /// Two opens cut short by an abend sentinel
    pub fn abended() -> StreamBuilder {
        let mut b = StreamBuilder::new();
        b.open_rosie(0, "outer");
        b.open_rosie(0, "inner");
        b.abend(0);
        b
    }
}
