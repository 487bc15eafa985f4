//! Command line interface for inspecting capture streams and encoded
//! matches.
//!
//! Capture streams enter as JSON fixtures (subject, ktable names, and the
//! raw records), the same shape the test suite uses; encoded matches
//! enter as the binary buffers the byte back-end produces.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;

use crate::common::config::ProcessorConfig;
use crate::common::types::{Capture, Encoding};
use crate::engine::Ktable;
use crate::{MatchInput, MatchProcessor};

/// Command line interface for the capture tree processor.
#[derive(Debug, Parser)]
#[command(author, version, about = "Inspect PEG capture streams", long_about = None)]
pub struct Cli {
    /// Optional path to a processor configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, ...).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode a capture-stream fixture into one of the output formats
    Encode {
        /// Path to the JSON fixture
        fixture: PathBuf,

        /// Output encoding
        #[arg(long, value_enum, default_value = "json")]
        encoding: EncodingArg,

        /// Write the buffer here instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode a byte-encoded match buffer back into a JSON tree
    Decode {
        /// Path to the binary match buffer
        file: PathBuf,

        /// Pretty-print the tree
        #[arg(long)]
        pretty: bool,

        /// Report how long decoding took
        #[arg(long)]
        timing: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum EncodingArg {
    Debug,
    Byte,
    Json,
    Line,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Debug => Encoding::Debug,
            EncodingArg::Byte => Encoding::Byte,
            EncodingArg::Json => Encoding::Json,
            EncodingArg::Line => Encoding::Line,
        }
    }
}

/// On-disk capture-stream fixture
#[derive(Debug, Deserialize)]
struct Fixture {
    subject: String,
    match_end: Option<usize>,
    /// Ktable entries, in registration order; fixtures carry names only
    ktable: Vec<String>,
    captures: Vec<Capture>,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        let config = match &self.config {
            Some(path) => ProcessorConfig::load_from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => ProcessorConfig::default(),
        };

        match &self.command {
            Command::Encode {
                fixture,
                encoding,
                output,
            } => self.run_encode(config, fixture, (*encoding).into(), output.as_deref()),
            Command::Decode {
                file,
                pretty,
                timing,
            } => self.run_decode(config, file, *pretty, *timing),
        }
    }

    fn run_encode(
        &self,
        config: ProcessorConfig,
        fixture_path: &std::path::Path,
        encoding: Encoding,
        output: Option<&std::path::Path>,
    ) -> Result<()> {
        let text = std::fs::read_to_string(fixture_path)
            .with_context(|| format!("reading fixture {}", fixture_path.display()))?;
        let fixture: Fixture =
            serde_json::from_str(&text).context("parsing capture fixture")?;

        let mut ktable = Ktable::new();
        for name in &fixture.ktable {
            ktable.push_str(name.clone());
        }

        let subject = fixture.subject.as_bytes();
        let input = MatchInput {
            subject,
            captures: &fixture.captures,
            ktable: &ktable,
            match_end: fixture.match_end.unwrap_or(subject.len()),
        };

        let mut processor = MatchProcessor::new(config);
        let encoded = processor.encode(&input, encoding)?;
        info!(
            bytes = encoded.data.len(),
            leftover = encoded.leftover,
            abend = encoded.abend,
            "encoded capture stream"
        );

        match output {
            Some(path) => std::fs::write(path, encoded.data)
                .with_context(|| format!("writing {}", path.display()))?,
            None => {
                use std::io::Write;
                std::io::stdout().write_all(encoded.data)?;
                if encoding == Encoding::Json {
                    println!();
                }
            }
        }
        if encoded.abend {
            eprintln!("warning: match abended; output is partial");
        }
        Ok(())
    }

    fn run_decode(
        &self,
        config: ProcessorConfig,
        file: &std::path::Path,
        pretty: bool,
        timing: bool,
    ) -> Result<()> {
        let data = std::fs::read(file)
            .with_context(|| format!("reading match buffer {}", file.display()))?;
        let processor = MatchProcessor::new(config);
        let (tree, duration) = processor.decode(&data)?;

        let rendered = if pretty {
            serde_json::to_string_pretty(&tree)?
        } else {
            serde_json::to_string(&tree)?
        };
        println!("{rendered}");
        if timing {
            eprintln!("decoded in {duration:?}");
        }
        Ok(())
    }
}
