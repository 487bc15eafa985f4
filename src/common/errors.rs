//! Error types and handling for the capture tree processor

use thiserror::Error;

/// Main result type for capture processing operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Main error type encompassing all capture processing errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("reify error: {0}")]
    Reify(#[from] ReifyError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid encoding value: {0}")]
    InvalidEncoding(i32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CaptureError {
    /// Create an internal error with custom message
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        CaptureError::Internal(msg.into())
    }
}

/// Per-event encoder errors.
///
/// Each variant maps onto a fixed exit code: open errors are 1, close
/// errors 2, full-capture errors 3, with 0 reserved for success.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    #[error("open capture error")]
    Open,

    #[error("close capture error")]
    Close,

    #[error("full capture error")]
    FullCapture,
}

/// Exit code for a successful encode.
pub const ENCODE_OK: i32 = 0;

impl EncodeError {
    /// Numeric exit code for this error
    pub fn code(self) -> i32 {
        match self {
            EncodeError::Open => 1,
            EncodeError::Close => 2,
            EncodeError::FullCapture => 3,
        }
    }

    /// Message table lookup by exit code (1..=3)
    pub fn message(code: i32) -> Option<&'static str> {
        match code {
            1 => Some("open capture error"),
            2 => Some("close capture error"),
            3 => Some("full capture error"),
            _ => None,
        }
    }
}

/// Tree walker errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("max pattern nesting depth exceeded")]
    DepthExceeded,

    #[error("unbalanced capture list")]
    Unbalanced,
}

/// Byte-format decoder errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("corrupt match data: {reason} at offset {offset}")]
    Corrupt {
        reason: &'static str,
        offset: usize,
    },
}

impl DecodeError {
    pub(crate) fn corrupt(reason: &'static str, offset: usize) -> Self {
        DecodeError::Corrupt { reason, offset }
    }
}

/// Value reifier errors surfaced to the caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReifyError {
    #[error("reference to absent extra argument #{0}")]
    AbsentArgument(u16),

    #[error("reference to absent runtime capture #{0}")]
    AbsentRuntime(u16),

    #[error("back reference '{0}' not found")]
    BackrefNotFound(String),

    #[error("no initial value for fold capture")]
    NoFoldInitial,

    #[error("fold function returned no value")]
    FoldNoResult,

    #[error("no capture '{0}'")]
    NoCapture(u16),

    #[error("invalid capture index ({0})")]
    InvalidCaptureIndex(u8),

    #[error("no values in capture index {0}")]
    NoValuesInCapture(u8),

    #[error("invalid {what} value (a {type_name})")]
    InvalidValue {
        what: &'static str,
        type_name: &'static str,
    },

    #[error("ktable index {0} out of range")]
    KtableIndex(u16),

    #[error("ktable entry {idx} is not a {expected}")]
    KtableType { idx: u16, expected: &'static str },

    #[error("dynamic capture is not enclosed in a group")]
    DynamicNotGroup,

    #[error("unbalanced capture list")]
    Unbalanced,

    #[error("host function error: {0}")]
    HostFunction(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
