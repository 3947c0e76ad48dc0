/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use thiserror::Error;

use super::types::TargetAddr;

/// Failures moving data between target memory and host storage
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MarshalError {
    #[error("Null target address")]
    #[diagnostic(
        code(marshal::null_address),
        help("The target passed a null pointer where a buffer or string was required.")
    )]
    NullAddress,

    #[error("Zero-length string at {0:#010x}")]
    #[diagnostic(code(marshal::zero_length))]
    ZeroLength(TargetAddr),

    #[error("Target memory fault accessing {len} bytes at {addr:#010x}")]
    #[diagnostic(
        code(marshal::fault),
        help("The address range is not mapped on the target or the debug port reported an error.")
    )]
    Fault { addr: TargetAddr, len: usize },

    #[error("Scratch access of {len} bytes at {addr:#010x} is outside the local buffer")]
    #[diagnostic(
        code(marshal::scratch_overflow),
        help("The front-end wrote past the structure it was asked to fill.")
    )]
    ScratchOverflow { addr: TargetAddr, len: usize },

    #[error("No NUL terminator within {limit} bytes of {addr:#010x}")]
    #[diagnostic(code(marshal::unterminated))]
    Unterminated { addr: TargetAddr, limit: u32 },

    #[error("String of {len} bytes at {addr:#010x} exceeds the {limit} byte limit")]
    #[diagnostic(code(marshal::too_long))]
    TooLong { addr: TargetAddr, len: u32, limit: u32 },
}

/// Failures decoding a relay reply
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ReplyError {
    #[error("Malformed relay reply: {0:?}")]
    #[diagnostic(
        code(relay::malformed_reply),
        help("Expected `retcode[,errno[,C]]` with hexadecimal fields.")
    )]
    Malformed(String),
}

/// Failures of the relayed request/reply exchange
#[derive(Error, Debug, Diagnostic)]
pub enum RelayError {
    #[error("Transport error: {0}")]
    #[diagnostic(
        code(relay::transport),
        help("The debug link failed while a call was outstanding.")
    )]
    Transport(String),

    #[error("Escape received while waiting for a relay reply")]
    #[diagnostic(code(relay::escaped))]
    Escaped,

    #[error("Front-end disconnected while waiting for a relay reply")]
    #[diagnostic(code(relay::disconnected))]
    Disconnected,

    #[error("Reply error: {0}")]
    #[diagnostic(transparent)]
    Reply(#[from] ReplyError),
}

impl RelayError {
    /// Whether the session-level connection should be treated as gone
    pub fn is_link_loss(&self) -> bool {
        !matches!(self, RelayError::Reply(_))
    }
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Transport(err.to_string())
    }
}

/// Configuration loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid configuration document: {0}")]
    #[diagnostic(code(config::parse))]
    Parse(String),

    #[error("Invalid value {value:?} for {key}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Booleans accept 1/0/true/false; file modes are octal.")
    )]
    InvalidValue { key: String, value: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
