/*!
 * Call Types
 * Call identifiers, the decoded request and the result handed back to the caller
 */

use serde::{Deserialize, Serialize};

use crate::core::limits::{ARGUMENT_REGISTER, ARGUMENT_WORDS, CALL_ID_REGISTER};
use crate::core::types::{RetCode, TargetAddr};
use crate::target::Target;

/// Closed set of calls the trap convention defines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Open,
    Close,
    WriteC,
    Write0,
    Write,
    Read,
    ReadC,
    IsError,
    IsTty,
    Seek,
    Flen,
    TmpNam,
    Remove,
    Rename,
    Clock,
    Time,
    System,
    Errno,
    GetCmdline,
    HeapInfo,
    Exit,
    ExitExtended,
    Elapsed,
    TickFreq,
    Unrecognized(u32),
}

impl CallKind {
    pub const fn from_id(id: u32) -> Self {
        match id {
            0x01 => Self::Open,
            0x02 => Self::Close,
            0x03 => Self::WriteC,
            0x04 => Self::Write0,
            0x05 => Self::Write,
            0x06 => Self::Read,
            0x07 => Self::ReadC,
            0x08 => Self::IsError,
            0x09 => Self::IsTty,
            0x0a => Self::Seek,
            0x0c => Self::Flen,
            0x0d => Self::TmpNam,
            0x0e => Self::Remove,
            0x0f => Self::Rename,
            0x10 => Self::Clock,
            0x11 => Self::Time,
            0x12 => Self::System,
            0x13 => Self::Errno,
            0x15 => Self::GetCmdline,
            0x16 => Self::HeapInfo,
            0x18 => Self::Exit,
            0x20 => Self::ExitExtended,
            0x30 => Self::Elapsed,
            0x31 => Self::TickFreq,
            other => Self::Unrecognized(other),
        }
    }

    pub const fn id(self) -> u32 {
        match self {
            Self::Open => 0x01,
            Self::Close => 0x02,
            Self::WriteC => 0x03,
            Self::Write0 => 0x04,
            Self::Write => 0x05,
            Self::Read => 0x06,
            Self::ReadC => 0x07,
            Self::IsError => 0x08,
            Self::IsTty => 0x09,
            Self::Seek => 0x0a,
            Self::Flen => 0x0c,
            Self::TmpNam => 0x0d,
            Self::Remove => 0x0e,
            Self::Rename => 0x0f,
            Self::Clock => 0x10,
            Self::Time => 0x11,
            Self::System => 0x12,
            Self::Errno => 0x13,
            Self::GetCmdline => 0x15,
            Self::HeapInfo => 0x16,
            Self::Exit => 0x18,
            Self::ExitExtended => 0x20,
            Self::Elapsed => 0x30,
            Self::TickFreq => 0x31,
            Self::Unrecognized(id) => id,
        }
    }

    /// Diagnostic name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Open => "SYS_OPEN",
            Self::Close => "SYS_CLOSE",
            Self::WriteC => "SYS_WRITEC",
            Self::Write0 => "SYS_WRITE0",
            Self::Write => "SYS_WRITE",
            Self::Read => "SYS_READ",
            Self::ReadC => "SYS_READC",
            Self::IsError => "SYS_ISERROR",
            Self::IsTty => "SYS_ISTTY",
            Self::Seek => "SYS_SEEK",
            Self::Flen => "SYS_FLEN",
            Self::TmpNam => "SYS_TMPNAM",
            Self::Remove => "SYS_REMOVE",
            Self::Rename => "SYS_RENAME",
            Self::Clock => "SYS_CLOCK",
            Self::Time => "SYS_TIME",
            Self::System => "SYS_SYSTEM",
            Self::Errno => "SYS_ERRNO",
            Self::GetCmdline => "SYS_GET_CMDLINE",
            Self::HeapInfo => "SYS_HEAPINFO",
            Self::Exit => "SYS_EXIT",
            Self::ExitExtended => "SYS_EXIT_EXTENDED",
            Self::Elapsed => "SYS_ELAPSED",
            Self::TickFreq => "SYS_TICKFREQ",
            Self::Unrecognized(_) => "SYS_UNKNOWN",
        }
    }

    /// Exit passes its only argument in r1 and has no argument block
    pub const fn has_argument_block(self) -> bool {
        !matches!(self, Self::Exit)
    }
}

/// One trapped call, decoded from the halted target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRequest {
    pub kind: CallKind,
    /// Raw r1: argument block address, or the argument itself
    pub r1: u32,
    pub params: [u32; ARGUMENT_WORDS],
}

impl CallRequest {
    pub fn new(kind: CallKind, r1: u32, params: [u32; ARGUMENT_WORDS]) -> Self {
        Self { kind, r1, params }
    }

    /// Read the call id, r1 and (except for exit) the argument block
    ///
    /// A failed block read is not an error here: the words stay zero and the
    /// handlers bounds-check whatever they receive.
    pub fn fetch(target: &mut dyn Target) -> Self {
        let kind = CallKind::from_id(target.read_register(CALL_ID_REGISTER));
        let r1 = target.read_register(ARGUMENT_REGISTER);

        let mut params = [0u32; ARGUMENT_WORDS];
        if kind.has_argument_block() {
            let mut block = [0u8; ARGUMENT_WORDS * 4];
            target.read_memory(&mut block, r1 as TargetAddr);
            if target.check_error() {
                tracing::debug!(
                    call = kind.name(),
                    r1,
                    "argument block unreadable"
                );
            }
            for (word, bytes) in params.iter_mut().zip(block.chunks_exact(4)) {
                *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            }
        }

        Self { kind, r1, params }
    }
}

/// Outcome of one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResult {
    pub value: RetCode,
    pub interrupted: bool,
}

impl CallResult {
    pub const fn new(value: RetCode, interrupted: bool) -> Self {
        Self { value, interrupted }
    }
}

/// The call convention's "handle + 1" descriptor encoding
pub mod descriptor {
    use crate::core::types::{Fd, RetCode};

    /// Encode a backend descriptor for the target; 0 stays reserved for failure
    pub const fn encode(fd: Fd) -> RetCode {
        fd.wrapping_add(1)
    }

    /// Decode a descriptor word received from the target
    pub const fn decode(word: u32) -> Fd {
        (word as i32).wrapping_sub(1)
    }
}
