/*!
 * Relay Requests
 * File-I/O request messages sent to the front-end
 */

use std::fmt;

use crate::core::limits::REPLY_MARKER;
use crate::core::types::{Fd, TargetAddr};
use crate::semihosting::marshal::TargetString;
use crate::semihosting::types::OpenFlags;

/// Seek origin, in the front-end's numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SeekWhence {
    Set = 0,
    Cur = 1,
    End = 2,
}

/// One relayed operation; buffers are addresses the front-end accesses itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayRequest {
    Open {
        path: TargetString,
        flags: OpenFlags,
        mode: u32,
    },
    Close {
        fd: Fd,
    },
    Read {
        fd: Fd,
        buf: TargetAddr,
        count: u32,
    },
    Write {
        fd: Fd,
        buf: TargetAddr,
        count: u32,
    },
    Lseek {
        fd: Fd,
        offset: i64,
        whence: SeekWhence,
    },
    Rename {
        from: TargetString,
        to: TargetString,
    },
    Unlink {
        path: TargetString,
    },
    Stat {
        path: TargetString,
        buf: TargetAddr,
    },
    Fstat {
        fd: Fd,
        buf: TargetAddr,
    },
    GetTimeOfDay {
        tv: TargetAddr,
        tz: TargetAddr,
    },
    IsaTty {
        fd: Fd,
    },
    System {
        command: TargetString,
    },
}

impl RelayRequest {
    /// Request name as it appears on the wire
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Close { .. } => "close",
            Self::Read { .. } => "read",
            Self::Write { .. } => "write",
            Self::Lseek { .. } => "lseek",
            Self::Rename { .. } => "rename",
            Self::Unlink { .. } => "unlink",
            Self::Stat { .. } => "stat",
            Self::Fstat { .. } => "fstat",
            Self::GetTimeOfDay { .. } => "gettimeofday",
            Self::IsaTty { .. } => "isatty",
            Self::System { .. } => "system",
        }
    }

    /// Full packet body, marker included
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

/// `ADDR/LEN` with the terminator counted in the length
struct WireString(TargetString);

impl fmt::Display for WireString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}/{:08X}", self.0.addr, self.0.wire_len())
    }
}

impl fmt::Display for RelayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", REPLY_MARKER as char, self.name())?;
        // Descriptors are sent as their 32-bit pattern
        match *self {
            Self::Open { path, flags, mode } => {
                write!(f, ",{},{:08X},{:08X}", WireString(path), flags.bits(), mode)
            }
            Self::Close { fd } | Self::IsaTty { fd } => write!(f, ",{:08X}", fd as u32),
            Self::Read { fd, buf, count } | Self::Write { fd, buf, count } => {
                write!(f, ",{:08X},{:08X},{:08X}", fd as u32, buf, count)
            }
            Self::Lseek { fd, offset, whence } => {
                write!(f, ",{:08X},{:08X},{:08X}", fd as u32, offset, whence as u32)
            }
            Self::Rename { from, to } => write!(f, ",{},{}", WireString(from), WireString(to)),
            Self::Unlink { path } => write!(f, ",{}", WireString(path)),
            Self::Stat { path, buf } => write!(f, ",{},{:08X}", WireString(path), buf),
            Self::Fstat { fd, buf } => write!(f, ",{:X},{:08X}", fd as u32, buf),
            Self::GetTimeOfDay { tv, tz } => write!(f, ",{:08X},{:08X}", tv, tz),
            Self::System { command } => write!(f, ",{}", WireString(command)),
        }
    }
}
