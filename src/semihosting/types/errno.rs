/*!
 * Error Codes
 * Canonical error numbering shared by both backends
 */

use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use std::io;

use crate::core::errors::MarshalError;

/// Error codes in the front-end's File-I/O numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TargetErrno {
    Perm = 1,
    NoEnt = 2,
    Intr = 4,
    Io = 5,
    BadF = 9,
    Acces = 13,
    Fault = 14,
    Busy = 16,
    Exist = 17,
    NoDev = 19,
    NotDir = 20,
    IsDir = 21,
    Inval = 22,
    NFile = 23,
    MFile = 24,
    FBig = 27,
    NoSpc = 28,
    SPipe = 29,
    RoFs = 30,
    NoSys = 88,
    NameTooLong = 91,
    Unknown = 9999,
}

impl TargetErrno {
    pub const ALL: [TargetErrno; 22] = [
        Self::Perm,
        Self::NoEnt,
        Self::Intr,
        Self::Io,
        Self::BadF,
        Self::Acces,
        Self::Fault,
        Self::Busy,
        Self::Exist,
        Self::NoDev,
        Self::NotDir,
        Self::IsDir,
        Self::Inval,
        Self::NFile,
        Self::MFile,
        Self::FBig,
        Self::NoSpc,
        Self::SPipe,
        Self::RoFs,
        Self::NoSys,
        Self::NameTooLong,
        Self::Unknown,
    ];

    pub const fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|errno| errno.code() == code)
    }

    /// The iserror predicate: membership in the canonical set
    pub fn is_error(code: i32) -> bool {
        Self::from_code(code).is_some()
    }

    /// Translate a host OS error number
    pub fn from_host(raw: i32) -> Self {
        match Errno::from_raw(raw) {
            Errno::EPERM => Self::Perm,
            Errno::ENOENT => Self::NoEnt,
            Errno::EINTR => Self::Intr,
            Errno::EIO => Self::Io,
            Errno::EBADF => Self::BadF,
            Errno::EACCES => Self::Acces,
            Errno::EFAULT => Self::Fault,
            Errno::EBUSY => Self::Busy,
            Errno::EEXIST => Self::Exist,
            Errno::ENODEV => Self::NoDev,
            Errno::ENOTDIR => Self::NotDir,
            Errno::EISDIR => Self::IsDir,
            Errno::EINVAL => Self::Inval,
            Errno::ENFILE => Self::NFile,
            Errno::EMFILE => Self::MFile,
            Errno::EFBIG => Self::FBig,
            Errno::ENOSPC => Self::NoSpc,
            Errno::ESPIPE => Self::SPipe,
            Errno::EROFS => Self::RoFs,
            Errno::ENOSYS => Self::NoSys,
            Errno::ENAMETOOLONG => Self::NameTooLong,
            _ => Self::Unknown,
        }
    }
}

impl From<&io::Error> for TargetErrno {
    fn from(err: &io::Error) -> Self {
        if let Some(raw) = err.raw_os_error() {
            return Self::from_host(raw);
        }
        match err.kind() {
            io::ErrorKind::NotFound => Self::NoEnt,
            io::ErrorKind::PermissionDenied => Self::Acces,
            io::ErrorKind::AlreadyExists => Self::Exist,
            io::ErrorKind::InvalidInput => Self::Inval,
            io::ErrorKind::Interrupted => Self::Intr,
            io::ErrorKind::Unsupported => Self::NoSys,
            io::ErrorKind::UnexpectedEof => Self::Io,
            _ => Self::Unknown,
        }
    }
}

impl From<&MarshalError> for TargetErrno {
    fn from(err: &MarshalError) -> Self {
        match err {
            MarshalError::NullAddress | MarshalError::ZeroLength(_) => Self::Inval,
            MarshalError::Unterminated { .. } | MarshalError::TooLong { .. } => Self::NameTooLong,
            MarshalError::Fault { .. } | MarshalError::ScratchOverflow { .. } => Self::Fault,
        }
    }
}
