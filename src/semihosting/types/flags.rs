/*!
 * Open Flags
 * fopen-style mode indices and the flag sets they map to
 */

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;

bitflags! {
    /// Open flags in the front-end's File-I/O numbering
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct OpenFlags: u32 {
        const RDONLY = 0x000;
        const WRONLY = 0x001;
        const RDWR = 0x002;
        const APPEND = 0x008;
        const CREAT = 0x200;
        const TRUNC = 0x400;
        const EXCL = 0x800;
    }
}

impl OpenFlags {
    const ACCESS_MASK: u32 = 0x3;

    pub fn is_read_only(self) -> bool {
        self.bits() & Self::ACCESS_MASK == Self::RDONLY.bits()
    }

    /// Host open options equivalent to this flag set
    pub fn to_open_options(self, mode: u32) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self.bits() & Self::ACCESS_MASK {
            0x1 => options.write(true),
            0x2 => options.read(true).write(true),
            _ => options.read(true),
        };
        if self.contains(Self::CREAT) {
            options.create(true);
        }
        if self.contains(Self::TRUNC) {
            options.truncate(true);
        }
        if self.contains(Self::APPEND) {
            options.append(true);
        }
        if self.contains(Self::EXCL) {
            options.create_new(true);
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        options
    }
}

/// The six fopen modes, in call-convention order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenMode {
    Read,
    ReadUpdate,
    Write,
    WriteUpdate,
    Append,
    AppendUpdate,
}

impl OpenMode {
    pub const TABLE: [OpenMode; 6] = [
        Self::Read,
        Self::ReadUpdate,
        Self::Write,
        Self::WriteUpdate,
        Self::Append,
        Self::AppendUpdate,
    ];

    /// Select a mode from the raw mode argument (binary bit ignored)
    ///
    /// Indices past the table are rejected.
    pub fn from_argument(mode_argument: u32) -> Option<Self> {
        Self::TABLE.get((mode_argument >> 1) as usize).copied()
    }

    pub const fn flags(self) -> OpenFlags {
        match self {
            Self::Read => OpenFlags::RDONLY,
            Self::ReadUpdate => OpenFlags::RDWR,
            Self::Write => OpenFlags::WRONLY
                .union(OpenFlags::CREAT)
                .union(OpenFlags::TRUNC),
            Self::WriteUpdate => OpenFlags::RDWR
                .union(OpenFlags::CREAT)
                .union(OpenFlags::TRUNC),
            Self::Append => OpenFlags::WRONLY
                .union(OpenFlags::CREAT)
                .union(OpenFlags::APPEND),
            Self::AppendUpdate => OpenFlags::RDWR
                .union(OpenFlags::CREAT)
                .union(OpenFlags::APPEND),
        }
    }

    pub const fn fopen_name(self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::ReadUpdate => "r+",
            Self::Write => "w",
            Self::WriteUpdate => "w+",
            Self::Append => "a",
            Self::AppendUpdate => "a+",
        }
    }
}
