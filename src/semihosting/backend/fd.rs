/*!
 * Descriptor Table
 * Files opened by the Direct backend, keyed by backend descriptor
 */

use std::collections::HashMap;
use std::fs::File;

use crate::core::limits::FIRST_FILE_FD;
use crate::core::types::Fd;

/// Open files; descriptors below [`FIRST_FILE_FD`] belong to the console
#[derive(Debug, Default)]
pub struct FdTable {
    files: HashMap<Fd, File>,
}

impl FdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `file` under the lowest free descriptor
    pub fn insert(&mut self, file: File) -> Fd {
        let mut fd = FIRST_FILE_FD;
        while self.files.contains_key(&fd) {
            fd += 1;
        }
        self.files.insert(fd, file);
        fd
    }

    pub fn get_mut(&mut self, fd: Fd) -> Option<&mut File> {
        self.files.get_mut(&fd)
    }

    pub fn contains(&self, fd: Fd) -> bool {
        self.files.contains_key(&fd)
    }

    pub fn remove(&mut self, fd: Fd) -> Option<File> {
        self.files.remove(&fd)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
