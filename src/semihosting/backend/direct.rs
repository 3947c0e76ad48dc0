/*!
 * Direct Backend
 * Fulfils calls with the debugging host's own files, console and clock
 */

use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::process::Command;
use tracing::{debug, info, warn};

use crate::core::errors::MarshalError;
use crate::core::limits::{HOST_IO_CHUNK_SIZE, STDERR_FD, STDIN_FD, STDOUT_FD};
use crate::core::types::{Fd, RetCode, TargetAddr, CALL_FAILED};
use crate::semihosting::marshal::{self, TargetString};
use crate::semihosting::types::{OpenFlags, TargetErrno, TimeValue};
use crate::target::{MemoryAccess, Target};

use super::console::HostConsole;
use super::fd::FdTable;
use super::Backend;

/// Where a streamed read or write broke off
enum Transfer {
    Host(io::Error),
    Target(MarshalError),
}

/// Backend that executes every call on the debugging host
#[derive(Debug)]
pub struct DirectBackend {
    console: HostConsole,
    files: FdTable,
    errno: i32,
}

impl DirectBackend {
    pub fn new(console: HostConsole) -> Self {
        Self {
            console,
            files: FdTable::new(),
            errno: 0,
        }
    }

    /// Backend wired to the host's stdio
    pub fn stdio() -> Self {
        Self::new(HostConsole::stdio())
    }

    fn fail(&mut self, errno: TargetErrno) -> RetCode {
        self.errno = errno.code();
        CALL_FAILED
    }

    fn fail_io(&mut self, err: &io::Error) -> RetCode {
        debug!(error = %err, "host operation failed");
        self.fail(TargetErrno::from(err))
    }

    fn fail_marshal(&mut self, err: &MarshalError) -> RetCode {
        debug!(error = %err, "target memory transfer failed");
        self.fail(TargetErrno::from(err))
    }

    fn fail_transfer(&mut self, err: Transfer) -> RetCode {
        match err {
            Transfer::Host(err) => self.fail_io(&err),
            Transfer::Target(err) => self.fail_marshal(&err),
        }
    }

    fn reader(&mut self, fd: Fd) -> Option<&mut dyn Read> {
        match fd {
            STDIN_FD => Some(&mut *self.console.stdin as &mut dyn Read),
            STDOUT_FD | STDERR_FD => None,
            _ => self.files.get_mut(fd).map(|file| file as &mut dyn Read),
        }
    }

    fn writer(&mut self, fd: Fd) -> Option<&mut dyn Write> {
        match fd {
            STDIN_FD => None,
            STDOUT_FD => Some(&mut *self.console.stdout as &mut dyn Write),
            STDERR_FD => Some(&mut *self.console.stderr as &mut dyn Write),
            _ => self.files.get_mut(fd).map(|file| file as &mut dyn Write),
        }
    }

    fn is_console(fd: Fd) -> bool {
        matches!(fd, STDIN_FD | STDOUT_FD | STDERR_FD)
    }
}

impl Default for DirectBackend {
    fn default() -> Self {
        Self::stdio()
    }
}

impl Backend for DirectBackend {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn open(
        &mut self,
        target: &mut dyn Target,
        path: TargetString,
        flags: OpenFlags,
        mode: u32,
    ) -> RetCode {
        let path = match marshal::read_path(&mut MemoryAccess::target(target), path) {
            Ok(path) => path,
            Err(err) => return self.fail_marshal(&err),
        };

        match flags.to_open_options(mode).open(&path) {
            Ok(file) => {
                let fd = self.files.insert(file);
                info!(path = %path.display(), fd, flags = flags.bits(), "opened host file");
                fd
            }
            Err(err) => self.fail_io(&err),
        }
    }

    fn close(&mut self, _target: &mut dyn Target, fd: Fd) -> RetCode {
        if Self::is_console(fd) {
            // Host stdio stays open for the rest of the session
            return 0;
        }
        match self.files.remove(fd) {
            Some(_) => 0,
            None => self.fail(TargetErrno::BadF),
        }
    }

    fn read(&mut self, target: &mut dyn Target, fd: Fd, buf: TargetAddr, count: u32) -> RetCode {
        let console = Self::is_console(fd);
        let Some(reader) = self.reader(fd) else {
            return self.fail(TargetErrno::BadF);
        };

        let mut access = MemoryAccess::target(target);
        let mut chunk = [0u8; HOST_IO_CHUNK_SIZE];
        let mut transferred = 0usize;
        let outcome = loop {
            let want = (count as usize - transferred).min(HOST_IO_CHUNK_SIZE);
            if want == 0 {
                break Ok(());
            }
            let got = match reader.read(&mut chunk[..want]) {
                Ok(0) => break Ok(()),
                Ok(got) => got,
                Err(err) => break Err(Transfer::Host(err)),
            };
            let addr = buf.wrapping_add(transferred as u32);
            if let Err(err) = marshal::write_bytes(&mut access, addr, &chunk[..got]) {
                break Err(Transfer::Target(err));
            }
            transferred += got;
            // A short read is a complete answer; the console never blocks for more
            if got < want || console {
                break Ok(());
            }
        };

        match outcome {
            Ok(()) => transferred as RetCode,
            Err(err) => self.fail_transfer(err),
        }
    }

    fn write(&mut self, target: &mut dyn Target, fd: Fd, buf: TargetAddr, count: u32) -> RetCode {
        let console = Self::is_console(fd);
        let Some(writer) = self.writer(fd) else {
            return self.fail(TargetErrno::BadF);
        };

        let mut access = MemoryAccess::target(target);
        let mut written = 0usize;
        let outcome = loop {
            let want = (count as usize - written).min(HOST_IO_CHUNK_SIZE);
            if want == 0 {
                break Ok(());
            }
            let addr = buf.wrapping_add(written as u32);
            let bytes = match marshal::read_bytes(&mut access, addr, want) {
                Ok(bytes) => bytes,
                Err(err) => break Err(Transfer::Target(err)),
            };
            // Console writes are all-or-nothing so output is never torn
            let result = if console {
                writer.write_all(&bytes).map(|_| want)
            } else {
                writer.write(&bytes)
            };
            match result {
                Ok(put) => {
                    written += put;
                    if put < want {
                        break Ok(());
                    }
                }
                Err(err) => break Err(Transfer::Host(err)),
            }
        };
        let outcome = outcome.and_then(|_| {
            if console {
                writer.flush().map_err(Transfer::Host)
            } else {
                Ok(())
            }
        });

        match outcome {
            Ok(()) => written as RetCode,
            Err(err) => self.fail_transfer(err),
        }
    }

    fn seek(&mut self, _target: &mut dyn Target, fd: Fd, offset: i64) -> i64 {
        if Self::is_console(fd) {
            return self.fail(TargetErrno::SPipe).into();
        }
        let Ok(position) = u64::try_from(offset) else {
            return self.fail(TargetErrno::Inval).into();
        };
        let Some(file) = self.files.get_mut(fd) else {
            return self.fail(TargetErrno::BadF).into();
        };
        match file.seek(SeekFrom::Start(position)) {
            Ok(position) => position as i64,
            Err(err) => self.fail_io(&err).into(),
        }
    }

    fn is_tty(&mut self, _target: &mut dyn Target, fd: Fd) -> RetCode {
        match fd {
            STDIN_FD | STDOUT_FD | STDERR_FD => RetCode::from(self.console.tty[fd as usize]),
            _ if self.files.contains(fd) => 0,
            _ => {
                self.errno = TargetErrno::BadF.code();
                0
            }
        }
    }

    fn rename(&mut self, target: &mut dyn Target, from: TargetString, to: TargetString) -> RetCode {
        let mut access = MemoryAccess::target(target);
        let paths = marshal::read_path(&mut access, from)
            .and_then(|from| Ok((from, marshal::read_path(&mut access, to)?)));
        let (from, to) = match paths {
            Ok(paths) => paths,
            Err(err) => return self.fail_marshal(&err),
        };

        match fs::rename(&from, &to) {
            Ok(()) => {
                info!(from = %from.display(), to = %to.display(), "renamed host file");
                0
            }
            Err(err) => self.fail_io(&err),
        }
    }

    fn remove(&mut self, target: &mut dyn Target, path: TargetString) -> RetCode {
        let path = match marshal::read_path(&mut MemoryAccess::target(target), path) {
            Ok(path) => path,
            Err(err) => return self.fail_marshal(&err),
        };

        // remove() semantics: files, or empty directories
        let result = match fs::symlink_metadata(&path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir(&path),
            _ => fs::remove_file(&path),
        };
        match result {
            Ok(()) => {
                info!(path = %path.display(), "removed host file");
                0
            }
            Err(err) => self.fail_io(&err),
        }
    }

    fn system(&mut self, target: &mut dyn Target, command: TargetString) -> RetCode {
        let command = match marshal::read_string(&mut MemoryAccess::target(target), command) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => return self.fail_marshal(&err),
        };

        warn!(command = %command, "executing host command for target");
        let status = if cfg!(windows) {
            Command::new("cmd").arg("/C").arg(&command).status()
        } else {
            Command::new("sh").arg("-c").arg(&command).status()
        };
        match status {
            Ok(status) => status.code().unwrap_or(CALL_FAILED),
            Err(err) => self.fail_io(&err),
        }
    }

    fn file_length(&mut self, _target: &mut dyn Target, fd: Fd) -> RetCode {
        if Self::is_console(fd) {
            return 0;
        }
        let Some(file) = self.files.get_mut(fd) else {
            return self.fail(TargetErrno::BadF);
        };
        match file.metadata() {
            Ok(meta) => match RetCode::try_from(meta.len()) {
                Ok(length) => length,
                Err(_) => self.fail(TargetErrno::FBig),
            },
            Err(err) => self.fail_io(&err),
        }
    }

    fn time_of_day(&mut self, _target: &mut dyn Target) -> TimeValue {
        TimeValue::now()
    }

    fn read_char(&mut self, _target: &mut dyn Target) -> RetCode {
        let mut byte = [0u8; 1];
        match self.console.stdin.read(&mut byte) {
            Ok(1) => RetCode::from(byte[0]),
            Ok(_) => CALL_FAILED,
            Err(err) => self.fail_io(&err),
        }
    }

    fn last_errno(&self) -> i32 {
        self.errno
    }
}
