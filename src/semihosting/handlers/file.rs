/*!
 * File Calls
 * open, close, read, write, isatty, seek, rename, remove and flen
 */

use tracing::{debug, warn};

use crate::core::limits::{CONSOLE_PATH, STDERR_FD, STDIN_FD, STDOUT_FD};
use crate::core::types::{RetCode, CALL_FAILED, TARGET_NULL};
use crate::semihosting::dispatcher::SemihostingDispatcher;
use crate::semihosting::marshal::TargetString;
use crate::semihosting::types::{descriptor, CallRequest, OpenFlags, OpenMode};
use crate::target::{MemoryAccess, Target};

impl SemihostingDispatcher {
    pub(in crate::semihosting) fn open(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let [path_addr, mode_argument, path_len, _] = request.params;

        let Some(mode) = OpenMode::from_argument(mode_argument) else {
            warn!(mode_argument, "open mode index out of range");
            return CALL_FAILED;
        };
        let flags = mode.flags();

        // ":tt" names the console and never reaches the backend
        let mut name = [0u8; 4];
        let readable = MemoryAccess::target(target).read(&mut name, path_addr).is_ok();
        if readable && &name == CONSOLE_PATH {
            let fd = if flags.is_read_only() {
                STDIN_FD
            } else if flags.contains(OpenFlags::TRUNC) {
                STDOUT_FD
            } else {
                STDERR_FD
            };
            debug!(mode = mode.fopen_name(), fd, "opened console");
            return descriptor::encode(fd);
        }

        let path = TargetString::new(path_addr, path_len);
        match self.backend.open(target, path, flags, self.config.file_mode) {
            fd if fd < 0 => CALL_FAILED,
            fd => descriptor::encode(fd),
        }
    }

    pub(in crate::semihosting) fn close(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let fd = descriptor::decode(request.params[0]);
        self.backend.close(target, fd)
    }

    /// Returns the number of bytes NOT read
    pub(in crate::semihosting) fn read(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let [fd, buf, count, _] = request.params;
        if buf == TARGET_NULL {
            return CALL_FAILED;
        }
        if count == 0 {
            return 0;
        }
        let transferred = self.backend.read(target, descriptor::decode(fd), buf, count);
        untransferred(count, transferred)
    }

    /// Returns the number of bytes NOT written
    pub(in crate::semihosting) fn write(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let [fd, buf, count, _] = request.params;
        if buf == TARGET_NULL {
            return CALL_FAILED;
        }
        if count == 0 {
            return 0;
        }
        let transferred = self.backend.write(target, descriptor::decode(fd), buf, count);
        untransferred(count, transferred)
    }

    pub(in crate::semihosting) fn is_tty(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        self.backend.is_tty(target, descriptor::decode(request.params[0]))
    }

    /// Absolute seek; 0 only if the backend landed exactly on the offset
    pub(in crate::semihosting) fn seek(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let fd = descriptor::decode(request.params[0]);
        let offset = i64::from(request.params[1]);
        if self.backend.seek(target, fd, offset) == offset {
            0
        } else {
            CALL_FAILED
        }
    }

    pub(in crate::semihosting) fn rename(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let [from_addr, from_len, to_addr, to_len] = request.params;
        self.backend.rename(
            target,
            TargetString::new(from_addr, from_len),
            TargetString::new(to_addr, to_len),
        )
    }

    pub(in crate::semihosting) fn remove(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let [addr, len, ..] = request.params;
        self.backend.remove(target, TargetString::new(addr, len))
    }

    pub(in crate::semihosting) fn file_length(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        self.backend.file_length(target, descriptor::decode(request.params[0]))
    }
}

fn untransferred(count: u32, transferred: RetCode) -> RetCode {
    if transferred < 0 {
        return transferred;
    }
    count.wrapping_sub(transferred as u32) as RetCode
}
