/*!
 * Console Calls
 * writec, write0 and readc
 */

use tracing::debug;

use crate::core::limits::STDERR_FD;
use crate::core::types::{RetCode, CALL_FAILED, TARGET_NULL};
use crate::semihosting::dispatcher::SemihostingDispatcher;
use crate::semihosting::marshal;
use crate::semihosting::types::CallRequest;
use crate::target::{MemoryAccess, Target};

impl SemihostingDispatcher {
    /// One byte at r1 to the console error stream
    pub(in crate::semihosting) fn writec(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        if request.r1 == TARGET_NULL {
            return CALL_FAILED;
        }
        match self.backend.write(target, STDERR_FD, request.r1, 1) {
            1 => 0,
            _ => CALL_FAILED,
        }
    }

    /// NUL-terminated string at r1 to the console error stream, as one write
    pub(in crate::semihosting) fn write0(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let addr = request.r1;
        let limit = self.config.max_string_length;
        let len = match marshal::string_length(&mut MemoryAccess::target(target), addr, limit) {
            Ok(len) => len,
            Err(err) => {
                debug!(error = %err, "write0 string unusable");
                return CALL_FAILED;
            }
        };
        if len == 0 {
            return 0;
        }
        if self.backend.write(target, STDERR_FD, addr, len) == len as RetCode {
            0
        } else {
            CALL_FAILED
        }
    }

    pub(in crate::semihosting) fn readc(&mut self, target: &mut dyn Target) -> RetCode {
        self.backend.read_char(target)
    }
}
