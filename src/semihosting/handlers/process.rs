/*!
 * Process Calls
 * system, exit, extended exit, command line and heap bounds
 */

use tracing::{info, warn};

use crate::core::types::{RetCode, CALL_FAILED};
use crate::semihosting::dispatcher::SemihostingDispatcher;
use crate::semihosting::marshal::{self, TargetString};
use crate::semihosting::types::CallRequest;
use crate::target::{MemoryAccess, Target};

impl SemihostingDispatcher {
    pub(in crate::semihosting) fn system(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let [addr, len, ..] = request.params;
        self.backend.system(target, TargetString::new(addr, len))
    }

    /// Report the exit code and let the target run on in single-step halt mode
    pub(in crate::semihosting) fn exit(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        info!(code = request.r1, "target exited");
        target.console_print(&format!("_exit({:#x})\n", request.r1));
        target.halt_resume(true);
        0
    }

    /// 64-bit exit value: high word in the second argument, low in the first
    pub(in crate::semihosting) fn exit_extended(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let [low, high, ..] = request.params;
        info!(code = (u64::from(high) << 32) | u64::from(low), "target exited");
        target.console_print(&format!("_exit(0x{high:x}{low:08x})\n"));
        target.halt_resume(true);
        0
    }

    /// Copy the command line into the target buffer, then report {address, length}
    pub(in crate::semihosting) fn get_cmdline(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let [buf, buf_len, ..] = request.params;
        let mut line = target.cmdline().as_bytes().to_vec();
        line.push(0);
        let Ok(len) = u32::try_from(line.len()) else {
            return CALL_FAILED;
        };
        if len > buf_len {
            warn!(needed = len, available = buf_len, "command line does not fit");
            return CALL_FAILED;
        }

        let mut access = MemoryAccess::target(target);
        let written = marshal::write_bytes(&mut access, buf, &line)
            .and_then(|()| marshal::write_words(&mut access, request.r1, &[buf, len]));
        match written {
            Ok(()) => 0,
            Err(_) => CALL_FAILED,
        }
    }

    /// Heap/stack bounds block for the C runtime's startup code
    pub(in crate::semihosting) fn heapinfo(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let words = target.heapinfo().to_words();
        match marshal::write_words(&mut MemoryAccess::target(target), request.r1, &words) {
            Ok(()) => 0,
            Err(_) => CALL_FAILED,
        }
    }
}
