/*!
 * Query Calls
 * errno, iserror, tmpnam and the unsupported tick calls
 */

use tracing::debug;

use crate::core::limits::{TMPNAM_MAX_ID, TMPNAM_TEMPLATE};
use crate::core::types::{RetCode, CALL_FAILED, TARGET_NULL};
use crate::semihosting::dispatcher::SemihostingDispatcher;
use crate::semihosting::marshal;
use crate::semihosting::types::{CallKind, CallRequest, TargetErrno};
use crate::target::{MemoryAccess, Target};

/// Temp file name for `target_id`, NUL included; None outside 0..=255
pub fn tmpnam_name(target_id: i32) -> Option<[u8; 11]> {
    if !(0..=TMPNAM_MAX_ID).contains(&target_id) {
        return None;
    }
    let mut name = *TMPNAM_TEMPLATE;
    name[4] = b'A' + ((target_id >> 4) & 0xf) as u8;
    name[5] = b'A' + (target_id & 0xf) as u8;
    Some(name)
}

impl SemihostingDispatcher {
    pub(in crate::semihosting) fn errno(&self) -> RetCode {
        self.backend.last_errno()
    }

    pub(in crate::semihosting) fn is_error(&self, request: &CallRequest) -> RetCode {
        RetCode::from(TargetErrno::is_error(request.params[0] as i32))
    }

    pub(in crate::semihosting) fn tmpnam(
        &mut self,
        target: &mut dyn Target,
        request: &CallRequest,
    ) -> RetCode {
        let buf = request.params[0];
        let target_id = request.params[1] as i32;
        let buf_size = request.params[2] as i32;
        if buf == TARGET_NULL || buf_size <= 0 {
            return CALL_FAILED;
        }
        let Some(name) = tmpnam_name(target_id) else {
            debug!(target_id, "tmpnam id out of range");
            return CALL_FAILED;
        };
        if name.len() > buf_size as usize {
            return CALL_FAILED;
        }
        match marshal::write_bytes(&mut MemoryAccess::target(target), buf, &name) {
            Ok(()) => 0,
            Err(_) => CALL_FAILED,
        }
    }

    pub(in crate::semihosting) fn unsupported(&self, kind: CallKind) -> RetCode {
        debug!(call = kind.name(), "call not supported");
        CALL_FAILED
    }
}
