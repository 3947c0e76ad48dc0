/*!
 * Mode Backends
 * The interface both execution modes implement
 *
 * Exactly one backend is chosen when the dispatcher is built and it stays in
 * place for the dispatcher's lifetime. Return values follow the call
 * convention: non-negative on success, -1 on failure with the cause kept for
 * the errno call.
 */

mod console;
mod direct;
mod fd;

pub use console::{CaptureBuffer, HostConsole};
pub use direct::DirectBackend;
pub use fd::FdTable;

use crate::core::types::{Fd, RetCode, TargetAddr};
use crate::target::Target;

use super::marshal::TargetString;
use super::types::{OpenFlags, TimeValue};

/// One way of fulfilling trapped calls
pub trait Backend: Send {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Open a file; returns the backend descriptor
    fn open(
        &mut self,
        target: &mut dyn Target,
        path: TargetString,
        flags: OpenFlags,
        mode: u32,
    ) -> RetCode;

    fn close(&mut self, target: &mut dyn Target, fd: Fd) -> RetCode;

    /// Fill target memory at `buf`; returns bytes read
    fn read(&mut self, target: &mut dyn Target, fd: Fd, buf: TargetAddr, count: u32) -> RetCode;

    /// Drain target memory at `buf`; returns bytes written
    fn write(&mut self, target: &mut dyn Target, fd: Fd, buf: TargetAddr, count: u32) -> RetCode;

    /// Absolute seek; returns the resulting position
    fn seek(&mut self, target: &mut dyn Target, fd: Fd, offset: i64) -> i64;

    /// 1 for a terminal, 0 otherwise
    fn is_tty(&mut self, target: &mut dyn Target, fd: Fd) -> RetCode;

    fn rename(&mut self, target: &mut dyn Target, from: TargetString, to: TargetString) -> RetCode;

    fn remove(&mut self, target: &mut dyn Target, path: TargetString) -> RetCode;

    fn system(&mut self, target: &mut dyn Target, command: TargetString) -> RetCode;

    /// File size, -1 if unknown or above the positive i32 range
    fn file_length(&mut self, target: &mut dyn Target, fd: Fd) -> RetCode;

    /// Wall-clock sample; [`TimeValue::FAILED`] on failure
    fn time_of_day(&mut self, target: &mut dyn Target) -> TimeValue;

    /// One byte from the console, -1 on failure
    fn read_char(&mut self, target: &mut dyn Target) -> RetCode;

    /// Error code recorded by the last failing operation
    fn last_errno(&self) -> i32;

    /// Whether the last operation was cut short by a user break
    fn interrupted(&self) -> bool {
        false
    }

    /// Reset the per-call interrupted and link-lost flags before a new call
    fn begin_call(&mut self) {}

    /// Whether the debug link went away during an operation
    fn link_lost(&self) -> bool {
        false
    }
}
