/*!
 * Time Calls
 * clock and time
 */

use crate::core::types::RetCode;
use crate::semihosting::dispatcher::SemihostingDispatcher;
use crate::target::Target;

impl SemihostingDispatcher {
    /// Centiseconds since the earliest clock sample
    pub(in crate::semihosting) fn clock(&mut self, target: &mut dyn Target) -> RetCode {
        let now = self.backend.time_of_day(target);
        self.clock.centiseconds(now)
    }

    /// Raw wall-clock seconds; the failure sentinel reads as -1
    pub(in crate::semihosting) fn time(&mut self, target: &mut dyn Target) -> RetCode {
        self.backend.time_of_day(target).seconds as RetCode
    }
}
