/*!
 * Clock Calibration
 * Converts wall-clock samples into centiseconds since the earliest observation
 */

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use crate::core::limits::{CLOCK_MASK, CLOCK_ORIGIN_UNSET};
use crate::core::types::{RetCode, CALL_FAILED};

use super::types::TimeValue;

/// Process-wide origin shared by every dispatcher that does not bring its own
static SHARED_CLOCK: OnceLock<Arc<ClockCalibration>> = OnceLock::new();

/// Earliest wall-clock seconds value observed so far
///
/// The origin only ever moves down, so elapsed values stay non-negative even
/// when samples arrive out of order.
#[derive(Debug)]
pub struct ClockCalibration {
    origin: AtomicU32,
}

impl ClockCalibration {
    pub const fn new() -> Self {
        Self {
            origin: AtomicU32::new(CLOCK_ORIGIN_UNSET),
        }
    }

    /// The process-wide calibration
    pub fn shared() -> Arc<ClockCalibration> {
        SHARED_CLOCK
            .get_or_init(|| Arc::new(ClockCalibration::new()))
            .clone()
    }

    /// Current origin, if any sample has been observed
    pub fn origin(&self) -> Option<u32> {
        match self.origin.load(Ordering::Acquire) {
            CLOCK_ORIGIN_UNSET => None,
            origin => Some(origin),
        }
    }

    /// Lower the origin to `seconds` if it is earlier; returns the origin in effect
    pub fn observe(&self, seconds: u32) -> u32 {
        let previous = self.origin.fetch_min(seconds, Ordering::AcqRel);
        previous.min(seconds)
    }

    /// Centiseconds since the origin, masked to the non-negative i32 range
    ///
    /// A failed sample yields -1 and leaves the origin untouched.
    pub fn centiseconds(&self, now: TimeValue) -> RetCode {
        if now.is_failure() {
            return CALL_FAILED;
        }
        let origin = self.observe(now.seconds);
        let elapsed = now.seconds - origin;
        // Microseconds are narrowed first, matching the 32-bit arithmetic targets expect
        let centiseconds = elapsed
            .wrapping_mul(100)
            .wrapping_add((now.microseconds as u32) / 10_000);
        (centiseconds & CLOCK_MASK) as RetCode
    }
}

impl Default for ClockCalibration {
    fn default() -> Self {
        Self::new()
    }
}
