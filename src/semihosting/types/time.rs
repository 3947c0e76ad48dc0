/*!
 * Time Value
 * Wall-clock sample as produced by either backend
 */

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::limits::TIMEVAL_BUFFER_SIZE;

/// Seconds + microseconds since the epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeValue {
    pub seconds: u32,
    pub microseconds: u64,
}

impl TimeValue {
    /// Sentinel returned when the time could not be obtained
    pub const FAILED: TimeValue = TimeValue {
        seconds: u32::MAX,
        microseconds: u64::MAX,
    };

    pub const fn new(seconds: u32, microseconds: u64) -> Self {
        Self {
            seconds,
            microseconds,
        }
    }

    pub fn is_failure(&self) -> bool {
        *self == Self::FAILED
    }

    /// Current host time, or the failure sentinel if the clock is before the epoch
    pub fn now() -> Self {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => Self::new(elapsed.as_secs() as u32, elapsed.subsec_micros() as u64),
            Err(_) => Self::FAILED,
        }
    }

    /// Decode the front-end's big-endian timeval layout
    pub fn from_be_bytes(bytes: &[u8; TIMEVAL_BUFFER_SIZE]) -> Self {
        let mut seconds = [0u8; 4];
        let mut microseconds = [0u8; 8];
        seconds.copy_from_slice(&bytes[0..4]);
        microseconds.copy_from_slice(&bytes[4..12]);
        Self::new(u32::from_be_bytes(seconds), u64::from_be_bytes(microseconds))
    }
}
