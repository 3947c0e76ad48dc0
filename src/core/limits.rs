/*!
 * Relay Limits and Constants
 *
 * Centralized location for layout sizes, protocol markers and defaults.
 * Organized by domain for discoverability.
 */

use std::time::Duration;

use super::types::TargetAddr;

// =============================================================================
// CALL CONVENTION
// =============================================================================

/// Register carrying the call id on entry and the result on exit
pub const CALL_ID_REGISTER: u32 = 0;

/// Register carrying the argument block address (or the single argument)
pub const ARGUMENT_REGISTER: u32 = 1;

/// Words in the argument block read from target memory
pub const ARGUMENT_WORDS: usize = 4;

/// Console descriptors as seen by a backend (before the +1 encoding)
pub const STDIN_FD: i32 = 0;
pub const STDOUT_FD: i32 = 1;
pub const STDERR_FD: i32 = 2;

/// First descriptor handed out for real files by the Direct backend
pub const FIRST_FILE_FD: i32 = 3;

/// Name that selects the console instead of the filesystem (NUL included)
pub const CONSOLE_PATH: &[u8; 4] = b":tt\0";

/// Template for synthesized temporary names (NUL included); bytes 4 and 5 encode the id
pub const TMPNAM_TEMPLATE: &[u8; 11] = b"tempXX.tmp\0";

/// Highest target id accepted by tmpnam
pub const TMPNAM_MAX_ID: i32 = 255;

// =============================================================================
// RELAY PROTOCOL
// =============================================================================

/// First byte of every relay request and reply
pub const REPLY_MARKER: u8 = b'F';

/// Single-byte packet the transport uses to signal escape/disconnect
pub const ESCAPE_BYTE: u8 = 0x04;

/// Third reply field flagging a user break
pub const BREAK_MARKER: char = 'C';

/// Pseudo address backing local scratch marshalling
/// Only the scratch capability maps it; real target memory is never touched
pub const LOCAL_SCRATCH_BASE: TargetAddr = 0xFFFF_0000;

/// Size of the front-end's stat structure
pub const STAT_BUFFER_SIZE: usize = 64;

/// Offset of the big-endian u64 `st_size` inside the stat structure
pub const STAT_SIZE_OFFSET: usize = 28;

/// Size of the front-end's timeval (u32 seconds + u64 microseconds)
pub const TIMEVAL_BUFFER_SIZE: usize = 12;

/// Chunk size used when streaming redirected console output
pub const CONSOLE_CHUNK_SIZE: usize = 64;

/// Chunk size the Direct backend streams file and console data through
pub const HOST_IO_CHUNK_SIZE: usize = 4096;

/// Longest declared-length string (path or command) accepted from the target
pub const MAX_STRING_ARGUMENT: u32 = 64 * 1024;

// =============================================================================
// CLOCK
// =============================================================================

/// Origin value meaning "no observation yet"
pub const CLOCK_ORIGIN_UNSET: u32 = u32::MAX;

/// Mask keeping clock results in the non-negative i32 range
pub const CLOCK_MASK: u32 = 0x7fff_ffff;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Permission bits for files created by the Direct backend
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Upper bound on a NUL scan over target memory (64KB)
pub const DEFAULT_MAX_STRING_LENGTH: u32 = 64 * 1024;

/// Calls slower than this are logged as warnings
pub const SLOW_CALL_THRESHOLD: Duration = Duration::from_millis(100);
