/*!
 * Semihosting Relay Library
 * Services a halted target's semihosting calls on the debugging host or via the front-end
 */

pub mod core;
pub mod monitoring;
pub mod semihosting;
pub mod target;

// Re-exports
pub use crate::core::errors::{ConfigError, MarshalError, RelayError, ReplyError};
pub use monitoring::init_tracing;
pub use semihosting::{
    Backend, ClockCalibration, DirectBackend, PacketDisposition, PacketHandler, RelayBackend,
    SemihostingConfig, SemihostingDispatcher, Transport,
};
pub use target::{HeapInfo, MemoryAccess, ScratchBuffer, Target};
